//! Saving and loading memories and blocks as files.
//!
//! The format follows the file suffix:
//!
//! | Suffix          | Format                     |
//! |-----------------|----------------------------|
//! | `.json`         | JSON document              |
//! | `.omm`, `.omb`  | binary records             |
//! | `.ommz`, `.ombz`| lz4-compressed binary      |
//!
//! `.omm` holds a memory and `.omb` a single block.

use std::fs;
use std::path::Path;

use objmem_binary::{compress, decode_block, decode_memory, decompress, encode_block, encode_memory};
use objmem_model::{Block, DocumentCodec, JsonDocumentCodec};

use crate::error::{Result, StoreError};
use crate::memory::{Memory, Source};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Json,
    Binary,
    CompressedBinary,
}

impl FileFormat {
    /// Format of a memory file.
    pub fn for_memory(path: &Path) -> Result<Self> {
        Self::from_suffix(path, "omm", "ommz")
    }

    /// Format of a single-block file.
    pub fn for_block(path: &Path) -> Result<Self> {
        Self::from_suffix(path, "omb", "ombz")
    }

    fn from_suffix(path: &Path, binary: &str, compressed: &str) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match extension.as_deref() {
            Some("json") => Ok(FileFormat::Json),
            Some(e) if e == binary => Ok(FileFormat::Binary),
            Some(e) if e == compressed => Ok(FileFormat::CompressedBinary),
            _ => Err(StoreError::UnsupportedFormat {
                path: path.to_path_buf(),
            }),
        }
    }
}

fn read(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).map_err(|error| StoreError::Io {
        path: path.to_path_buf(),
        error,
    })
}

fn write(path: &Path, bytes: &[u8]) -> Result<()> {
    fs::write(path, bytes).map_err(|error| StoreError::Io {
        path: path.to_path_buf(),
        error,
    })
}

pub fn save(memory: &Memory, path: &Path) -> Result<()> {
    let document = memory.to_document();
    let bytes = match FileFormat::for_memory(path)? {
        FileFormat::Json => JsonDocumentCodec.encode_memory(&document)?,
        FileFormat::Binary => encode_memory(&document)?.to_vec(),
        FileFormat::CompressedBinary => compress(&encode_memory(&document)?),
    };
    write(path, &bytes)?;
    log::debug!(
        "Saved memory '{}' with {} blocks to {}",
        memory.header().memory_name(),
        memory.len(),
        path.display()
    );
    Ok(())
}

/// Load a memory and record the file as its source.
pub fn load(path: &Path) -> Result<Memory> {
    let format = FileFormat::for_memory(path)?;
    let bytes = read(path)?;
    let document = match format {
        FileFormat::Json => JsonDocumentCodec.decode_memory(&bytes)?,
        FileFormat::Binary => decode_memory(&bytes)?,
        FileFormat::CompressedBinary => decode_memory(&decompress(&bytes)?)?,
    };
    let mut memory = Memory::from_document(document);
    memory.set_source(Source::LocalFile(path.to_path_buf()));
    Ok(memory)
}

pub fn save_block(block: &Block, path: &Path) -> Result<()> {
    let bytes = match FileFormat::for_block(path)? {
        FileFormat::Json => JsonDocumentCodec.encode_block(block)?,
        FileFormat::Binary => encode_block(block)?.to_vec(),
        FileFormat::CompressedBinary => compress(&encode_block(block)?),
    };
    write(path, &bytes)
}

pub fn load_block(path: &Path) -> Result<Block> {
    let format = FileFormat::for_block(path)?;
    let bytes = read(path)?;
    Ok(match format {
        FileFormat::Json => JsonDocumentCodec.decode_block(&bytes)?,
        FileFormat::Binary => decode_block(&bytes)?,
        FileFormat::CompressedBinary => decode_block(&decompress(&bytes)?)?,
    })
}
