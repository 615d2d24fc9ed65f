//! Whole-memory buffers.
//!
//! Layout:
//!
//! 1. primary ID type and value
//! 2. additional-blocks type and value, or a single empty string
//! 3. `o`, the owner block and `b`, or a single empty string
//! 4. the block count as a big-endian `i32`
//! 5. that many blocks, each closed by `b`

use bytes::Bytes;
use objmem_model::{Header, MemoryDocument, TypedValue};

use crate::block::{read_block, write_block};
use crate::error::{CodecError, Result};
use crate::reader::TlvReader;
use crate::tag;
use crate::writer::TlvWriter;

pub fn encode_memory(memory: &MemoryDocument) -> Result<Bytes> {
    let mut w = TlvWriter::with_capacity(256 * (memory.blocks.len() + 1));

    let primary = &memory.header.primary_id;
    w.put_str(&primary.value_type)?;
    w.put_str(&primary.value)?;
    match &memory.header.additional_blocks {
        Some(additional) => {
            w.put_str(&additional.value_type)?;
            w.put_str(&additional.value)?;
        }
        None => w.put_empty(),
    }

    match &memory.owner {
        Some(owner) => {
            w.put_str(tag::OWNER)?;
            write_block(&mut w, owner)?;
            w.put_str(tag::NEW_BLOCK)?;
        }
        None => w.put_empty(),
    }

    let count = i32::try_from(memory.blocks.len()).map_err(|_| CodecError::InvalidCount {
        count: i32::MAX,
    })?;
    w.put_i32(count);
    for block in &memory.blocks {
        write_block(&mut w, block)?;
        w.put_str(tag::NEW_BLOCK)?;
    }
    Ok(w.finish())
}

/// Decode a memory buffer.
///
/// The header and count must be intact. Blocks that fail validation are
/// logged and left out; a buffer that ends before `count` blocks were read
/// yields the blocks decoded so far.
pub fn decode_memory(bytes: &[u8]) -> Result<MemoryDocument> {
    let mut r = TlvReader::new(bytes);

    let primary_type = r.read_str()?;
    let primary_id = TypedValue::new(primary_type, r.read_str()?);
    let mut header = Header::new(primary_id);
    let additional_type = r.read_str()?;
    if !additional_type.is_empty() {
        header = header.with_additional_blocks(TypedValue::new(additional_type, r.read_str()?));
    }

    let owner = match r.read_str()?.as_str() {
        "" => None,
        tag::OWNER => match read_block(&mut r) {
            Ok(owner) => Some(owner),
            Err(CodecError::Model(e)) => {
                log::warn!("Skipping invalid owner block: {}", e);
                None
            }
            Err(e) => return Err(e),
        },
        other => {
            log::warn!("Expected owner marker, found '{}'", other);
            None
        }
    };

    let count = r.read_i32()?;
    if count < 0 {
        return Err(CodecError::InvalidCount { count });
    }

    let mut blocks = Vec::with_capacity(usize::try_from(count).unwrap_or(0).min(1024));
    for index in 0..count {
        if r.is_empty() {
            log::warn!(
                "Memory buffer ended after {} of {} blocks",
                index,
                count
            );
            break;
        }
        match read_block(&mut r) {
            Ok(block) => blocks.push(block),
            Err(CodecError::Model(e)) => {
                log::warn!("Skipping invalid block {}: {}", index, e);
            }
            Err(e) => {
                log::warn!("Memory buffer truncated in block {}: {}", index, e);
                break;
            }
        }
    }

    if !r.is_empty() {
        log::debug!("{} trailing bytes after the last block", r.remaining());
    }

    Ok(MemoryDocument {
        header,
        owner,
        blocks,
    })
}
