//! Error types for the binary codec.

use objmem_model::ModelError;

#[derive(thiserror::Error, Debug)]
pub enum CodecError {
    /// The buffer ended in the middle of a record.
    #[error("unexpected end of buffer: needed {needed} bytes, {remaining} left")]
    UnexpectedEof { needed: usize, remaining: usize },

    /// A string does not fit the two-byte length prefix.
    #[error("value of {len} bytes exceeds the 65535 byte record limit")]
    ValueTooLong { len: usize },

    #[error("invalid block count: {count}")]
    InvalidCount { count: i32 },

    #[error("decompression failed: {0}")]
    Decompress(#[from] lz4_flex::block::DecompressError),

    /// The decoded block breaks a model invariant.
    #[error("invalid block: {0}")]
    Model(#[from] ModelError),
}

pub type Result<T> = std::result::Result<T, CodecError>;
