//! # objmem-binary
//!
//! A compact tag-length-value encoding for blocks and memories.
//!
//! Every string on the wire, tags included, is a big-endian `u16` length
//! followed by UTF-8 bytes. A block is a flat run of `(tag, values...)`
//! records; a memory is a header, an optional owner block, a block count
//! and the blocks themselves.
//!
//! Decoding is lenient: unknown tags and unparseable values are logged and
//! skipped. A decoded block must still satisfy the model's required fields.

pub mod block;
pub mod compress;
pub mod error;
pub mod memory;
pub mod reader;
pub mod tag;
pub mod writer;

pub use block::{decode_block, encode_block, BlockReader};
pub use compress::{compress, decompress};
pub use error::{CodecError, Result};
pub use memory::{decode_memory, encode_memory};
pub use reader::TlvReader;
pub use writer::TlvWriter;
