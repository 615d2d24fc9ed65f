//! lz4 wrapper for stored buffers. Compressed buffers start with the
//! uncompressed size as a little-endian `u32`.

use crate::error::Result;

pub fn compress(bytes: &[u8]) -> Vec<u8> {
    lz4_flex::compress_prepend_size(bytes)
}

pub fn decompress(bytes: &[u8]) -> Result<Vec<u8>> {
    Ok(lz4_flex::decompress_size_prepended(bytes)?)
}
