use bytes::{BufMut, Bytes, BytesMut};

use crate::error::{CodecError, Result};

/// Appends length-prefixed records to a growable buffer.
///
/// Every string, tags included, is written as a big-endian `u16` byte length
/// followed by its UTF-8 bytes.
#[derive(Debug, Default)]
pub struct TlvWriter {
    buf: BytesMut,
}

impl TlvWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: BytesMut::with_capacity(capacity),
        }
    }

    pub fn put_str(&mut self, value: &str) -> Result<()> {
        let len = u16::try_from(value.len())
            .map_err(|_| CodecError::ValueTooLong { len: value.len() })?;
        self.buf.put_u16(len);
        self.buf.put_slice(value.as_bytes());
        Ok(())
    }

    /// A tag followed by its values.
    pub fn put_record(&mut self, tag: &str, values: &[&str]) -> Result<()> {
        self.put_str(tag)?;
        for value in values {
            self.put_str(value)?;
        }
        Ok(())
    }

    /// A zero-length string.
    pub fn put_empty(&mut self) {
        self.buf.put_u16(0);
    }

    pub fn put_i32(&mut self, value: i32) {
        self.buf.put_i32(value);
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn finish(self) -> Bytes {
        self.buf.freeze()
    }
}
