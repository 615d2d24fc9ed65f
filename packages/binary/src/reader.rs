use bytes::Buf;

use crate::error::{CodecError, Result};

/// Reads length-prefixed records from a byte slice.
#[derive(Debug, Clone)]
pub struct TlvReader<'a> {
    buf: &'a [u8],
}

impl<'a> TlvReader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf }
    }

    pub fn remaining(&self) -> usize {
        self.buf.remaining()
    }

    pub fn is_empty(&self) -> bool {
        !self.buf.has_remaining()
    }

    fn ensure(&self, needed: usize) -> Result<()> {
        if self.buf.remaining() < needed {
            return Err(CodecError::UnexpectedEof {
                needed,
                remaining: self.buf.remaining(),
            });
        }
        Ok(())
    }

    /// Invalid UTF-8 is replaced rather than rejected.
    pub fn read_str(&mut self) -> Result<String> {
        self.ensure(2)?;
        let len = usize::from(self.buf.get_u16());
        self.ensure(len)?;
        let value = String::from_utf8_lossy(&self.buf[..len]).into_owned();
        self.buf.advance(len);
        Ok(value)
    }

    /// The next string without consuming it.
    pub fn peek_str(&self) -> Result<String> {
        self.clone().read_str()
    }

    pub fn read_i32(&mut self) -> Result<i32> {
        self.ensure(4)?;
        Ok(self.buf.get_i32())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::writer::TlvWriter;

    #[test]
    fn reads_what_the_writer_wrote() {
        let mut w = TlvWriter::new();
        w.put_record("tl", &["en", "Title"]).unwrap();
        w.put_i32(-1);
        let bytes = w.finish();

        let mut r = TlvReader::new(&bytes);
        assert_eq!(r.peek_str().unwrap(), "tl");
        assert_eq!(r.read_str().unwrap(), "tl");
        assert_eq!(r.read_str().unwrap(), "en");
        assert_eq!(r.read_str().unwrap(), "Title");
        assert_eq!(r.read_i32().unwrap(), -1);
        assert!(r.is_empty());
    }

    #[test]
    fn truncated_value_is_an_error() {
        let mut r = TlvReader::new(&[0, 5, b'a', b'b']);
        let err = r.read_str().unwrap_err();
        assert!(matches!(
            err,
            CodecError::UnexpectedEof {
                needed: 5,
                remaining: 2
            }
        ));
    }

    #[test]
    fn truncated_length_is_an_error() {
        let mut r = TlvReader::new(&[0]);
        assert!(r.read_str().is_err());
        let mut r = TlvReader::new(&[0, 0, 1]);
        assert!(r.read_i32().is_err());
    }

    #[test]
    fn invalid_utf8_is_replaced() {
        let mut r = TlvReader::new(&[0, 2, 0xff, b'a']);
        assert_eq!(r.read_str().unwrap(), "\u{fffd}a");
    }
}
