use crate::DecodeError;

/// Cursor over a frame or payload. Reads past the end fail with
/// [`DecodeError::UnexpectedEof`] and leave the cursor where it was.
#[derive(Debug, Clone, Copy)]
pub struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    pub const fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Starts reading `buf` at `pos`, which may lie past the end.
    pub const fn at(buf: &'a [u8], pos: usize) -> Self {
        Self { buf, pos }
    }

    pub fn remaining(&self) -> usize {
        self.buf.len().saturating_sub(self.pos)
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    pub fn read_u8(&mut self) -> Result<u8, DecodeError> {
        let byte = *self.buf.get(self.pos).ok_or(DecodeError::UnexpectedEof)?;
        self.pos += 1;
        Ok(byte)
    }

    pub fn read_exact(&mut self, len: usize) -> Result<&'a [u8], DecodeError> {
        if self.remaining() < len {
            return Err(DecodeError::UnexpectedEof);
        }
        let start = self.pos;
        self.pos += len;
        Ok(&self.buf[start..start + len])
    }

    /// Reads `len` ASCII digits as an unsigned decimal.
    pub fn read_decimal(&mut self, len: usize) -> Result<u32, DecodeError> {
        let bytes = self.read_exact(len)?;
        parse_decimal(bytes)
    }

    /// Consumes and returns everything that is left.
    pub fn rest(&mut self) -> &'a [u8] {
        let start = self.pos.min(self.buf.len());
        self.pos = self.buf.len();
        &self.buf[start..]
    }
}

pub(crate) fn parse_decimal(bytes: &[u8]) -> Result<u32, DecodeError> {
    if bytes.is_empty() || bytes.len() > 9 {
        return Err(DecodeError::number(bytes));
    }
    bytes.iter().try_fold(0u32, |acc, &b| {
        if b.is_ascii_digit() {
            Ok(acc * 10 + u32::from(b - b'0'))
        } else {
            Err(DecodeError::number(bytes))
        }
    })
}

#[cfg(test)]
mod tests {
    use super::Reader;
    use crate::DecodeError;

    #[test]
    fn reader_reads_values() {
        let mut r = Reader::new(&[1, 2, 3, 4, 5]);
        assert_eq!(r.read_u8().unwrap(), 1);
        assert_eq!(r.read_exact(2).unwrap(), &[2, 3]);
        assert_eq!(r.remaining(), 2);
        assert_eq!(r.rest(), &[4, 5]);
        assert!(r.is_empty());
    }

    #[test]
    fn reader_bounds() {
        let mut r = Reader::new(&[1]);
        assert_eq!(r.read_u8().unwrap(), 1);
        assert_eq!(r.read_u8().unwrap_err(), DecodeError::UnexpectedEof);
    }

    #[test]
    fn reader_decimal_fields() {
        let mut r = Reader::at(b"!4903.50N", 1);
        assert_eq!(r.read_decimal(4).unwrap(), 4903);
        assert_eq!(r.read_u8().unwrap(), b'.');
        assert_eq!(r.read_decimal(2).unwrap(), 50);
        assert_eq!(
            r.read_decimal(1).unwrap_err(),
            DecodeError::InvalidNumber("N".into())
        );
        assert_eq!(r.read_decimal(1).unwrap_err(), DecodeError::UnexpectedEof);
    }
}
