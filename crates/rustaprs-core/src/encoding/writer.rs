use crate::address::encode_address;
use crate::{Callsign, EncodeError};

/// Fills a caller-sized frame buffer front to back.
#[derive(Debug)]
pub struct Writer<'a> {
    buf: &'a mut [u8],
    pos: usize,
}

impl<'a> Writer<'a> {
    pub fn new(buf: &'a mut [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    pub fn remaining(&self) -> usize {
        self.buf.len().saturating_sub(self.pos)
    }

    pub fn as_written(&self) -> &[u8] {
        &self.buf[..self.pos]
    }

    pub fn write_u8(&mut self, value: u8) -> Result<(), EncodeError> {
        self.write_all(&[value])
    }

    pub fn write_all(&mut self, data: &[u8]) -> Result<(), EncodeError> {
        let end = self.pos + data.len();
        let slot = self
            .buf
            .get_mut(self.pos..end)
            .ok_or(EncodeError::BufferTooSmall)?;
        slot.copy_from_slice(data);
        self.pos = end;
        Ok(())
    }

    /// Writes one 7-byte address field.
    pub fn write_address(
        &mut self,
        callsign: &Callsign,
        used: bool,
        last: bool,
    ) -> Result<(), EncodeError> {
        self.write_all(&encode_address(callsign, used, last)?)
    }
}

#[cfg(test)]
mod tests {
    use super::Writer;
    use crate::{Callsign, EncodeError};

    #[test]
    fn writer_writes_values() {
        let mut buf = [0u8; 4];
        let mut w = Writer::new(&mut buf);
        w.write_u8(0x03).unwrap();
        w.write_all(&[0xf0, b'!']).unwrap();
        assert_eq!(w.as_written(), &[0x03, 0xf0, b'!']);
        assert_eq!(w.remaining(), 1);
    }

    #[test]
    fn writer_bounds() {
        let mut buf = [0u8; 1];
        let mut w = Writer::new(&mut buf);
        w.write_u8(1).unwrap();
        assert_eq!(w.write_u8(2).unwrap_err(), EncodeError::BufferTooSmall);
        assert_eq!(w.write_all(&[]), Ok(()));
    }

    #[test]
    fn address_needs_seven_bytes() {
        let mut buf = [0u8; 10];
        let mut w = Writer::new(&mut buf);
        w.write_address(&Callsign::parse("W1AW"), false, true).unwrap();
        assert_eq!(w.as_written()[6], 0x61);
        assert_eq!(
            w.write_address(&Callsign::parse("W1AW"), false, true)
                .unwrap_err(),
            EncodeError::BufferTooSmall
        );
    }
}
