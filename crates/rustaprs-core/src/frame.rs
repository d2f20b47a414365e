use crate::address::{AddressField, ADDRESS_LEN};
use crate::encoding::{reader::Reader, writer::Writer};
use crate::{Callsign, DecodeError, Digipeater, EncodeError};

/// Unnumbered information frame.
pub const CONTROL_UI: u8 = 0x03;
/// No layer-3 protocol.
pub const PID_NO_LAYER3: u8 = 0xf0;
pub const MAX_DIGIPEATERS: usize = 8;

/// An AX.25 UI frame borrowing its information field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ax25Frame<'a> {
    pub destination: Callsign,
    pub source: Callsign,
    pub digipeaters: Vec<Digipeater>,
    pub information: &'a [u8],
}

impl<'a> Ax25Frame<'a> {
    pub fn encoded_len(&self) -> usize {
        ADDRESS_LEN * (2 + self.digipeaters.len()) + 2 + self.information.len()
    }

    /// The destination carries the command bit; only the last address of
    /// the chain carries the end-of-chain bit.
    pub fn encode(&self, w: &mut Writer<'_>) -> Result<(), EncodeError> {
        if self.digipeaters.len() > MAX_DIGIPEATERS {
            return Err(EncodeError::TooManyDigipeaters(self.digipeaters.len()));
        }
        w.write_address(&self.destination, true, false)?;
        w.write_address(&self.source, false, self.digipeaters.is_empty())?;
        let last = self.digipeaters.len().saturating_sub(1);
        for (i, digi) in self.digipeaters.iter().enumerate() {
            w.write_address(&digi.callsign, digi.used, i == last)?;
        }
        w.write_u8(CONTROL_UI)?;
        w.write_u8(PID_NO_LAYER3)?;
        w.write_all(self.information)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, EncodeError> {
        let mut buf = vec![0u8; self.encoded_len()];
        let mut w = Writer::new(&mut buf);
        self.encode(&mut w)?;
        Ok(buf)
    }

    pub fn decode(r: &mut Reader<'a>) -> Result<Self, DecodeError> {
        let destination = AddressField::decode(r)?;
        let source = AddressField::decode(r)?;

        let mut digipeaters = Vec::new();
        let mut last = source.last;
        while !last {
            if digipeaters.len() == MAX_DIGIPEATERS {
                return Err(DecodeError::TooManyDigipeaters);
            }
            let hop = AddressField::decode(r)?;
            last = hop.last;
            digipeaters.push(Digipeater::new(hop.callsign, hop.used));
        }

        let control = r.read_u8()?;
        let pid = r.read_u8()?;
        if control != CONTROL_UI || pid != PID_NO_LAYER3 {
            log::warn!("dropping non-UI frame: control=0x{control:02x} pid=0x{pid:02x}");
            return Err(DecodeError::InvalidControlField { control, pid });
        }

        Ok(Self {
            destination: destination.callsign,
            source: source.callsign,
            digipeaters,
            information: r.rest(),
        })
    }
}
