use core::fmt;
use thiserror::Error;

/// Failure on the encode path. Malformed frames are never produced.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodeError {
    #[error("buffer too small")]
    BufferTooSmall,
    #[error("callsign {0:?} exceeds 6 characters")]
    CallsignTooLong(String),
    #[error("callsign {0:?} contains characters outside printable ASCII")]
    InvalidCallsign(String),
    #[error("ssid {0:?} is not a number in 0..=15")]
    InvalidSsid(String),
    #[error("{0} digipeaters exceed the AX.25 limit of 8")]
    TooManyDigipeaters(usize),
}

/// Failure that prevents a packet from being framed at all, or that a
/// payload decoder reports before it is turned into a [`Fault`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("unexpected end of input")]
    UnexpectedEof,
    #[error("missing '{0}' in TNC2 header")]
    MissingDelimiter(char),
    #[error("empty source callsign")]
    EmptySource,
    #[error("expected control/pid 0x03/0xf0, got 0x{control:02x}/0x{pid:02x}")]
    InvalidControlField { control: u8, pid: u8 },
    #[error("address chain exceeds 8 digipeaters")]
    TooManyDigipeaters,
    #[error("invalid numeric field {0:?}")]
    InvalidNumber(String),
    #[error("invalid value")]
    InvalidValue,
    #[error("{0}")]
    Message(&'static str),
}

impl DecodeError {
    pub(crate) fn number(bytes: &[u8]) -> Self {
        Self::InvalidNumber(String::from_utf8_lossy(bytes).into_owned())
    }
}

/// Reason a single decoded sub-value could not be fully decoded.
///
/// Faults stay attached to the sub-value that produced them; siblings
/// decoded from the same payload are unaffected.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Fault {
    reason: String,
}

impl Fault {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }
}

impl From<DecodeError> for Fault {
    fn from(err: DecodeError) -> Self {
        Self::new(err.to_string())
    }
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.reason)
    }
}
