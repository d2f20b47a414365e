use crate::encoding::reader::{parse_decimal, Reader};
use crate::{DecodeError, EncodeError};
use core::fmt;
use once_cell::sync::Lazy;
use regex::Regex;

/// Length of one AX.25 address field.
pub const ADDRESS_LEN: usize = 7;
/// Longest callsign an AX.25 address can carry.
pub const MAX_CALL_LEN: usize = 6;

const PADDING: u8 = b' ' << 1;
const SSID_RESERVED_BITS: u8 = 0x60;
const SSID_MASK: u8 = 0x1e;
const USED_BIT: u8 = 0x80;
const END_OF_CHAIN_BIT: u8 = 0x01;

static GENERIC_ALIAS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(WIDE|TRACE|RELAY)\d*$").unwrap());

const Q_CONSTRUCTS: [&str; 4] = ["qAR", "qAS", "qAC", "qAO"];

/// Station identifier as carried in TNC2 text: a base call plus an optional
/// SSID kept exactly as received.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Callsign {
    call: String,
    ssid: String,
}

impl Callsign {
    pub fn new(call: impl Into<String>, ssid: impl Into<String>) -> Self {
        Self {
            call: call.into(),
            ssid: ssid.into(),
        }
    }

    /// Splits `CALL-SSID` at the first `-`.
    pub fn parse(text: &str) -> Self {
        match text.split_once('-') {
            Some((call, ssid)) => Self::new(call, ssid),
            None => Self::new(text, ""),
        }
    }

    pub fn base_call(&self) -> &str {
        &self.call
    }

    /// Textual SSID, empty when the station has none.
    pub fn ssid(&self) -> &str {
        &self.ssid
    }

    /// SSID as the 0..=15 number an AX.25 address can hold.
    pub fn ssid_number(&self) -> Result<u8, EncodeError> {
        if self.ssid.is_empty() {
            return Ok(0);
        }
        match parse_decimal(self.ssid.as_bytes()) {
            Ok(n) if n <= 15 => Ok(n as u8),
            _ => Err(EncodeError::InvalidSsid(self.ssid.clone())),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.call.is_empty()
    }

    pub fn to_ax25(&self) -> Result<[u8; ADDRESS_LEN], EncodeError> {
        encode_address(self, false, false)
    }
}

impl From<&str> for Callsign {
    fn from(text: &str) -> Self {
        Self::parse(text)
    }
}

impl fmt::Display for Callsign {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.ssid.is_empty() {
            f.write_str(&self.call)
        } else {
            write!(f, "{}-{}", self.call, self.ssid)
        }
    }
}

/// One hop of the digipeater path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Digipeater {
    pub callsign: Callsign,
    /// Set once the hop has repeated the packet (`*` in TNC2).
    pub used: bool,
}

impl Digipeater {
    pub fn new(callsign: Callsign, used: bool) -> Self {
        Self { callsign, used }
    }

    pub fn parse(text: &str) -> Self {
        match text.strip_suffix('*') {
            Some(call) => Self::new(Callsign::parse(call), true),
            None => Self::new(Callsign::parse(text), false),
        }
    }

    /// `WIDE`, `TRACE` and `RELAY` (with optional digits) name a path
    /// setting rather than a station.
    pub fn is_alias(&self) -> bool {
        GENERIC_ALIAS.is_match(self.callsign.base_call())
    }

    /// APRS-IS q-construct that precedes the receiving igate.
    pub fn is_igate_marker(&self) -> bool {
        let call = self.callsign.base_call();
        Q_CONSTRUCTS.iter().any(|q| q.eq_ignore_ascii_case(call))
    }

    pub fn to_ax25(&self) -> Result<[u8; ADDRESS_LEN], EncodeError> {
        encode_address(&self.callsign, self.used, false)
    }
}

impl fmt::Display for Digipeater {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.callsign)?;
        if self.used {
            f.write_str("*")?;
        }
        Ok(())
    }
}

/// Parses a comma-separated TNC2 path, skipping empty entries.
pub fn parse_path(path: &str) -> Vec<Digipeater> {
    path.split(',')
        .filter(|hop| !hop.is_empty())
        .map(Digipeater::parse)
        .collect()
}

/// A decoded 7-byte AX.25 address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressField {
    pub callsign: Callsign,
    pub used: bool,
    /// Extension bit: this is the last address of the chain.
    pub last: bool,
}

impl AddressField {
    pub fn decode(r: &mut Reader<'_>) -> Result<Self, DecodeError> {
        let bytes = r.read_exact(ADDRESS_LEN)?;
        let mut field = [0u8; ADDRESS_LEN];
        field.copy_from_slice(bytes);
        Ok(decode_address(&field))
    }
}

/// Encodes one address field. The caller decides which address ends the chain.
pub fn encode_address(
    callsign: &Callsign,
    used: bool,
    last: bool,
) -> Result<[u8; ADDRESS_LEN], EncodeError> {
    let call = callsign.base_call();
    if call.len() > MAX_CALL_LEN {
        return Err(EncodeError::CallsignTooLong(call.to_string()));
    }
    if call.is_empty() || !call.bytes().all(|b| b.is_ascii_graphic()) {
        return Err(EncodeError::InvalidCallsign(call.to_string()));
    }
    let ssid = callsign.ssid_number()?;

    let mut field = [PADDING; ADDRESS_LEN];
    for (slot, b) in field.iter_mut().zip(call.bytes()) {
        *slot = b.to_ascii_uppercase() << 1;
    }
    let mut last_byte = SSID_RESERVED_BITS | ((ssid << 1) & SSID_MASK);
    if used {
        last_byte |= USED_BIT;
    }
    if last {
        last_byte |= END_OF_CHAIN_BIT;
    }
    field[ADDRESS_LEN - 1] = last_byte;
    Ok(field)
}

pub fn decode_address(field: &[u8; ADDRESS_LEN]) -> AddressField {
    let call: String = field[..MAX_CALL_LEN]
        .iter()
        .map(|b| char::from(b >> 1))
        .collect();
    let flags = field[ADDRESS_LEN - 1];
    let ssid = (flags & SSID_MASK) >> 1;
    let ssid = if ssid == 0 {
        String::new()
    } else {
        ssid.to_string()
    };
    AddressField {
        callsign: Callsign::new(call.trim_end(), ssid),
        used: flags & USED_BIT != 0,
        last: flags & END_OF_CHAIN_BIT != 0,
    }
}
