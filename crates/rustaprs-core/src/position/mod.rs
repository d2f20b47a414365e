//! Position decoding for all four APRS encodings.
//!
//! [`decode_position`] picks the encoding from the data type identifier and,
//! for plain position reports, from the byte at the cursor. Every branch
//! returns the decoded field with the index of the first byte it did not
//! consume; a faulted branch consumes nothing.

use crate::encoding::base91;
use crate::extension::DataExtension;
use crate::{Callsign, Fault};
use chrono::{DateTime, Utc};
use core::fmt;
use once_cell::sync::Lazy;
use regex::bytes::Regex;

pub mod compressed;
pub mod mic_e;
pub mod nmea;
pub mod uncompressed;

pub use mic_e::MicEMessage;

/// Highest position ambiguity: all four minute digits blanked.
pub const MAX_AMBIGUITY: u8 = 4;

const EARTH_RADIUS_MILES: f64 = 3958.75;
const FEET_PER_METER: f64 = 3.280_839_9;

static COMMENT_ALTITUDE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"/A=(-\d{5}|\d{6})").unwrap());

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Position {
    latitude: f64,
    longitude: f64,
    altitude: Option<f64>,
    ambiguity: u8,
    symbol_table: char,
    symbol_code: char,
    timestamp: DateTime<Utc>,
}

impl Position {
    /// Builds a position rounded to 1e-5 degree.
    pub fn new(
        latitude: f64,
        longitude: f64,
        ambiguity: u8,
        symbol_table: char,
        symbol_code: char,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            latitude: round5(latitude),
            longitude: round5(longitude),
            altitude: None,
            ambiguity: ambiguity.min(MAX_AMBIGUITY),
            symbol_table,
            symbol_code,
            timestamp,
        }
    }

    /// Placeholder for a report that could not be decoded.
    pub fn unknown(timestamp: DateTime<Utc>) -> Self {
        Self::new(0.0, 0.0, 0, '\\', '.', timestamp)
    }

    pub fn with_altitude(mut self, feet: f64) -> Self {
        self.altitude = Some(feet);
        self
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    /// Altitude in feet.
    pub fn altitude(&self) -> Option<f64> {
        self.altitude
    }

    pub fn ambiguity(&self) -> u8 {
        self.ambiguity
    }

    pub fn symbol_table(&self) -> char {
        self.symbol_table
    }

    pub fn symbol_code(&self) -> char {
        self.symbol_code
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// `DDMM.mmN` with the trailing `ambiguity` minute digits blanked.
    pub fn latitude_text(&self) -> String {
        let hemisphere = if self.latitude.is_sign_negative() { 'S' } else { 'N' };
        let (degrees, minutes) = degrees_minutes(self.latitude);
        let text = format!(
            "{degrees:02}{:02}.{:02}{hemisphere}",
            minutes / 100,
            minutes % 100
        );
        blank_minutes(text, 2, self.ambiguity)
    }

    /// `DDDMM.mmW` with the trailing `ambiguity` minute digits blanked.
    pub fn longitude_text(&self) -> String {
        let hemisphere = if self.longitude.is_sign_negative() { 'W' } else { 'E' };
        let (degrees, minutes) = degrees_minutes(self.longitude);
        let text = format!(
            "{degrees:03}{:02}.{:02}{hemisphere}",
            minutes / 100,
            minutes % 100
        );
        blank_minutes(text, 3, self.ambiguity)
    }

    /// Renders the base-91 compressed form. `cs_t` is the three-byte
    /// course/speed and type field; anything but three bytes becomes `" sT"`.
    pub fn to_compressed_string(&self, cs_t: &str) -> String {
        let table = match self.symbol_table {
            overlay @ '0'..='9' => char::from(b'a' + (overlay as u8 - b'0')),
            other => other,
        };
        let lat = (380_926.0 * (90.0 - self.latitude)).round().max(0.0) as u32;
        let lon = (190_463.0 * (180.0 + self.longitude)).round().max(0.0) as u32;
        let cs_t = if cs_t.len() == 3 { cs_t } else { " sT" };

        let mut out = String::with_capacity(13);
        out.push(table);
        out.extend(base91::encode::<4>(lat).iter().map(|&b| char::from(b)));
        out.extend(base91::encode::<4>(lon).iter().map(|&b| char::from(b)));
        out.push(self.symbol_code);
        out.push_str(cs_t);
        out
    }

    /// Great-circle distance in statute miles.
    pub fn distance_to(&self, other: &Position) -> f64 {
        let (lat1, lat2) = (self.latitude.to_radians(), other.latitude.to_radians());
        let d_lat = lat2 - lat1;
        let d_lon = (other.longitude - self.longitude).to_radians();
        let a = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
        2.0 * EARTH_RADIUS_MILES * a.sqrt().atan2((1.0 - a).sqrt())
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}{}{}",
            self.latitude_text(),
            self.symbol_table,
            self.longitude_text(),
            self.symbol_code
        )
    }
}

fn round5(value: f64) -> f64 {
    (value * 100_000.0).round() / 100_000.0
}

/// Whole degrees and hundredths of minutes of `value`'s magnitude.
fn degrees_minutes(value: f64) -> (u32, u32) {
    let hundredths = (value.abs() * 6000.0).round() as u32;
    (hundredths / 6000, hundredths % 6000)
}

fn blank_minutes(text: String, degree_digits: usize, ambiguity: u8) -> String {
    let minute_slots = [
        degree_digits,
        degree_digits + 1,
        degree_digits + 3,
        degree_digits + 4,
    ];
    let mut bytes = text.into_bytes();
    for &slot in minute_slots.iter().rev().take(usize::from(ambiguity)) {
        bytes[slot] = b' ';
    }
    bytes.into_iter().map(char::from).collect()
}

/// Zeroes the trailing `ambiguity` digits of a four-digit `MMmm` value.
pub(crate) fn truncate_minutes(hundredths: u32, ambiguity: u8) -> u32 {
    let step = 10u32.pow(u32::from(ambiguity.min(MAX_AMBIGUITY)));
    hundredths / step * step
}

pub(crate) fn feet_from_meters(meters: f64) -> f64 {
    meters * FEET_PER_METER
}

/// `/A=nnnnnn` altitude in feet anywhere in a comment.
pub(crate) fn comment_altitude(comment: &[u8]) -> Option<f64> {
    let caps = COMMENT_ALTITUDE.captures(comment)?;
    let text = core::str::from_utf8(caps.get(1)?.as_bytes()).ok()?;
    text.parse::<i32>().ok().map(f64::from)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PositionSource {
    Uncompressed,
    Compressed,
    MicE,
    Nmea,
}

/// A decoded position plus what was found alongside it.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PositionField {
    pub position: Position,
    pub source: PositionSource,
    pub extension: Option<DataExtension>,
    /// Status bits carried in a Mic-E destination.
    pub mic_e_message: Option<MicEMessage>,
    pub fault: Option<Fault>,
}

impl PositionField {
    pub(crate) fn decoded(position: Position, source: PositionSource) -> Self {
        Self {
            position,
            source,
            extension: None,
            mic_e_message: None,
            fault: None,
        }
    }

    pub(crate) fn faulted(
        position: Position,
        source: PositionSource,
        fault: impl Into<Fault>,
    ) -> Self {
        Self {
            fault: Some(fault.into()),
            ..Self::decoded(position, source)
        }
    }

    pub fn is_compressed(&self) -> bool {
        self.source == PositionSource::Compressed
    }

    pub fn has_fault(&self) -> bool {
        self.fault.is_some()
    }
}

/// Decodes the position whose first byte is at `start`.
///
/// `destination` carries the Mic-E latitude; `timestamp` becomes the
/// position's generation instant.
pub fn decode_position(
    payload: &[u8],
    start: usize,
    destination: &Callsign,
    timestamp: DateTime<Utc>,
) -> (PositionField, usize) {
    match payload.first() {
        Some(b'\'' | b'`') => mic_e::decode(payload, destination, timestamp),
        Some(b'$') => nmea::decode(payload, timestamp),
        _ => match payload.get(start) {
            Some(b'/' | b'\\' | b'A'..=b'Z' | b'a'..=b'j') => {
                compressed::decode(payload, start, timestamp)
            }
            Some(b'0'..=b'9') => uncompressed::decode(payload, start, timestamp),
            Some(&other) => {
                let reason = format!("unsupported position format at '{}'", char::from(other));
                fault_at(start, PositionSource::Uncompressed, timestamp, reason)
            }
            None => fault_at(
                start,
                PositionSource::Uncompressed,
                timestamp,
                "Position packet too short",
            ),
        },
    }
}

pub(crate) fn fault_at(
    start: usize,
    source: PositionSource,
    timestamp: DateTime<Utc>,
    reason: impl Into<String>,
) -> (PositionField, usize) {
    let reason = reason.into();
    log::debug!("position fault: {reason}");
    let field = PositionField::faulted(Position::unknown(timestamp), source, Fault::new(reason));
    (field, start)
}
