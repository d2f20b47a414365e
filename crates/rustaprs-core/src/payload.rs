//! The information field and its dispatch on the data type identifier.

use crate::extension::DataExtension;
use crate::item::{decode_item, ItemField};
use crate::message::{decode_message, MessageField};
use crate::object::{decode_object, ObjectField};
use crate::position::{decode_position, PositionField};
use crate::time::{decode_time, TimeField};
use crate::weather::{decode_weather, WeatherField};
use crate::{Callsign, Fault};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

/// What a payload, or one decoded piece of it, carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DataType {
    Unspecified,
    Timestamp,
    Position,
    Weather,
    Message,
    Object,
    Item,
    Status,
    StationCapabilities,
    Query,
    Telemetry,
    UserDefined,
    ThirdParty,
}

/// One decoded piece of a payload.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AprsData {
    Time(TimeField),
    Position(PositionField),
    Weather(WeatherField),
    Message(MessageField),
    Object(ObjectField),
    Item(ItemField),
    /// Stands in for a piece that could not be produced at all.
    Fault(Fault),
}

impl AprsData {
    /// Every fault in this piece, nested ones included.
    pub fn faults(&self) -> Vec<&Fault> {
        match self {
            Self::Time(time) => time.fault().into_iter().collect(),
            Self::Position(position) => position.fault.iter().collect(),
            Self::Weather(weather) => weather.fault.iter().collect(),
            Self::Message(message) => message.fault.iter().collect(),
            Self::Object(object) => object
                .time
                .fault()
                .into_iter()
                .chain(object.position.fault.iter())
                .collect(),
            Self::Item(item) => item.position.fault.iter().collect(),
            Self::Fault(fault) => vec![fault],
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Payload {
    raw: Vec<u8>,
    data: BTreeMap<DataType, AprsData>,
    cursor: usize,
    comment: String,
}

impl Payload {
    /// Data type identifier; 0 for an empty information field.
    pub fn dti(&self) -> u8 {
        self.raw.first().copied().unwrap_or(0)
    }

    pub fn raw(&self) -> &[u8] {
        &self.raw
    }

    pub fn data(&self) -> &BTreeMap<DataType, AprsData> {
        &self.data
    }

    pub fn get(&self, data_type: DataType) -> Option<&AprsData> {
        self.data.get(&data_type)
    }

    /// Index of the first byte no decoder consumed.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Undecoded remainder of the payload.
    pub fn comment(&self) -> &str {
        &self.comment
    }

    pub fn time(&self) -> Option<&TimeField> {
        match self.get(DataType::Timestamp)? {
            AprsData::Time(time) => Some(time),
            _ => None,
        }
    }

    /// The position, whether reported directly or by an object or item.
    pub fn position(&self) -> Option<&PositionField> {
        self.data.values().find_map(|data| match data {
            AprsData::Position(position) => Some(position),
            AprsData::Object(object) => Some(&object.position),
            AprsData::Item(item) => Some(&item.position),
            _ => None,
        })
    }

    pub fn extension(&self) -> Option<DataExtension> {
        self.position()?.extension
    }

    pub fn weather(&self) -> Option<&WeatherField> {
        match self.get(DataType::Weather)? {
            AprsData::Weather(weather) => Some(weather),
            _ => None,
        }
    }

    pub fn message(&self) -> Option<&MessageField> {
        match self.get(DataType::Message)? {
            AprsData::Message(message) => Some(message),
            _ => None,
        }
    }

    pub fn object(&self) -> Option<&ObjectField> {
        match self.get(DataType::Object)? {
            AprsData::Object(object) => Some(object),
            _ => None,
        }
    }

    pub fn item(&self) -> Option<&ItemField> {
        match self.get(DataType::Item)? {
            AprsData::Item(item) => Some(item),
            _ => None,
        }
    }

    /// The sender advertises APRS messaging.
    pub fn messaging(&self) -> bool {
        matches!(self.dti(), b'=' | b'@')
    }

    pub fn has_fault(&self) -> bool {
        self.data.values().any(|data| !data.faults().is_empty())
    }

    /// All fault reasons joined with `"; "`; empty when nothing faulted.
    pub fn fault_reason(&self) -> String {
        let reasons: Vec<&str> = self
            .data
            .values()
            .flat_map(AprsData::faults)
            .map(Fault::reason)
            .collect();
        reasons.join("; ")
    }
}

/// Shortest `T#sss,aaa,...` report accepted as telemetry.
pub const MIN_TELEMETRY_LEN: usize = 19;

/// Decodes an information field. `destination` is needed for Mic-E and `now`
/// anchors partial timestamps.
pub fn decode_payload(raw: &[u8], destination: &Callsign, now: DateTime<Utc>) -> (DataType, Payload) {
    let mut data = BTreeMap::new();
    let (data_type, cursor) = match raw.first().copied() {
        None => {
            data.insert(
                DataType::Unspecified,
                AprsData::Fault(Fault::new("empty information field")),
            );
            (DataType::Unspecified, 0)
        }
        Some(b'/' | b'@') => {
            let (time, cursor) = decode_time(raw, 1, now);
            let generated = match (time.has_fault(), time.timestamp()) {
                (false, Some(stamp)) => stamp,
                _ => now,
            };
            data.insert(DataType::Timestamp, AprsData::Time(time));
            position_report(&mut data, raw, cursor, destination, generated)
        }
        Some(b'$') if raw.starts_with(b"$ULTW") => (DataType::Weather, 1),
        Some(b'!') if raw.starts_with(b"!!") => (DataType::Weather, 1),
        Some(b'!' | b'=' | b'`' | b'\'' | b'$') => {
            position_report(&mut data, raw, 1, destination, now)
        }
        Some(b':') => {
            let (message, cursor) = decode_message(raw);
            data.insert(DataType::Message, AprsData::Message(message));
            (DataType::Message, cursor)
        }
        Some(b';') => match decode_object(raw, destination, now) {
            Ok((object, cursor)) => {
                let weather = symbol_weather(&mut data, raw, &object.position, cursor);
                data.insert(DataType::Object, AprsData::Object(object));
                (DataType::Object, weather)
            }
            Err(fault) => {
                data.insert(DataType::Object, AprsData::Fault(fault));
                (DataType::Object, 1)
            }
        },
        Some(b')') => match decode_item(raw, destination, now) {
            Ok((item, cursor)) => {
                let weather = symbol_weather(&mut data, raw, &item.position, cursor);
                data.insert(DataType::Item, AprsData::Item(item));
                (DataType::Item, weather)
            }
            Err(fault) => {
                data.insert(DataType::Item, AprsData::Fault(fault));
                (DataType::Item, 1)
            }
        },
        Some(b'_') => {
            let (time, cursor) = decode_time(raw, 1, now);
            data.insert(DataType::Timestamp, AprsData::Time(time));
            let (weather, cursor) = decode_weather(raw, cursor);
            data.insert(DataType::Weather, AprsData::Weather(weather));
            (DataType::Weather, cursor)
        }
        Some(b'#' | b'*') => (DataType::Weather, 1),
        Some(b'>') => (DataType::Status, 1),
        Some(b'<') => (DataType::StationCapabilities, 1),
        Some(b'?') => (DataType::Query, 1),
        Some(b'T') if raw.len() < MIN_TELEMETRY_LEN => {
            let reason = format!("telemetry payload of {} bytes is too short", raw.len());
            data.insert(DataType::Telemetry, AprsData::Fault(Fault::new(reason)));
            (DataType::Telemetry, 1)
        }
        Some(b'T') => (DataType::Telemetry, 1),
        Some(b'{') => (DataType::UserDefined, 1),
        Some(b'}') => (DataType::ThirdParty, 1),
        Some(other) => {
            let reason = format!(
                "unsupported data type identifier '{}'",
                char::from(other).escape_default()
            );
            log::debug!("{reason}");
            data.insert(DataType::Unspecified, AprsData::Fault(Fault::new(reason)));
            (DataType::Unspecified, 1)
        }
    };

    let comment = String::from_utf8_lossy(&raw[cursor..]).into_owned();
    let payload = Payload {
        raw: raw.to_vec(),
        data,
        cursor,
        comment,
    };
    (data_type, payload)
}

/// Position followed, for the weather symbol, by a weather report.
fn position_report(
    data: &mut BTreeMap<DataType, AprsData>,
    raw: &[u8],
    start: usize,
    destination: &Callsign,
    generated: DateTime<Utc>,
) -> (DataType, usize) {
    let (position, cursor) = decode_position(raw, start, destination, generated);
    let weather = symbol_weather(data, raw, &position, cursor);
    data.insert(DataType::Position, AprsData::Position(position));
    let data_type = if data.contains_key(&DataType::Weather) {
        DataType::Weather
    } else {
        DataType::Position
    };
    (data_type, weather)
}

/// Decodes the weather report that follows a `_` symbol, returning the
/// cursor after it.
fn symbol_weather(
    data: &mut BTreeMap<DataType, AprsData>,
    raw: &[u8],
    position: &PositionField,
    cursor: usize,
) -> usize {
    if position.has_fault() || position.position.symbol_code() != '_' {
        return cursor;
    }
    let (weather, cursor) = decode_weather(raw, cursor);
    data.insert(DataType::Weather, AprsData::Weather(weather));
    cursor
}
