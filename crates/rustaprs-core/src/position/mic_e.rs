//! Mic-E: latitude, hemisphere, longitude offset and message bits ride in
//! the six characters of the AX.25 destination; the information field holds
//! the longitude, speed, course and symbol.

use super::{fault_at, feet_from_meters, truncate_minutes, Position, PositionField, PositionSource};
use crate::encoding::base91;
use crate::extension;
use crate::{Callsign, DecodeError};
use chrono::{DateTime, Utc};

const DESTINATION_LEN: usize = 6;
/// DTI + longitude(3) + speed/course(3) + symbol code + symbol table.
const BODY_LEN: usize = 9;
const ALTITUDE_OFFSET_METERS: f64 = 10_000.0;

/// Status encoded in the A/B/C message bits of the destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MicEMessage {
    OffDuty,
    EnRoute,
    InService,
    Returning,
    Committed,
    Special,
    Priority,
    Emergency,
    /// Custom-0 through Custom-6.
    Custom(u8),
    /// Standard and custom bits mixed.
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MessageBit {
    Zero,
    Standard,
    Custom,
}

#[derive(Debug, Clone, Copy)]
struct DestinationChar {
    /// `None` for an ambiguity blank.
    digit: Option<u8>,
    /// North, +100 longitude offset, or West depending on the column.
    flag: bool,
    bit: MessageBit,
}

fn destination_char(b: u8) -> Result<DestinationChar, DecodeError> {
    let (digit, flag, bit) = match b {
        b'0'..=b'9' => (Some(b - b'0'), false, MessageBit::Zero),
        b'A'..=b'J' => (Some(b - b'A'), false, MessageBit::Custom),
        b'K' => (None, false, MessageBit::Custom),
        b'L' => (None, false, MessageBit::Zero),
        b'P'..=b'Y' => (Some(b - b'P'), true, MessageBit::Standard),
        b'Z' => (None, true, MessageBit::Standard),
        _ => return Err(DecodeError::Message("invalid destination character")),
    };
    Ok(DestinationChar { digit, flag, bit })
}

fn message(bits: [MessageBit; 3]) -> MicEMessage {
    let (mut standard, mut custom) = (0u8, 0u8);
    for (i, bit) in bits.iter().enumerate() {
        let mask = 1 << (2 - i);
        match bit {
            MessageBit::Standard => standard |= mask,
            MessageBit::Custom => custom |= mask,
            MessageBit::Zero => {}
        }
    }
    match (standard, custom) {
        (0, 0) => MicEMessage::Emergency,
        (0, custom) => MicEMessage::Custom(7 - custom),
        (standard, 0) => match standard {
            7 => MicEMessage::OffDuty,
            6 => MicEMessage::EnRoute,
            5 => MicEMessage::InService,
            4 => MicEMessage::Returning,
            3 => MicEMessage::Committed,
            2 => MicEMessage::Special,
            _ => MicEMessage::Priority,
        },
        _ => MicEMessage::Unknown,
    }
}

pub fn decode(
    payload: &[u8],
    destination: &Callsign,
    timestamp: DateTime<Utc>,
) -> (PositionField, usize) {
    decode_fields(payload, destination, timestamp).unwrap_or_else(|err| {
        fault_at(1, PositionSource::MicE, timestamp, format!("Mic-E: {err}"))
    })
}

fn decode_fields(
    payload: &[u8],
    destination: &Callsign,
    timestamp: DateTime<Utc>,
) -> Result<(PositionField, usize), DecodeError> {
    let dest = destination.base_call().as_bytes();
    if dest.len() < DESTINATION_LEN {
        return Err(DecodeError::Message("destination shorter than 6 characters"));
    }
    let mut chars = [DestinationChar {
        digit: None,
        flag: false,
        bit: MessageBit::Zero,
    }; DESTINATION_LEN];
    for (slot, &b) in chars.iter_mut().zip(dest) {
        *slot = destination_char(b)?;
    }

    let blanks = chars.iter().rev().take_while(|c| c.digit.is_none()).count();
    let kept = DESTINATION_LEN - blanks;
    if blanks > 4 || chars[..kept].iter().any(|c| c.digit.is_none()) {
        return Err(DecodeError::Message("ambiguity must blank trailing digits"));
    }
    let ambiguity = blanks as u8;
    let d = chars.map(|c| u32::from(c.digit.unwrap_or(0)));
    let lat_degrees = d[0] * 10 + d[1];
    let lat_minutes = d[2] * 1000 + d[3] * 100 + d[4] * 10 + d[5];
    if lat_degrees > 89 || lat_minutes >= 6000 {
        return Err(DecodeError::Message("latitude out of range"));
    }
    let mut latitude = f64::from(lat_degrees) + f64::from(lat_minutes) / 6000.0;
    if !chars[3].flag {
        latitude = -latitude;
    }

    let body = payload
        .get(..BODY_LEN)
        .ok_or(DecodeError::Message("information field too short"))?;
    let mut lon_degrees = i32::from(body[1]) - 28;
    if chars[4].flag {
        lon_degrees += 100;
    }
    if (180..=189).contains(&lon_degrees) {
        lon_degrees -= 80;
    } else if (190..=199).contains(&lon_degrees) {
        lon_degrees -= 190;
    }
    let mut lon_minutes = i32::from(body[2]) - 28;
    if lon_minutes >= 60 {
        lon_minutes -= 60;
    }
    let lon_hundredths = i32::from(body[3]) - 28;
    if !(0..=179).contains(&lon_degrees)
        || !(0..60).contains(&lon_minutes)
        || !(0..100).contains(&lon_hundredths)
    {
        return Err(DecodeError::Message("longitude out of range"));
    }
    let lon_minutes = truncate_minutes((lon_minutes * 100 + lon_hundredths) as u32, ambiguity);
    let mut longitude = f64::from(lon_degrees) + f64::from(lon_minutes) / 6000.0;
    if chars[5].flag {
        longitude = -longitude;
    }

    let mut position = Position::new(
        latitude,
        longitude,
        ambiguity,
        char::from(body[8]),
        char::from(body[7]),
        timestamp,
    );

    let mut cursor = BODY_LEN;
    if matches!(payload.get(cursor), Some(b'>' | b']' | b'`' | b'\'')) {
        cursor += 1;
    }
    if payload.get(cursor + 3) == Some(&b'}') {
        if let Ok(value) = base91::decode(&payload[cursor..cursor + 3]) {
            let meters = f64::from(value) - ALTITUDE_OFFSET_METERS;
            position = position.with_altitude(feet_from_meters(meters));
            cursor += 4;
        }
    }

    let mut field = PositionField::decoded(position, PositionSource::MicE);
    field.extension = extension::decode_mic_e(body[4], body[5], body[6]);
    field.mic_e_message = Some(message([chars[0].bit, chars[1].bit, chars[2].bit]));
    Ok((field, cursor))
}

#[cfg(test)]
mod tests {
    use super::{decode, MicEMessage};
    use crate::extension::DataExtension;
    use crate::Callsign;
    use chrono::{DateTime, Utc};

    fn epoch() -> DateTime<Utc> {
        DateTime::default()
    }

    const BODY: &[u8] = b"`(#fn\"O>/]\"4T}Hello";

    #[test]
    fn decodes_destination_and_body() {
        let (field, cursor) = decode(BODY, &Callsign::parse("S32UVT"), epoch());
        assert!(field.fault.is_none(), "{:?}", field.fault);
        assert_eq!(field.position.latitude(), 33.42733);
        assert_eq!(field.position.longitude(), -112.129);
        assert_eq!(field.position.symbol_code(), '>');
        assert_eq!(field.position.symbol_table(), '/');
        assert_eq!(
            field.extension,
            Some(DataExtension::CourseSpeed {
                course: 251,
                speed: 20
            })
        );
        assert_eq!(field.mic_e_message, Some(MicEMessage::Returning));
        let feet = field.position.altitude().unwrap();
        assert!((feet - 200.1).abs() < 0.1, "{feet}");
        assert_eq!(&BODY[cursor..], b"Hello");
    }

    #[test]
    fn blanked_digits_set_ambiguity() {
        let (field, _) = decode(BODY, &Callsign::parse("S32UZZ"), epoch());
        assert_eq!(field.position.ambiguity(), 2);
        assert_eq!(field.position.latitude(), 33.41667);
        assert_eq!(field.position.longitude(), -112.11667);
    }

    #[test]
    fn south_east_and_custom_message() {
        // Only the A bit is set, and it is a custom bit: Custom-3.
        let (field, _) = decode(BODY, &Callsign::parse("A32567"), epoch());
        assert!(field.position.latitude() < 0.0);
        assert_eq!(field.position.longitude(), 12.129);
        assert_eq!(field.mic_e_message, Some(MicEMessage::Custom(3)));
    }

    #[test]
    fn message_bits() {
        let cases = [
            ("PPP000", MicEMessage::OffDuty),
            ("PP0000", MicEMessage::EnRoute),
            ("000000", MicEMessage::Emergency),
            ("AAA000", MicEMessage::Custom(0)),
            ("PA0000", MicEMessage::Unknown),
        ];
        for (dest, expected) in cases {
            let (field, _) = decode(b"`(#fn\"O>/", &Callsign::parse(dest), epoch());
            assert_eq!(field.mic_e_message, Some(expected), "{dest}");
        }
    }

    #[test]
    fn bad_destination_faults() {
        let (field, cursor) = decode(BODY, &Callsign::parse("APRS"), epoch());
        assert!(field.fault.is_some());
        assert_eq!(cursor, 1);
        let (field, _) = decode(BODY, &Callsign::parse("S3!UVT"), epoch());
        assert!(field.fault.is_some());
        let (field, _) = decode(b"`(#f", &Callsign::parse("S32UVT"), epoch());
        assert_eq!(
            field.fault.unwrap().reason(),
            "Mic-E: information field too short"
        );
    }
}
