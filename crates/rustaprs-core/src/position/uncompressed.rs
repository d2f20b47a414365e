use super::{comment_altitude, fault_at, truncate_minutes, Position, PositionField, PositionSource};
use crate::encoding::reader::parse_decimal;
use crate::extension::{self, EXTENSION_LEN};
use crate::DecodeError;
use chrono::{DateTime, Utc};

/// `DDMM.mmN` + table + `DDDMM.mmW` + symbol.
pub const UNCOMPRESSED_LEN: usize = 19;

pub fn decode(payload: &[u8], start: usize, timestamp: DateTime<Utc>) -> (PositionField, usize) {
    let Some(field) = payload.get(start..start + UNCOMPRESSED_LEN) else {
        return fault_at(
            start,
            PositionSource::Uncompressed,
            timestamp,
            "Position packet too short",
        );
    };
    let symbol_code = field[18];

    let lat = latitude(&field[..8]);
    let ambiguity = lat.as_ref().map_or(0, |(_, ambiguity)| *ambiguity);
    let lon = longitude(&field[9..18], ambiguity);
    let mut position = Position::new(
        lat.as_ref().map_or(0.0, |(value, _)| *value),
        lon.as_ref().map_or(0.0, |value| *value),
        ambiguity,
        char::from(field[8]),
        char::from(symbol_code),
        timestamp,
    );
    if let Some(err) = lat.err().or(lon.err()) {
        log::debug!("uncompressed position fault: {err}");
        return (
            PositionField::faulted(position, PositionSource::Uncompressed, err),
            start,
        );
    }

    let mut cursor = start + UNCOMPRESSED_LEN;
    let extension = extension::decode_uncompressed(payload, cursor, symbol_code);
    if extension.is_some() {
        cursor += EXTENSION_LEN;
    }
    if symbol_code != b'_' {
        if let Some(feet) = comment_altitude(&payload[cursor..]) {
            position = position.with_altitude(feet);
        }
    }

    let mut field = PositionField::decoded(position, PositionSource::Uncompressed);
    field.extension = extension;
    (field, cursor)
}

/// Replaces trailing blanks with zeros and returns how many there were.
fn unblank(digits: &mut [u8]) -> Result<u8, DecodeError> {
    let blanks = digits.iter().rev().take_while(|b| **b == b' ').count();
    let kept = digits.len() - blanks;
    if digits[..kept].contains(&b' ') {
        return Err(DecodeError::Message(
            "position ambiguity must blank trailing digits",
        ));
    }
    digits[kept..].fill(b'0');
    Ok(blanks as u8)
}

fn latitude(text: &[u8]) -> Result<(f64, u8), DecodeError> {
    if text[4] != b'.' {
        return Err(DecodeError::Message("latitude is missing its decimal point"));
    }
    let mut minutes = [text[2], text[3], text[5], text[6]];
    let ambiguity = unblank(&mut minutes)?;
    let degrees = parse_decimal(&text[..2])?;
    let minutes = parse_decimal(&minutes)?;
    if degrees > 90 || minutes >= 6000 {
        return Err(DecodeError::Message("latitude out of range"));
    }
    let value = f64::from(degrees) + f64::from(minutes) / 6000.0;
    if value > 90.0 {
        return Err(DecodeError::Message("latitude out of range"));
    }
    match text[7] {
        b'N' | b'n' => Ok((value, ambiguity)),
        b'S' | b's' => Ok((-value, ambiguity)),
        _ => Err(DecodeError::Message("latitude hemisphere must be N or S")),
    }
}

fn longitude(text: &[u8], ambiguity: u8) -> Result<f64, DecodeError> {
    if text[5] != b'.' {
        return Err(DecodeError::Message("longitude is missing its decimal point"));
    }
    let mut minutes = [text[3], text[4], text[6], text[7]];
    unblank(&mut minutes)?;
    let degrees = parse_decimal(&text[..3])?;
    let minutes = truncate_minutes(parse_decimal(&minutes)?, ambiguity);
    if degrees > 180 || minutes >= 6000 {
        return Err(DecodeError::Message("longitude out of range"));
    }
    let value = f64::from(degrees) + f64::from(minutes) / 6000.0;
    if value > 180.0 {
        return Err(DecodeError::Message("longitude out of range"));
    }
    match text[8] {
        b'E' | b'e' => Ok(value),
        b'W' | b'w' => Ok(-value),
        _ => Err(DecodeError::Message("longitude hemisphere must be E or W")),
    }
}
