use super::{comment_altitude, fault_at, Position, PositionField, PositionSource};
use crate::encoding::base91;
use crate::extension;
use chrono::{DateTime, Utc};

/// Table + 4 + 4 base-91 digits + symbol + `csT`.
pub const COMPRESSED_LEN: usize = 13;

pub fn decode(payload: &[u8], start: usize, timestamp: DateTime<Utc>) -> (PositionField, usize) {
    let Some(field) = payload.get(start..start + COMPRESSED_LEN) else {
        return fault_at(
            start,
            PositionSource::Compressed,
            timestamp,
            "Position packet too short",
        );
    };
    let symbol_table = match field[0] {
        overlay @ b'a'..=b'j' => char::from(b'0' + (overlay - b'a')),
        other => char::from(other),
    };
    let symbol_code = field[9];
    let (c, s, t) = (field[10], field[11], field[12]);

    let coordinates = base91::decode(&field[1..5]).and_then(|lat| {
        let lon = base91::decode(&field[5..9])?;
        Ok((
            90.0 - f64::from(lat) / 380_926.0,
            -180.0 + f64::from(lon) / 190_463.0,
        ))
    });
    let (lat, lon) = match coordinates {
        Ok(pair) => pair,
        Err(err) => {
            return fault_at(
                start,
                PositionSource::Compressed,
                timestamp,
                format!("compressed position: {err}"),
            );
        }
    };
    if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
        return fault_at(
            start,
            PositionSource::Compressed,
            timestamp,
            "compressed position out of range",
        );
    }

    let mut position = Position::new(lat, lon, 0, symbol_table, char::from(symbol_code), timestamp);
    if let Some(feet) = altitude(c, s, t) {
        position = position.with_altitude(feet);
    }
    let cursor = start + COMPRESSED_LEN;
    if position.altitude().is_none() && symbol_code != b'_' {
        if let Some(feet) = comment_altitude(&payload[cursor..]) {
            position = position.with_altitude(feet);
        }
    }

    let mut field = PositionField::decoded(position, PositionSource::Compressed);
    field.extension = extension::decode_compressed(c, s, t, symbol_code);
    (field, cursor)
}

/// GGA-sourced fixes put `1.002^cs` feet in the course/speed bytes.
fn altitude(c: u8, s: u8, t: u8) -> Option<f64> {
    if c == b' ' || !extension::is_gga_altitude(t) {
        return None;
    }
    let cs = base91::decode(&[c, s]).ok()?;
    Some(1.002f64.powi(cs as i32))
}
