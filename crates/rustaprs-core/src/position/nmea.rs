use super::{fault_at, feet_from_meters, Position, PositionField, PositionSource};
use crate::extension::DataExtension;
use crate::DecodeError;
use chrono::{DateTime, Utc};

const MIN_SENTENCE_LEN: usize = 11;

/// Decodes a raw `$GPxxx` sentence. The whole sentence is consumed.
pub fn decode(payload: &[u8], timestamp: DateTime<Utc>) -> (PositionField, usize) {
    if payload.len() < MIN_SENTENCE_LEN {
        return fault_at(1, PositionSource::Nmea, timestamp, "Unable to parse NMEA position");
    }
    match sentence(payload, timestamp) {
        Ok(field) => (field, payload.len()),
        Err(err) => fault_at(1, PositionSource::Nmea, timestamp, format!("NMEA: {err}")),
    }
}

fn sentence(payload: &[u8], timestamp: DateTime<Utc>) -> Result<PositionField, DecodeError> {
    let text = core::str::from_utf8(payload)
        .map_err(|_| DecodeError::Message("sentence is not ASCII"))?
        .trim_end_matches(['\r', '\n']);
    let body = text.split_once('*').map_or(text, |(body, _checksum)| body);
    let fields: Vec<&str> = body.split(',').collect();
    let kind = fields[0]
        .get(3..)
        .ok_or(DecodeError::Message("missing sentence type"))?;

    let (lat, lon, extension, altitude) = match kind {
        "RMC" => {
            if field(&fields, 2)? != "A" {
                return Err(DecodeError::Message("fix not valid"));
            }
            let lat = coordinate(field(&fields, 3)?, field(&fields, 4)?)?;
            let lon = coordinate(field(&fields, 5)?, field(&fields, 6)?)?;
            let speed = fields.get(7).and_then(|v| v.parse::<f64>().ok());
            let course = fields.get(8).and_then(|v| v.parse::<f64>().ok());
            let extension = speed.zip(course).map(|(speed, course)| DataExtension::CourseSpeed {
                course: course.round() as u16,
                speed: speed.round() as u16,
            });
            (lat, lon, extension, None)
        }
        "GGA" => {
            if field(&fields, 6)? == "0" {
                return Err(DecodeError::Message("fix not valid"));
            }
            let lat = coordinate(field(&fields, 2)?, field(&fields, 3)?)?;
            let lon = coordinate(field(&fields, 4)?, field(&fields, 5)?)?;
            let altitude = fields.get(9).and_then(|v| v.parse::<f64>().ok());
            (lat, lon, None, altitude.map(feet_from_meters))
        }
        "GLL" => {
            if fields.get(6).is_some_and(|status| *status != "A") {
                return Err(DecodeError::Message("fix not valid"));
            }
            let lat = coordinate(field(&fields, 1)?, field(&fields, 2)?)?;
            let lon = coordinate(field(&fields, 3)?, field(&fields, 4)?)?;
            (lat, lon, None, None)
        }
        _ => return Err(DecodeError::Message("unsupported sentence")),
    };

    let mut position = Position::new(lat, lon, 0, '\\', '.', timestamp);
    if let Some(feet) = altitude {
        position = position.with_altitude(feet);
    }
    let mut field = PositionField::decoded(position, PositionSource::Nmea);
    field.extension = extension;
    Ok(field)
}

fn field<'a>(fields: &[&'a str], index: usize) -> Result<&'a str, DecodeError> {
    fields.get(index).copied().ok_or(DecodeError::UnexpectedEof)
}

/// `[d]ddmm.mmmm` plus hemisphere letter.
fn coordinate(value: &str, hemisphere: &str) -> Result<f64, DecodeError> {
    let raw: f64 = value
        .parse()
        .map_err(|_| DecodeError::InvalidNumber(value.to_string()))?;
    let degrees = (raw / 100.0).trunc();
    let minutes = raw - degrees * 100.0;
    if !(0.0..60.0).contains(&minutes) {
        return Err(DecodeError::InvalidNumber(value.to_string()));
    }
    let magnitude = degrees + minutes / 60.0;
    match hemisphere {
        "N" if magnitude <= 90.0 => Ok(magnitude),
        "S" if magnitude <= 90.0 => Ok(-magnitude),
        "E" if magnitude <= 180.0 => Ok(magnitude),
        "W" if magnitude <= 180.0 => Ok(-magnitude),
        _ => Err(DecodeError::InvalidValue),
    }
}
