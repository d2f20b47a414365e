use crate::position::{decode_position, PositionField};
use crate::time::{decode_time, TimeField, TimeFormat};
use crate::{Callsign, Fault};
use chrono::{DateTime, Utc};
use core::fmt;

/// Width of the space-padded object name.
pub const OBJECT_NAME_LEN: usize = 9;
/// Shortest payload that can hold a name, flag, timestamp and position.
pub const MIN_OBJECT_LEN: usize = 30;

const LIVE_FLAG: usize = 1 + OBJECT_NAME_LEN;

/// `;NAME_____*DDHHMMz` followed by a position.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ObjectField {
    pub name: String,
    /// `false` once the object has been killed (`_`).
    pub live: bool,
    pub time: TimeField,
    pub position: PositionField,
}

impl fmt::Display for ObjectField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let flag = if self.live { '*' } else { '_' };
        write!(f, ";{:<width$}{flag}", self.name, width = OBJECT_NAME_LEN)?;
        let stamp = self.time.timestamp().unwrap_or_default();
        match self.time.format() {
            Some(TimeFormat::HourMinuteSecond) => write!(f, "{}", stamp.format("%H%M%Sh"))?,
            Some(TimeFormat::DayHourMinuteLocal) => write!(f, "{}", stamp.format("%d%H%M/"))?,
            _ => write!(f, "{}", stamp.format("%d%H%Mz"))?,
        }
        write!(f, "{}", self.position.position)
    }
}

/// Decodes a `;` payload. Payloads too short to be an object yield only a
/// fault.
pub fn decode_object(
    payload: &[u8],
    destination: &Callsign,
    now: DateTime<Utc>,
) -> Result<(ObjectField, usize), Fault> {
    if payload.len() < MIN_OBJECT_LEN {
        return Err(Fault::new(format!(
            "object payload of {} bytes is too short",
            payload.len()
        )));
    }
    let name = String::from_utf8_lossy(&payload[1..LIVE_FLAG])
        .trim()
        .to_string();
    let live = payload[LIVE_FLAG] == b'*';

    let (time, cursor) = decode_time(payload, LIVE_FLAG + 1, now);
    let generated = match (time.has_fault(), time.timestamp()) {
        (false, Some(stamp)) => stamp,
        _ => now,
    };
    let (position, cursor) = decode_position(payload, cursor, destination, generated);
    let object = ObjectField {
        name,
        live,
        time,
        position,
    };
    Ok((object, cursor))
}

#[cfg(test)]
mod tests {
    use super::decode_object;
    use crate::extension::DataExtension;
    use crate::Callsign;
    use chrono::{TimeZone, Utc};

    #[test]
    fn live_object_with_extension() {
        let now = Utc.with_ymd_and_hms(2024, 3, 20, 12, 0, 0).unwrap();
        let payload = b";LEADER   *092345z4903.50N/07201.75W>088/036Convoy";
        let (object, cursor) = decode_object(payload, &Callsign::parse("APRS"), now).unwrap();
        assert_eq!(object.name, "LEADER");
        assert!(object.live);
        assert_eq!(
            object.time.timestamp(),
            Some(Utc.with_ymd_and_hms(2024, 3, 9, 23, 45, 0).unwrap())
        );
        assert_eq!(object.position.position.latitude(), 49.05833);
        assert_eq!(object.position.position.timestamp(), object.time.timestamp().unwrap());
        assert_eq!(
            object.position.extension,
            Some(DataExtension::CourseSpeed {
                course: 88,
                speed: 36
            })
        );
        assert_eq!(&payload[cursor..], b"Convoy");
        assert_eq!(
            object.to_string(),
            ";LEADER   *092345z4903.50N/07201.75W>"
        );
    }

    #[test]
    fn killed_compressed_object() {
        let now = Utc.with_ymd_and_hms(2024, 3, 20, 12, 0, 0).unwrap();
        let payload = b";HAMFEST  _111111z/5L!!<*e7H sT";
        let (object, cursor) = decode_object(payload, &Callsign::parse("APRS"), now).unwrap();
        assert!(!object.live);
        assert_eq!(object.name, "HAMFEST");
        assert!(object.position.is_compressed());
        assert_eq!(cursor, payload.len());
    }

    #[test]
    fn short_object_is_only_a_fault() {
        let now = Utc.with_ymd_and_hms(2024, 3, 20, 12, 0, 0).unwrap();
        let fault = decode_object(b";SHORT    *092345z4903", &Callsign::parse("APRS"), now)
            .unwrap_err();
        assert_eq!(fault.reason(), "object payload of 22 bytes is too short");
    }
}
