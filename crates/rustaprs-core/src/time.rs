use crate::encoding::reader::Reader;
use crate::{DecodeError, Fault};
use chrono::{DateTime, Datelike, NaiveDate, Utc};

/// Bytes of a DHM or HMS timestamp, indicator included.
pub const TIME_LEN: usize = 7;
/// Bytes of an MDHM timestamp, which has no indicator.
pub const MDHM_LEN: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TimeFormat {
    /// `DDHHMMz`
    DayHourMinuteZulu,
    /// `DDHHMM/`, station local time with an unknown offset.
    DayHourMinuteLocal,
    /// `HHMMSSh`
    HourMinuteSecond,
    /// `MMDDHHMM`
    MonthDayHourMinute,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TimeField {
    format: Option<TimeFormat>,
    timestamp: Option<DateTime<Utc>>,
    fault: Option<Fault>,
}

impl TimeField {
    pub fn format(&self) -> Option<TimeFormat> {
        self.format
    }

    /// Decoded instant; epoch zero when the field faulted on its content and
    /// absent when the field was cut short.
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.timestamp
    }

    /// Local-time stamps are decoded as if they were UTC.
    pub fn is_local(&self) -> bool {
        self.format == Some(TimeFormat::DayHourMinuteLocal)
    }

    pub fn fault(&self) -> Option<&Fault> {
        self.fault.as_ref()
    }

    pub fn has_fault(&self) -> bool {
        self.fault.is_some()
    }
}

/// Decodes the timestamp whose first byte is at `start`.
///
/// The format indicator sits at `start + 6`. Returns the field and the index
/// of the first byte after it.
pub fn decode_time(payload: &[u8], start: usize, now: DateTime<Utc>) -> (TimeField, usize) {
    let cursor = (start + TIME_LEN).min(payload.len());
    let Some(&indicator) = payload.get(start + TIME_LEN - 1) else {
        let field = TimeField {
            format: None,
            timestamp: None,
            fault: Some(Fault::new("Index out of bounds parsing time field")),
        };
        return (field, cursor);
    };

    let (format, len) = match indicator {
        b'z' => (TimeFormat::DayHourMinuteZulu, TIME_LEN),
        b'/' => (TimeFormat::DayHourMinuteLocal, TIME_LEN),
        b'h' => (TimeFormat::HourMinuteSecond, TIME_LEN),
        b'0'..=b'9' => (TimeFormat::MonthDayHourMinute, MDHM_LEN),
        other => {
            let field = TimeField {
                format: None,
                timestamp: Some(DateTime::default()),
                fault: Some(Fault::new(format!(
                    "unsupported time indicator '{}'",
                    char::from(other)
                ))),
            };
            return (field, cursor);
        }
    };

    let mut r = Reader::at(payload, start);
    let decoded = match format {
        TimeFormat::DayHourMinuteZulu | TimeFormat::DayHourMinuteLocal => {
            day_hour_minute(&mut r, now)
        }
        TimeFormat::HourMinuteSecond => hour_minute_second(&mut r, now),
        TimeFormat::MonthDayHourMinute => month_day_hour_minute(&mut r, now),
    };
    if format == TimeFormat::DayHourMinuteLocal {
        log::debug!("local-time timestamp decoded without a UTC offset");
    }

    let cursor = (start + len).min(payload.len());
    let field = match decoded {
        Ok(timestamp) => TimeField {
            format: Some(format),
            timestamp: Some(timestamp),
            fault: None,
        },
        Err(err) => TimeField {
            format: Some(format),
            timestamp: Some(DateTime::default()),
            fault: Some(err.into()),
        },
    };
    (field, cursor)
}

fn day_hour_minute(r: &mut Reader<'_>, now: DateTime<Utc>) -> Result<DateTime<Utc>, DecodeError> {
    let day = r.read_decimal(2)?;
    let hour = r.read_decimal(2)?;
    let minute = r.read_decimal(2)?;

    // A day later than today belongs to last month.
    let (mut year, mut month) = (now.year(), now.month());
    if day > now.day() {
        if month == 1 {
            month = 12;
            year -= 1;
        } else {
            month -= 1;
        }
    }
    utc(year, month, day, hour, minute, 0)
}

fn hour_minute_second(
    r: &mut Reader<'_>,
    now: DateTime<Utc>,
) -> Result<DateTime<Utc>, DecodeError> {
    let hour = r.read_decimal(2)?;
    let minute = r.read_decimal(2)?;
    let second = r.read_decimal(2)?;

    let today = now.date_naive();
    let stamp = utc(today.year(), today.month(), today.day(), hour, minute, second)?;
    if stamp <= now {
        return Ok(stamp);
    }
    let yesterday = today.pred_opt().ok_or(DecodeError::InvalidValue)?;
    utc(
        yesterday.year(),
        yesterday.month(),
        yesterday.day(),
        hour,
        minute,
        second,
    )
}

fn month_day_hour_minute(
    r: &mut Reader<'_>,
    now: DateTime<Utc>,
) -> Result<DateTime<Utc>, DecodeError> {
    let month = r.read_decimal(2)?;
    let day = r.read_decimal(2)?;
    let hour = r.read_decimal(2)?;
    let minute = r.read_decimal(2)?;

    let stamp = utc(now.year(), month, day, hour, minute, 0)?;
    if stamp <= now {
        return Ok(stamp);
    }
    utc(now.year() - 1, month, day, hour, minute, 0)
}

fn utc(
    year: i32,
    month: u32,
    day: u32,
    hour: u32,
    minute: u32,
    second: u32,
) -> Result<DateTime<Utc>, DecodeError> {
    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|date| date.and_hms_opt(hour, minute, second))
        .map(|naive| naive.and_utc())
        .ok_or(DecodeError::Message("timestamp is not a valid calendar time"))
}
