//! Weather report fields.
//!
//! The complete `ddd/sssgGGGtTTTrRRRpPPPPPPPhHHbBBBBB` block is recognised
//! in one match. Anything else is read field by field, each field probed
//! with its own pattern at the cursor until none matches. Fields still
//! missing after that are searched for in the unread tail, which stays in
//! the comment.

use crate::Fault;
use once_cell::sync::Lazy;
use regex::bytes::Regex;

const MISSING_3: &str = r"\d{3}|\.{3}| {3}";

static PRIMARY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{3})/(\d{3})g(\d{3})t(.{3})r(\d{3})p(\d{3})P(\d{3})h(\d{2})b(\d{5})").unwrap()
});

static PROBES: Lazy<Vec<(Probe, Regex)>> = Lazy::new(|| {
    let three = |prefix: &str| format!("^{prefix}({MISSING_3})");
    [
        (Probe::Wind, format!("^({MISSING_3})/({MISSING_3})")),
        (Probe::Single(Field::WindDirection), three("c")),
        (Probe::Single(Field::WindSpeedOrSnow), three("s")),
        (Probe::Single(Field::Gust), three("g")),
        (
            Probe::Single(Field::Temperature),
            format!(r"^t(-\d{{2}}|{MISSING_3})"),
        ),
        (Probe::Single(Field::RainLastHour), three("r")),
        (Probe::Single(Field::RainLast24Hours), three("p")),
        (Probe::Single(Field::RainSinceMidnight), three("P")),
        (
            Probe::Single(Field::Humidity),
            r"^h(\d{2}|\.{2}| {2})".to_string(),
        ),
        (
            Probe::Single(Field::Pressure),
            r"^b(\d{5}|\.{5}| {5})".to_string(),
        ),
        (Probe::Single(Field::LuminosityLow), three("l")),
        (Probe::Single(Field::LuminosityHigh), three("L")),
        (Probe::Single(Field::RawRainCounter), r"^#(\d{3})".to_string()),
    ]
    .into_iter()
    .map(|(probe, pattern)| (probe, Regex::new(&pattern).unwrap()))
    .collect()
});

static SCANS: Lazy<Vec<(Field, Regex)>> = Lazy::new(|| {
    [
        (Field::Gust, r"g(\d{3})"),
        (Field::Temperature, r"t(-\d{2}|\d{3})"),
        (Field::RainLastHour, r"r(\d{3})"),
        (Field::RainLast24Hours, r"p(\d{3})"),
        (Field::RainSinceMidnight, r"P(\d{3})"),
        (Field::Humidity, r"h(\d{2})"),
        (Field::Pressure, r"b(\d{5})"),
        (Field::LuminosityLow, r"l(\d{3})"),
        (Field::LuminosityHigh, r"L(\d{3})"),
        (Field::WindSpeedOrSnow, r"s(\d{3})"),
        (Field::RawRainCounter, r"#(\d{3})"),
    ]
    .into_iter()
    .map(|(field, pattern)| (field, Regex::new(pattern).unwrap()))
    .collect()
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Probe {
    /// `ddd/sss`
    Wind,
    Single(Field),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    WindDirection,
    WindSpeedOrSnow,
    Gust,
    Temperature,
    RainLastHour,
    RainLast24Hours,
    RainSinceMidnight,
    Humidity,
    Pressure,
    LuminosityLow,
    LuminosityHigh,
    RawRainCounter,
}

/// Sensor readings; every station reports its own subset.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WeatherField {
    /// Degrees.
    pub wind_direction: Option<u16>,
    /// Sustained one-minute wind, mph.
    pub wind_speed: Option<u16>,
    /// Peak wind in the last five minutes, mph.
    pub wind_gust: Option<u16>,
    /// Degrees Fahrenheit.
    pub temperature: Option<i16>,
    /// Inches.
    pub rain_last_hour: Option<f64>,
    pub rain_last_24_hours: Option<f64>,
    pub rain_since_midnight: Option<f64>,
    /// Percent.
    pub humidity: Option<u8>,
    /// Millibars.
    pub pressure: Option<f64>,
    /// Watts per square metre.
    pub luminosity: Option<u16>,
    /// Inches in the last 24 hours.
    pub snowfall_last_24_hours: Option<f64>,
    pub raw_rain_counter: Option<u32>,
    pub fault: Option<Fault>,
}

impl WeatherField {
    pub fn has_fault(&self) -> bool {
        self.fault.is_some()
    }

    fn is_set(&self, field: Field, wind_from_c: bool) -> bool {
        match field {
            Field::WindDirection => self.wind_direction.is_some(),
            Field::WindSpeedOrSnow if wind_from_c && self.wind_speed.is_none() => false,
            Field::WindSpeedOrSnow => self.snowfall_last_24_hours.is_some(),
            Field::Gust => self.wind_gust.is_some(),
            Field::Temperature => self.temperature.is_some(),
            Field::RainLastHour => self.rain_last_hour.is_some(),
            Field::RainLast24Hours => self.rain_last_24_hours.is_some(),
            Field::RainSinceMidnight => self.rain_since_midnight.is_some(),
            Field::Humidity => self.humidity.is_some(),
            Field::Pressure => self.pressure.is_some(),
            Field::LuminosityLow | Field::LuminosityHigh => self.luminosity.is_some(),
            Field::RawRainCounter => self.raw_rain_counter.is_some(),
        }
    }

    fn set(&mut self, field: Field, value: &[u8], wind_from_c: bool) {
        let number = number(value);
        match field {
            Field::WindDirection => self.wind_direction = number.map(|v| v as u16),
            Field::WindSpeedOrSnow if wind_from_c && self.wind_speed.is_none() => {
                self.wind_speed = number.map(|v| v as u16)
            }
            Field::WindSpeedOrSnow => self.snowfall_last_24_hours = number.map(f64::from),
            Field::Gust => self.wind_gust = number.map(|v| v as u16),
            Field::Temperature => self.temperature = number.map(|v| v as i16),
            Field::RainLastHour => self.rain_last_hour = number.map(hundredths),
            Field::RainLast24Hours => self.rain_last_24_hours = number.map(hundredths),
            Field::RainSinceMidnight => self.rain_since_midnight = number.map(hundredths),
            Field::Humidity => {
                self.humidity = number.map(|v| if v == 0 { 100 } else { v as u8 })
            }
            Field::Pressure => self.pressure = number.map(|v| f64::from(v) / 10.0),
            Field::LuminosityLow => self.luminosity = number.map(|v| v.max(0) as u16),
            Field::LuminosityHigh => self.luminosity = number.map(|v| (v.max(0) + 1000) as u16),
            Field::RawRainCounter => self.raw_rain_counter = number.map(|v| v as u32),
        }
    }
}

fn number(text: &[u8]) -> Option<i32> {
    core::str::from_utf8(text).ok()?.parse().ok()
}

fn hundredths(value: i32) -> f64 {
    f64::from(value) / 100.0
}

/// Decodes weather fields starting at `start`; returns the report and the
/// index of the first byte no field matched.
pub fn decode_weather(payload: &[u8], start: usize) -> (WeatherField, usize) {
    let mut report = WeatherField::default();
    let begin = start.min(payload.len());
    let mut cursor = begin;

    if let Some(caps) = PRIMARY.captures(&payload[cursor..]) {
        let fields = [
            Field::WindDirection,
            Field::WindSpeedOrSnow,
            Field::Gust,
            Field::Temperature,
            Field::RainLastHour,
            Field::RainLast24Hours,
            Field::RainSinceMidnight,
            Field::Humidity,
            Field::Pressure,
        ];
        for (field, group) in fields.into_iter().zip(caps.iter().skip(1)) {
            if let Some(group) = group {
                report.set(field, group.as_bytes(), true);
            }
        }
        cursor += caps[0].len();
    } else {
        log::debug!("weather report is partial, probing fields individually");
    }

    let mut wind_from_c = false;
    'probe: loop {
        let rest = &payload[cursor..];
        for (probe, regex) in PROBES.iter() {
            let Some(caps) = regex.captures(rest) else {
                continue;
            };
            match *probe {
                Probe::Wind => {
                    report.set(Field::WindDirection, &caps[1], false);
                    report.wind_speed = number(&caps[2]).map(|v| v as u16);
                }
                Probe::Single(field) => {
                    wind_from_c |= field == Field::WindDirection;
                    report.set(field, &caps[1], wind_from_c);
                }
            }
            cursor += caps[0].len();
            continue 'probe;
        }
        break;
    }

    let mut scanned = false;
    for (field, regex) in SCANS.iter() {
        if report.is_set(*field, wind_from_c) {
            continue;
        }
        if let Some(caps) = regex.captures(&payload[cursor..]) {
            report.set(*field, &caps[1], wind_from_c);
            scanned = true;
        }
    }
    if scanned {
        log::debug!("weather fields recovered past an unknown token");
    }

    if cursor == begin && !scanned {
        report.fault = Some(Fault::new("no weather fields found"));
    }
    (report, cursor)
}

#[cfg(test)]
mod tests {
    use super::decode_weather;

    #[test]
    fn complete_block_in_one_match() {
        let body = b"!4903.50N/07201.75W_220/004g005t077r001p002P003h50b09900wRSW";
        let (wx, cursor) = decode_weather(body, 20);
        assert!(!wx.has_fault());
        assert_eq!(cursor, 56);
        assert_eq!(&body[cursor..], b"wRSW");
        assert_eq!(wx.wind_direction, Some(220));
        assert_eq!(wx.wind_speed, Some(4));
        assert_eq!(wx.wind_gust, Some(5));
        assert_eq!(wx.temperature, Some(77));
        assert_eq!(wx.rain_last_hour, Some(0.01));
        assert_eq!(wx.rain_last_24_hours, Some(0.02));
        assert_eq!(wx.rain_since_midnight, Some(0.03));
        assert_eq!(wx.humidity, Some(50));
        assert_eq!(wx.pressure, Some(990.0));
    }

    #[test]
    fn wind_and_temperature_only() {
        let (wx, cursor) = decode_weather(b"_220/004t077 garden", 1);
        assert!(!wx.has_fault());
        assert_eq!(wx.wind_direction, Some(220));
        assert_eq!(wx.wind_speed, Some(4));
        assert_eq!(wx.temperature, Some(77));
        assert_eq!(wx.wind_gust, None);
        assert_eq!(wx.rain_last_hour, None);
        assert_eq!(wx.humidity, None);
        assert_eq!(wx.pressure, None);
        assert_eq!(cursor, 12);
    }

    #[test]
    fn positionless_wind_fields() {
        let body = b"_10090556c220s004g005t-05r000p000P000h00b09900L123s012wRSW";
        let (wx, cursor) = decode_weather(body, 9);
        assert_eq!(wx.wind_direction, Some(220));
        assert_eq!(wx.wind_speed, Some(4));
        assert_eq!(wx.temperature, Some(-5));
        assert_eq!(wx.humidity, Some(100));
        assert_eq!(wx.luminosity, Some(1123));
        assert_eq!(wx.snowfall_last_24_hours, Some(12.0));
        assert_eq!(&body[cursor..], b"wRSW");
    }

    #[test]
    fn missing_values_consume_their_width() {
        let (wx, cursor) = decode_weather(b"_.../...g...t050l456#123x", 1);
        assert_eq!(wx.wind_direction, None);
        assert_eq!(wx.wind_speed, None);
        assert_eq!(wx.wind_gust, None);
        assert_eq!(wx.temperature, Some(50));
        assert_eq!(wx.luminosity, Some(456));
        assert_eq!(wx.raw_rain_counter, Some(123));
        assert_eq!(cursor, 24);
    }

    #[test]
    fn snow_after_slash_wind() {
        let (wx, _) = decode_weather(b"_090/010s002", 1);
        assert_eq!(wx.wind_speed, Some(10));
        assert_eq!(wx.snowfall_last_24_hours, Some(2.0));
    }

    #[test]
    fn fields_after_an_unknown_token_are_still_read() {
        let body = b"!3748.51N/12112.44W_357/004g005t076V136P000h60b10133OTW1";
        let (wx, cursor) = decode_weather(body, 20);
        assert!(!wx.has_fault());
        assert_eq!(wx.wind_direction, Some(357));
        assert_eq!(wx.wind_speed, Some(4));
        assert_eq!(wx.wind_gust, Some(5));
        assert_eq!(wx.temperature, Some(76));
        assert_eq!(wx.rain_since_midnight, Some(0.0));
        assert_eq!(wx.humidity, Some(60));
        assert_eq!(wx.pressure, Some(1013.3));
        assert_eq!(wx.rain_last_hour, None);
        assert_eq!(&body[cursor..], b"V136P000h60b10133OTW1");
    }

    #[test]
    fn nothing_recognised_faults() {
        let (wx, cursor) = decode_weather(b"_hello", 1);
        assert!(wx.has_fault());
        assert_eq!(cursor, 1);
        let (wx, cursor) = decode_weather(b"_", 5);
        assert!(wx.has_fault());
        assert_eq!(cursor, 1);
    }
}
