//! Unit conversions and small helpers used when presenting decoded values.

const MPH_PER_KNOT: f64 = 1.150_779_45;
const KMH_PER_KNOT: f64 = 1.852;
const MILES_PER_METER: f64 = 0.000_621_371_192;
const PASSCODE_SEED: u16 = 0x73e2;

const CARDINALS: [&str; 16] = [
    "N", "NNE", "NE", "ENE", "E", "ESE", "SE", "SSE", "S", "SSW", "SW", "WSW", "W", "WNW", "NW",
    "NNW",
];

pub fn knots_to_mph(knots: f64) -> f64 {
    knots * MPH_PER_KNOT
}

pub fn knots_to_kmh(knots: f64) -> f64 {
    knots * KMH_PER_KNOT
}

pub fn meters_to_miles(meters: f64) -> f64 {
    meters * MILES_PER_METER
}

pub fn meters_to_kilometers(meters: f64) -> f64 {
    meters / 1000.0
}

/// Nearest of the 16 compass points.
pub fn degrees_to_cardinal(degrees: f64) -> &'static str {
    let sector = (degrees.rem_euclid(360.0) / 22.5 + 0.5).floor() as usize;
    CARDINALS[sector % CARDINALS.len()]
}

/// APRS-IS login passcode. The SSID is ignored and case does not matter.
pub fn aprs_is_passcode(callsign: &str) -> u16 {
    let call = callsign.split('-').next().unwrap_or_default().to_ascii_uppercase();
    let mut hash = PASSCODE_SEED;
    for pair in call.as_bytes().chunks(2) {
        hash ^= u16::from(pair[0]) << 8;
        if let Some(&low) = pair.get(1) {
            hash ^= u16::from(low);
        }
    }
    hash & 0x7fff
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn speed_and_distance() {
        assert!((knots_to_mph(10.0) - 11.5077945).abs() < 1e-9);
        assert!((knots_to_kmh(10.0) - 18.52).abs() < 1e-9);
        assert!((meters_to_miles(1609.344) - 1.0).abs() < 1e-6);
        assert_eq!(meters_to_kilometers(2500.0), 2.5);
    }

    #[test]
    fn cardinal_points() {
        assert_eq!(degrees_to_cardinal(0.0), "N");
        assert_eq!(degrees_to_cardinal(11.0), "N");
        assert_eq!(degrees_to_cardinal(12.0), "NNE");
        assert_eq!(degrees_to_cardinal(90.0), "E");
        assert_eq!(degrees_to_cardinal(225.0), "SW");
        assert_eq!(degrees_to_cardinal(350.0), "N");
        assert_eq!(degrees_to_cardinal(-90.0), "W");
        assert_eq!(degrees_to_cardinal(720.0), "N");
    }

    #[test]
    fn passcodes() {
        assert_eq!(aprs_is_passcode("N0CALL"), 13023);
        assert_eq!(aprs_is_passcode("W1AW-9"), 25988);
        assert_eq!(aprs_is_passcode("w1aw"), 25988);
        assert_eq!(aprs_is_passcode("K1ABC"), 14993);
    }
}
