use crate::encoding::reader::parse_decimal;
use core::fmt;

/// Bytes of an uncompressed data extension.
pub const EXTENSION_LEN: usize = 7;

const POWER_WATTS: [u16; 10] = [0, 1, 4, 9, 16, 25, 36, 49, 64, 81];
const HEIGHT_FEET: [u16; 10] = [10, 20, 40, 80, 160, 320, 640, 1280, 2560, 5120];
const DIRECTIVITY_DEGREES: [u16; 10] = [0, 45, 90, 135, 180, 225, 270, 315, 360, 0];

/// Optional fixed-width field trailing a position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DataExtension {
    /// Course in degrees, speed in knots.
    CourseSpeed { course: u16, speed: u16 },
    Phg(Phg),
    /// Radio range in miles.
    Range { miles: u16 },
    DfStrength(DfStrength),
}

/// Power-height-gain-directivity, each an index into a fixed table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Phg {
    pub power: u8,
    pub height: u8,
    pub gain: u8,
    pub directivity: u8,
}

impl Phg {
    pub fn power_watts(&self) -> u16 {
        table(&POWER_WATTS, self.power)
    }

    /// Antenna height above average terrain.
    pub fn height_feet(&self) -> u16 {
        table(&HEIGHT_FEET, self.height)
    }

    pub fn gain_dbi(&self) -> u8 {
        self.gain
    }

    /// Zero means omnidirectional.
    pub fn directivity_degrees(&self) -> u16 {
        table(&DIRECTIVITY_DEGREES, self.directivity)
    }
}

impl fmt::Display for Phg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} watts at {} ft HAAT with {} dBi gain directed at {} degrees",
            self.power_watts(),
            self.height_feet(),
            self.gain_dbi(),
            self.directivity_degrees()
        )
    }
}

/// Omni-DF report: signal strength in S-points plus the PHG antenna tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DfStrength {
    pub strength: u8,
    pub height: u8,
    pub gain: u8,
    pub directivity: u8,
}

impl DfStrength {
    pub fn height_feet(&self) -> u16 {
        table(&HEIGHT_FEET, self.height)
    }

    pub fn directivity_degrees(&self) -> u16 {
        table(&DIRECTIVITY_DEGREES, self.directivity)
    }
}

impl fmt::Display for DataExtension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CourseSpeed { course, speed } => write!(f, "Moving {speed} kts @ {course} deg"),
            Self::Phg(phg) => phg.fmt(f),
            Self::Range { miles } => write!(f, "Range {miles} miles"),
            Self::DfStrength(df) => write!(
                f,
                "DF S{} at {} ft HAAT with {} dBi gain directed at {} degrees",
                df.strength,
                df.height_feet(),
                df.gain,
                df.directivity_degrees()
            ),
        }
    }
}

fn table(values: &[u16; 10], index: u8) -> u16 {
    values.get(usize::from(index)).copied().unwrap_or(0)
}

fn digit(b: u8) -> u8 {
    if b.is_ascii_digit() {
        b - b'0'
    } else {
        0
    }
}

/// Three-character numeric slot; anything but digits reads as 0.
fn slot(bytes: &[u8]) -> u16 {
    parse_decimal(bytes).map_or(0, |v| v as u16)
}

/// Decodes the 7-byte extension at `at`, directly after an uncompressed
/// position whose symbol code is `symbol`.
pub fn decode_uncompressed(payload: &[u8], at: usize, symbol: u8) -> Option<DataExtension> {
    if symbol == b'_' {
        return None;
    }
    let field = payload.get(at..at + EXTENSION_LEN)?;
    let digits = [field[3], field[4], field[5], field[6]].map(digit);
    match &field[..3] {
        b"PHG" => Some(DataExtension::Phg(Phg {
            power: digits[0],
            height: digits[1],
            gain: digits[2],
            directivity: digits[3],
        })),
        b"RNG" => {
            let miles = parse_decimal(&field[3..]).map_or(0, |v| v as u16);
            Some(DataExtension::Range { miles })
        }
        b"DFS" => Some(DataExtension::DfStrength(DfStrength {
            strength: digits[0],
            height: digits[1],
            gain: digits[2],
            directivity: digits[3],
        })),
        _ if field[3] == b'/' => {
            let course = slot(&field[..3]);
            let speed = slot(&field[4..]);
            Some(DataExtension::CourseSpeed { course, speed })
        }
        _ => None,
    }
}

/// Compressed `T` byte marking a GGA fix, whose `cs` bytes carry altitude.
pub fn is_gga_altitude(t: u8) -> bool {
    t >= 33 && ((t - 33) & 0x18) >> 3 == 2
}

/// Decodes the compressed `csT` bytes that follow the symbol code.
pub fn decode_compressed(c: u8, s: u8, t: u8, symbol: u8) -> Option<DataExtension> {
    if symbol == b'_' || c == b' ' || is_gga_altitude(t) || s < 33 {
        return None;
    }
    let s = i32::from(s - 33);
    if c == b'{' {
        let miles = (2.0 * 1.08f64.powi(s)).round() as u16;
        return Some(DataExtension::Range { miles });
    }
    let c = c.checked_sub(33).filter(|c| *c < 90)?;
    Some(DataExtension::CourseSpeed {
        course: u16::from(c) * 4,
        speed: (1.08f64.powi(s) - 1.0).round() as u16,
    })
}

/// Decodes the Mic-E speed and course bytes (`sp`, `dc`, `se`).
pub fn decode_mic_e(sp: u8, dc: u8, se: u8) -> Option<DataExtension> {
    let sp = u16::from(sp.checked_sub(28)?);
    let dc = u16::from(dc.checked_sub(28)?);
    let se = u16::from(se.checked_sub(28)?);

    let mut speed = sp * 10 + dc / 10;
    let mut course = (dc % 10) * 100 + se;
    if course >= 400 {
        course -= 400;
    }
    if speed >= 800 {
        speed -= 800;
    }
    Some(DataExtension::CourseSpeed { course, speed })
}
