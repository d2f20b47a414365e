//! APRS packet decoding and AX.25 framing in pure Rust.
//!
//! `rustaprs-core` turns TNC2 text lines and AX.25 UI frames into [`Packet`]s
//! whose information field is decoded into typed sub-values: timestamps,
//! positions (uncompressed, compressed, Mic-E and NMEA), data extensions,
//! weather reports, messages, objects and items. Decoding never aborts on a
//! malformed payload; each sub-value carries its own [`Fault`] instead.
//!
//! ```
//! let packet = rustaprs_core::parse("W1AW>APRS:!4903.50N/07201.75W-Test").unwrap();
//! let position = packet.payload().position().unwrap();
//! assert_eq!(position.position.latitude(), 49.05833);
//! assert_eq!(packet.payload().comment(), "Test");
//! ```
//!
//! # Feature flags
//!
//! - **`std`** (default): enables `std::error::Error` implementations.
//! - **`serde`**: derives `Serialize`/`Deserialize` on packets and decoded values.

/// AX.25 address fields, callsigns and digipeater paths.
pub mod address;
/// Byte reader/writer and base-91 primitives.
pub mod encoding;
/// Error and fault types.
pub mod error;
/// PHG, RNG, DFS and course/speed data extensions.
pub mod extension;
/// AX.25 UI frame encoding and decoding.
pub mod frame;
/// Item reports.
pub mod item;
/// Messages, acknowledgements and rejections.
pub mod message;
/// Object reports.
pub mod object;
/// TNC2 and AX.25 packet framing.
pub mod packet;
/// Information field dispatch on the data type identifier.
pub mod payload;
/// Position formats and their decoders.
pub mod position;
/// Timestamp decoding.
pub mod time;
/// Unit conversions and APRS-IS passcodes.
pub mod units;
/// Weather reports.
pub mod weather;

pub use address::{Callsign, Digipeater};
pub use error::{DecodeError, EncodeError, Fault};
pub use extension::DataExtension;
pub use packet::Packet;
pub use payload::{AprsData, DataType, Payload};
pub use position::Position;

/// Parses a TNC2 line, resolving partial timestamps against the current time.
pub fn parse(line: &str) -> Result<Packet, DecodeError> {
    Packet::parse(line)
}

/// Decodes an AX.25 UI frame (no flags, no FCS).
pub fn parse_ax25(frame: &[u8]) -> Result<Packet, DecodeError> {
    Packet::from_ax25(frame)
}
