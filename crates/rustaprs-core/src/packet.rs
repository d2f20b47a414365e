//! A framed APRS packet: addresses plus the decoded information field.

use crate::address::parse_path;
use crate::encoding::reader::Reader;
use crate::frame::Ax25Frame;
use crate::payload::{decode_payload, DataType, Payload};
use crate::{Callsign, DecodeError, Digipeater, EncodeError};
use chrono::{DateTime, Utc};
use core::fmt;
use core::str::FromStr;

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Packet {
    source: Callsign,
    destination: Callsign,
    digipeaters: Vec<Digipeater>,
    data_type: DataType,
    payload: Payload,
    original: Option<Vec<u8>>,
    received_at: DateTime<Utc>,
}

impl Packet {
    /// Parses a TNC2 line `SRC>DST[,DIGI...]:payload`.
    pub fn parse(line: &str) -> Result<Self, DecodeError> {
        Self::parse_at(line, Utc::now())
    }

    /// Like [`Packet::parse`] with an explicit receive time. Partial
    /// timestamps in the payload are resolved against `now`.
    pub fn parse_at(line: &str, now: DateTime<Utc>) -> Result<Self, DecodeError> {
        let line = line.trim_end_matches(['\r', '\n']);
        let gt = line.find('>').ok_or(DecodeError::MissingDelimiter('>'))?;
        let colon = line[gt..]
            .find(':')
            .map(|i| gt + i)
            .ok_or(DecodeError::MissingDelimiter(':'))?;
        let source = &line[..gt];
        if source.is_empty() {
            return Err(DecodeError::EmptySource);
        }

        let header = &line[gt + 1..colon];
        let (destination, path) = header.split_once(',').unwrap_or((header, ""));
        let mut packet = Self::from_parts_at(
            Callsign::parse(source),
            Callsign::parse(destination),
            parse_path(path),
            line[colon + 1..].as_bytes(),
            now,
        );
        packet.original = Some(line.as_bytes().to_vec());
        Ok(packet)
    }

    /// Decodes an AX.25 UI frame without flags or FCS.
    pub fn from_ax25(frame: &[u8]) -> Result<Self, DecodeError> {
        Self::from_ax25_at(frame, Utc::now())
    }

    pub fn from_ax25_at(frame: &[u8], now: DateTime<Utc>) -> Result<Self, DecodeError> {
        let decoded = Ax25Frame::decode(&mut Reader::new(frame))?;
        let mut packet = Self::from_parts_at(
            decoded.source,
            decoded.destination,
            decoded.digipeaters,
            decoded.information,
            now,
        );
        packet.original = Some(frame.to_vec());
        Ok(packet)
    }

    /// Builds a packet from already separated parts.
    pub fn from_parts(
        source: Callsign,
        destination: Callsign,
        digipeaters: Vec<Digipeater>,
        information: &[u8],
    ) -> Self {
        Self::from_parts_at(source, destination, digipeaters, information, Utc::now())
    }

    pub fn from_parts_at(
        source: Callsign,
        destination: Callsign,
        digipeaters: Vec<Digipeater>,
        information: &[u8],
        now: DateTime<Utc>,
    ) -> Self {
        let (data_type, payload) = decode_payload(information, &destination, now);
        log::debug!("{source}>{destination}: {data_type:?}, {} bytes", information.len());
        Self {
            source,
            destination,
            digipeaters,
            data_type,
            payload,
            original: None,
            received_at: now,
        }
    }

    pub fn source(&self) -> &Callsign {
        &self.source
    }

    pub fn destination(&self) -> &Callsign {
        &self.destination
    }

    pub fn digipeaters(&self) -> &[Digipeater] {
        &self.digipeaters
    }

    pub fn data_type(&self) -> DataType {
        self.data_type
    }

    pub fn dti(&self) -> u8 {
        self.payload.dti()
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    /// The line or frame this packet was decoded from.
    pub fn original(&self) -> Option<&[u8]> {
        self.original.as_deref()
    }

    pub fn received_at(&self) -> DateTime<Utc> {
        self.received_at
    }

    pub fn has_fault(&self) -> bool {
        self.payload.has_fault()
    }

    pub fn fault_reason(&self) -> String {
        self.payload.fault_reason()
    }

    /// The last station that actually repeated the packet. Aliases such as
    /// `WIDE2` are skipped.
    pub fn last_used_digipeater(&self) -> Option<&Digipeater> {
        self.digipeaters
            .iter()
            .rev()
            .find(|digi| digi.used && !digi.is_alias())
    }

    /// The APRS-IS gateway named after a q-construct in the path.
    pub fn igate(&self) -> Option<&Callsign> {
        let marker = self
            .digipeaters
            .iter()
            .position(Digipeater::is_igate_marker)?;
        self.digipeaters.get(marker + 1).map(|digi| &digi.callsign)
    }

    /// The path as written in a TNC2 header, including the leading comma.
    pub fn digi_string(&self) -> String {
        self.digipeaters
            .iter()
            .map(|digi| format!(",{digi}"))
            .collect()
    }

    /// Serializes the packet as an AX.25 UI frame.
    pub fn to_ax25_frame(&self) -> Result<Vec<u8>, EncodeError> {
        Ax25Frame {
            destination: self.destination.clone(),
            source: self.source.clone(),
            digipeaters: self.digipeaters.clone(),
            information: self.payload.raw(),
        }
        .to_bytes()
    }
}

impl fmt::Display for Packet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}>{}{}:{}",
            self.source,
            self.destination,
            self.digi_string(),
            String::from_utf8_lossy(self.payload.raw())
        )
    }
}

impl FromStr for Packet {
    type Err = DecodeError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        Self::parse(line)
    }
}

#[cfg(test)]
mod tests {
    use super::Packet;
    use crate::payload::DataType;
    use crate::{Callsign, DecodeError, Digipeater};
    use chrono::{DateTime, TimeZone, Utc};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap()
    }

    fn parse(line: &str) -> Packet {
        Packet::parse_at(line, now()).unwrap()
    }

    #[test]
    fn splits_tnc2_header() {
        let packet = parse("W1AW-9>APRS,WIDE1-1*,WIDE2-1:!4903.50N/07201.75W-Test");
        assert_eq!(packet.source(), &Callsign::parse("W1AW-9"));
        assert_eq!(packet.destination().base_call(), "APRS");
        assert_eq!(packet.digipeaters().len(), 2);
        assert!(packet.digipeaters()[0].used);
        assert!(!packet.digipeaters()[1].used);
        assert_eq!(packet.data_type(), DataType::Position);
        assert_eq!(packet.dti(), b'!');
        assert_eq!(packet.payload().comment(), "Test");
        assert_eq!(packet.received_at(), now());
    }

    #[test]
    fn header_errors() {
        assert_eq!(
            Packet::parse_at("W1AW APRS:hello", now()).unwrap_err(),
            DecodeError::MissingDelimiter('>')
        );
        assert_eq!(
            Packet::parse_at("W1AW>APRS hello", now()).unwrap_err(),
            DecodeError::MissingDelimiter(':')
        );
        assert_eq!(
            Packet::parse_at(">APRS:hello", now()).unwrap_err(),
            DecodeError::EmptySource
        );
    }

    #[test]
    fn colon_in_payload_stays_in_payload() {
        let packet = parse("W1AW>APRS::N0CALL   :hi there{7");
        assert_eq!(packet.digipeaters().len(), 0);
        assert_eq!(packet.data_type(), DataType::Message);
        assert_eq!(packet.payload().raw(), b":N0CALL   :hi there{7");
    }

    #[test]
    fn empty_payload_is_a_fault_not_an_error() {
        let packet = parse("W1AW>APRS:");
        assert_eq!(packet.data_type(), DataType::Unspecified);
        assert!(packet.has_fault());
        assert_eq!(packet.dti(), 0);
    }

    #[test]
    fn display_reproduces_the_line() {
        let line = "CALL-7>APY05D,WIDE1-1,WIDE2-1,qAR,TARGET::TARGET   :test ok{1";
        let packet = parse(line);
        assert_eq!(packet.to_string(), line);
        assert_eq!(packet.original(), Some(line.as_bytes()));
        assert_eq!(parse(&packet.to_string()), packet);
    }

    #[test]
    fn trailing_line_ending_is_dropped() {
        let packet = parse("W1AW>APRS:>status\r\n");
        assert_eq!(packet.payload().comment(), "status");
    }

    #[test]
    fn path_helpers() {
        let packet = parse("N0CALL>APRS,W1ABC*,WIDE2*,qAR,K1IG:>x");
        assert_eq!(packet.digi_string(), ",W1ABC*,WIDE2*,qAR,K1IG");
        assert_eq!(
            packet.last_used_digipeater(),
            Some(&Digipeater::parse("W1ABC*"))
        );
        assert_eq!(packet.igate(), Some(&Callsign::parse("K1IG")));

        let direct = parse("N0CALL>APRS:>x");
        assert_eq!(direct.last_used_digipeater(), None);
        assert_eq!(direct.igate(), None);
        assert_eq!(direct.digi_string(), "");
    }

    #[test]
    fn ax25_round_trip() {
        let packet = parse("N0CALL-9>APRS,WIDE1-1*,WIDE2-1:>hi");
        let frame = packet.to_ax25_frame().unwrap();
        let decoded = Packet::from_ax25_at(&frame, now()).unwrap();
        assert_eq!(decoded.to_string(), packet.to_string());
        assert_eq!(decoded.original(), Some(frame.as_slice()));
        assert_eq!(decoded.payload(), packet.payload());
    }

    #[test]
    fn from_parts_matches_parse() {
        let packet = Packet::from_parts_at(
            Callsign::parse("W1AW"),
            Callsign::parse("APRS"),
            vec![Digipeater::parse("WIDE1-1")],
            b">hello",
            now(),
        );
        let parsed = parse("W1AW>APRS,WIDE1-1:>hello");
        assert_eq!(packet.payload(), parsed.payload());
        assert_eq!(packet.original(), None);
        assert_eq!(packet.to_string(), parsed.to_string());
    }

    #[test]
    fn from_str_uses_parse() {
        let packet: Packet = "W1AW>APRS:>hi".parse().unwrap();
        assert_eq!(packet.data_type(), DataType::Status);
    }
}

#[cfg(all(test, feature = "serde"))]
mod serde_tests {
    use super::Packet;
    use chrono::{TimeZone, Utc};

    #[test]
    fn json_round_trip() {
        let now = Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap();
        let line = "W1AW>APRS,TCPIP*,qAC,T2TEST::N0CALL   :hello{42";
        let packet = Packet::parse_at(line, now).unwrap();
        let json = serde_json::to_string(&packet).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["data_type"], "Message");
        assert_eq!(value["source"]["call"], "W1AW");
        let back: Packet = serde_json::from_str(&json).unwrap();
        assert_eq!(back, packet);
    }
}
