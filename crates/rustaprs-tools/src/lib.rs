use clap::ValueEnum;
use rustaprs_core::{DataType, Packet};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

/// How decoded packets are printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// One summary line per packet.
    Text,
    /// One JSON object per line.
    Json,
}

/// Opens `path`, or stdin when it is `None` or `-`.
pub fn open_input(path: Option<&Path>) -> io::Result<Box<dyn BufRead>> {
    match path {
        Some(path) if path != Path::new("-") => Ok(Box::new(BufReader::new(File::open(path)?))),
        _ => Ok(Box::new(BufReader::new(io::stdin()))),
    }
}

/// Renders a packet in the requested format.
pub fn render(packet: &Packet, format: OutputFormat) -> Result<String, serde_json::Error> {
    match format {
        OutputFormat::Json => serde_json::to_string(packet),
        OutputFormat::Text => Ok(summary(packet)),
    }
}

fn summary(packet: &Packet) -> String {
    let payload = packet.payload();
    let mut out = format!(
        "{}>{} {:?}",
        packet.source(),
        packet.destination(),
        packet.data_type()
    );
    if let Some(field) = payload.position() {
        out.push_str(&format!(" {}", field.position));
    }
    if let Some(extension) = payload.extension() {
        out.push_str(&format!(" [{extension}]"));
    }
    if let Some(message) = payload.message() {
        out.push_str(&format!(" {message}"));
    }
    if !payload.comment().is_empty() {
        out.push_str(&format!(" {:?}", payload.comment()));
    }
    if packet.has_fault() {
        out.push_str(&format!(" FAULT: {}", packet.fault_reason()));
    }
    out
}

/// Running totals over a batch of lines.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Stats {
    pub lines: usize,
    /// Lines whose TNC2 header could not be framed.
    pub rejected: usize,
    pub faulted: usize,
    pub by_type: BTreeMap<DataType, usize>,
    /// Keyed by the data type identifier; `'\0'` for an empty payload.
    pub by_dti: BTreeMap<char, usize>,
}

impl Stats {
    pub fn record(&mut self, packet: &Packet) {
        self.lines += 1;
        if packet.has_fault() {
            self.faulted += 1;
        }
        *self.by_type.entry(packet.data_type()).or_default() += 1;
        *self.by_dti.entry(char::from(packet.dti())).or_default() += 1;
    }

    pub fn reject(&mut self) {
        self.lines += 1;
        self.rejected += 1;
    }
}
