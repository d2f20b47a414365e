use clap::Parser;
use rustaprs_core::Packet;
use rustaprs_tools::{open_input, render, OutputFormat, Stats};
use std::io::BufRead;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "aprs-parse")]
struct Args {
    /// File of TNC2 lines; stdin when omitted or `-`.
    input: Option<PathBuf>,
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
    /// Print only packets that carry a fault.
    #[arg(long)]
    faults_only: bool,
    /// Print per-type totals to stderr at the end.
    #[arg(long)]
    stats: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();
    let input = open_input(args.input.as_deref())?;

    let mut stats = Stats::default();
    for line in input.lines() {
        let line = line?;
        if line.trim().is_empty() || line.starts_with('#') {
            continue;
        }
        let packet = match Packet::parse(&line) {
            Ok(packet) => packet,
            Err(e) => {
                log::warn!("skipping {line:?}: {e}");
                stats.reject();
                continue;
            }
        };
        stats.record(&packet);
        if args.faults_only && !packet.has_fault() {
            continue;
        }
        println!("{}", render(&packet, args.format)?);
    }

    if args.stats {
        eprintln!(
            "lines={} rejected={} faulted={}",
            stats.lines, stats.rejected, stats.faulted
        );
        for (data_type, count) in &stats.by_type {
            eprintln!("  {data_type:?}: {count}");
        }
        for (dti, count) in &stats.by_dti {
            eprintln!("  {dti:?}: {count}");
        }
    }
    Ok(())
}
