use clap::{Parser, Subcommand};
use rustaprs_core::Packet;
use rustaprs_tools::{render, OutputFormat};

#[derive(Parser, Debug)]
#[command(name = "aprs-frame")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Encode a TNC2 line as a hex AX.25 UI frame.
    Encode { line: String },
    /// Decode a hex AX.25 UI frame.
    Decode {
        /// Hex digits; whitespace is ignored.
        hex: String,
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();
    match args.command {
        Command::Encode { line } => {
            let packet = Packet::parse(&line)?;
            if packet.has_fault() {
                log::warn!("encoding packet with fault: {}", packet.fault_reason());
            }
            println!("{}", hex::encode(packet.to_ax25_frame()?));
        }
        Command::Decode { hex, format } => {
            let digits: String = hex.split_whitespace().collect();
            let frame = hex::decode(digits)?;
            let packet = Packet::from_ax25(&frame)?;
            println!("{packet}");
            if format == OutputFormat::Json || packet.has_fault() {
                println!("{}", render(&packet, format)?);
            }
        }
    }
    Ok(())
}
