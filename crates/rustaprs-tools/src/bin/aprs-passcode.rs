use clap::Parser;
use rustaprs_core::units::aprs_is_passcode;

#[derive(Parser, Debug)]
#[command(name = "aprs-passcode")]
struct Args {
    /// Callsign, with or without SSID.
    callsign: String,
}

fn main() {
    env_logger::init();
    let args = Args::parse();
    println!("{}", aprs_is_passcode(&args.callsign));
}
