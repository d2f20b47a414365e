#![no_main]

use libfuzzer_sys::fuzz_target;
use rustaprs_core::Packet;

fuzz_target!(|data: &[u8]| {
    if let Ok(packet) = Packet::from_ax25(data) {
        let payload = packet.payload();
        assert!(payload.cursor() <= payload.raw().len());
        let _ = packet.to_string();
    }
});
