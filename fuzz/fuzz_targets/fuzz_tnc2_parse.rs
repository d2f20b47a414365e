#![no_main]

use libfuzzer_sys::fuzz_target;
use rustaprs_core::Packet;

fuzz_target!(|data: &[u8]| {
    let Ok(line) = core::str::from_utf8(data) else {
        return;
    };
    if let Ok(packet) = Packet::parse(line) {
        let payload = packet.payload();
        assert!(payload.cursor() <= payload.raw().len());
        let _ = packet.fault_reason();
        let _ = packet.to_ax25_frame();
    }
});
