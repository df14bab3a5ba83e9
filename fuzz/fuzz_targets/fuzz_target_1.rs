#![no_main]

use libfuzzer_sys::fuzz_target;
use packet_registry::{Packet, PacketTypeRegistry};

fuzz_target!(|data: &[u8]| {
    // Raw transport bytes and sync payloads must never panic
    if let Ok(packet) = Packet::from_bytes(data) {
        let _ = PacketTypeRegistry::decode_sync_payload(&packet);
        let _ = packet.payload_str();
    }
});
