//! Property-based tests using proptest
//!
//! These tests validate packet and registry invariants across a wide range of randomly
//! generated inputs.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use packet_registry::{Packet, PacketHeader, PacketTypeRegistry, SyncResult, HEADER_SIZE};
use proptest::prelude::*;
use std::collections::HashSet;

// Property: Header and payload survive a trip through the raw packet bytes
proptest! {
    #[test]
    fn prop_packet_bytes_roundtrip(
        packet_type in any::<u32>(),
        payload in prop::collection::vec(any::<u8>(), 0..2000),
    ) {
        let mut packet = Packet::with_capacity(HEADER_SIZE + payload.len()).unwrap();
        packet.set_header(PacketHeader::new(packet_type));
        packet.set_payload(&payload).unwrap();

        let decoded = Packet::from_bytes(packet.as_bytes()).expect("Decoding should not fail");
        prop_assert_eq!(decoded.header().packet_type, packet_type);
        prop_assert_eq!(decoded.payload(), payload.as_slice());
    }
}

// Property: The used size never exceeds capacity, whatever is attempted
proptest! {
    #[test]
    fn prop_size_never_exceeds_capacity(
        capacity in HEADER_SIZE..256usize,
        writes in prop::collection::vec(prop::collection::vec(any::<u8>(), 0..64), 0..10),
        shrink_to in HEADER_SIZE..256usize,
    ) {
        let mut packet = Packet::with_capacity(capacity).unwrap();
        for data in &writes {
            let before = packet.payload().to_vec();
            if packet.set_payload(data).is_err() {
                prop_assert_eq!(packet.payload(), before.as_slice());
            }
            prop_assert!(packet.packet_size() <= packet.capacity());

            let mut writer = packet.writer();
            let _ = writer.write_bytes(data);
            writer.finalize();
            prop_assert!(packet.packet_size() <= packet.capacity());
        }
        packet.set_capacity(shrink_to).unwrap();
        prop_assert!(packet.packet_size() <= packet.capacity());
        prop_assert!(packet.packet_size() >= HEADER_SIZE);
    }
}

// Property: Registered names are unique and every registered name resolves
proptest! {
    #[test]
    fn prop_registry_names_unique(names in prop::collection::vec("[a-z]{1,6}", 1..40)) {
        let mut registry = PacketTypeRegistry::new();
        let mut accepted = HashSet::new();
        for name in &names {
            let result = registry.add_dynamic_type(name, |_: &Packet| {});
            prop_assert_eq!(result.is_ok(), accepted.insert(name.clone()));
        }
        prop_assert_eq!(registry.len(), accepted.len());

        let mut ids = HashSet::new();
        for name in &accepted {
            let id = registry.find_dynamic_type(name).expect("Registered name should resolve");
            prop_assert!(ids.insert(id));
            prop_assert_eq!(registry.type_name(id), Some(name.as_str()));
        }
    }
}

// Property: Any registration order converges to the canonical table after sync
proptest! {
    #[test]
    fn prop_sync_converges(
        hints in prop::collection::vec(0u32..8, 1..20),
        seed in any::<u64>(),
    ) {
        let names: Vec<String> = (0..hints.len()).map(|i| format!("mod$type{i}")).collect();

        let mut canonical = PacketTypeRegistry::new();
        for (name, hint) in names.iter().zip(&hints) {
            canonical.add_dynamic_type_with_hint(name, *hint, |_: &Packet| {}).unwrap();
        }

        // Deterministic shuffle of the registration order
        let mut order: Vec<usize> = (0..names.len()).collect();
        let mut state = seed;
        for i in (1..order.len()).rev() {
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            order.swap(i, (state >> 33) as usize % (i + 1));
        }

        let mut local = PacketTypeRegistry::new();
        for &i in &order {
            local.add_dynamic_type_with_hint(&names[i], hints[i], |_: &Packet| {}).unwrap();
        }

        prop_assert_eq!(local.sync(&canonical.serialize()), SyncResult::Success);
        prop_assert_eq!(local.serialize(), canonical.serialize());
        for name in &names {
            prop_assert_eq!(local.find_dynamic_type(name), canonical.find_dynamic_type(name));
        }
    }
}
