//! Registries are owned values, shared across tasks the usual way.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use packet_registry::{mod_packet_name, Packet, PacketTypeRegistry};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tokio::task::JoinSet;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_dispatch_through_shared_registry() {
    let total = Arc::new(AtomicU64::new(0));
    let mut registry = PacketTypeRegistry::new();
    let mut names = Vec::new();
    for i in 0..8 {
        let name = mod_packet_name("bench", &format!("type{i}"));
        let counter = total.clone();
        registry
            .add_dynamic_type(&name, move |packet: &Packet| {
                counter.fetch_add(packet.payload_size() as u64, Ordering::Relaxed);
            })
            .unwrap();
        names.push(name);
    }
    let registry = Arc::new(Mutex::new(registry));

    let iterations = 1_000usize;
    let mut tasks = JoinSet::new();
    for name in names {
        let registry = registry.clone();
        tasks.spawn(async move {
            let mut packet = Packet::new();
            registry
                .lock()
                .unwrap()
                .build_named_header(&mut packet, &name)
                .unwrap();
            packet.set_payload(&[0; 3]).unwrap();
            for _ in 0..iterations {
                registry.lock().unwrap().handle_packet(&packet).unwrap();
            }
        });
    }

    while let Some(res) = tasks.join_next().await {
        res.unwrap();
    }

    assert_eq!(total.load(Ordering::Relaxed), 8 * 1_000 * 3);
    let snapshot = registry.lock().unwrap().metrics().snapshot();
    assert_eq!(snapshot.packets_dispatched, 8 * 1_000);
}
