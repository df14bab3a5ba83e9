use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use packet_registry::{mod_packet_name, Packet, PacketTypeRegistry, StaticPacketType};

#[allow(clippy::unwrap_used)]
fn populated(count: usize) -> PacketTypeRegistry {
    let mut registry = PacketTypeRegistry::new();
    registry
        .add_static_type(StaticPacketType::Sync, "sync", |_: &Packet| {})
        .unwrap();
    for i in 0..count {
        registry
            .add_dynamic_type(&mod_packet_name("bench", &format!("type{i}")), |_: &Packet| {})
            .unwrap();
    }
    registry
}

#[allow(clippy::unwrap_used)]
fn bench_registration(c: &mut Criterion) {
    let mut group = c.benchmark_group("registration");
    for &count in &[16usize, 256] {
        group.bench_function(format!("register_{count}_types"), |b| {
            b.iter(|| populated(count))
        });
    }
    group.bench_function("register_colliding_hint", |b| {
        b.iter(|| {
            let mut registry = PacketTypeRegistry::new();
            for i in 0..40 {
                registry
                    .add_dynamic_type_with_hint(&format!("c{i}"), 1000, |_: &Packet| {})
                    .unwrap();
            }
            registry
        })
    });
    group.finish();
}

#[allow(clippy::unwrap_used)]
fn bench_dispatch(c: &mut Criterion) {
    let mut registry = populated(256);
    let mut packet = Packet::new();
    registry
        .build_named_header(&mut packet, "bench$type128")
        .unwrap();
    c.bench_function("handle_packet", |b| {
        b.iter(|| registry.handle_packet(&packet).unwrap())
    });
}

#[allow(clippy::unwrap_used)]
fn bench_sync(c: &mut Criterion) {
    let server = populated(256);
    let mut sync = Packet::with_capacity(64 * 1024).unwrap();
    server.build_sync_packet(&mut sync).unwrap();

    let mut group = c.benchmark_group("sync");
    group.bench_function("build_sync_packet_256", |b| {
        let mut packet = Packet::with_capacity(64 * 1024).unwrap();
        b.iter(|| server.build_sync_packet(&mut packet).unwrap())
    });
    group.bench_function("on_packet_sync_256", |b| {
        b.iter_batched(
            || populated(256),
            |mut client| client.on_packet_sync(&sync).unwrap(),
            BatchSize::LargeInput,
        )
    });
    group.finish();
}

criterion_group!(benches, bench_registration, bench_dispatch, bench_sync);
criterion_main!(benches);
