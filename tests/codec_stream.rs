//! Integration tests for stream framing
//!
//! These tests carry packets over an in-memory duplex stream with the packet codec,
//! the way a TCP transport would, including the connect-time table sync.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use bytes::BytesMut;
use futures::{SinkExt, StreamExt};
use packet_registry::{
    Packet, PacketCodec, PacketHeader, PacketTypeRegistry, PeerSession, ProtocolError, Side,
    StaticPacketType,
};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use tokio_util::codec::{Decoder, Encoder, Framed};

fn packet(packet_type: u32, payload: &[u8]) -> Packet {
    let mut packet = Packet::new();
    packet.set_header(PacketHeader::new(packet_type));
    packet.set_payload(payload).unwrap();
    packet
}

#[test]
fn test_codec_multiple_packets_in_buffer() {
    let mut codec = PacketCodec::default();
    let mut buffer = BytesMut::new();
    codec.encode(&packet(1, &[1, 2, 3]), &mut buffer).unwrap();
    codec.encode(&packet(2, &[4, 5, 6]), &mut buffer).unwrap();

    let first = codec.decode(&mut buffer).unwrap().expect("Should have packet");
    assert_eq!(first.header().packet_type, 1);
    assert_eq!(first.payload(), &[1, 2, 3]);

    let second = codec.decode(&mut buffer).unwrap().expect("Should have packet");
    assert_eq!(second.header().packet_type, 2);
    assert_eq!(second.payload(), &[4, 5, 6]);

    assert!(buffer.is_empty());
}

#[test]
fn test_codec_byte_at_a_time() {
    let mut codec = PacketCodec::default();
    let mut encoded = BytesMut::new();
    codec.encode(&packet(9, b"split"), &mut encoded).unwrap();

    let mut buffer = BytesMut::new();
    let mut decoded = None;
    for byte in encoded.iter() {
        buffer.extend_from_slice(&[*byte]);
        if let Some(packet) = codec.decode(&mut buffer).unwrap() {
            decoded = Some(packet);
        }
    }
    let decoded = decoded.expect("Frame completes on the last byte");
    assert_eq!(decoded.payload(), b"split");
}

#[test]
fn test_codec_rejects_oversized_and_short_frames() {
    let mut codec = PacketCodec::new(16);

    let mut oversized = BytesMut::new();
    oversized.extend_from_slice(&100u32.to_le_bytes());
    assert!(matches!(
        codec.decode(&mut oversized),
        Err(ProtocolError::OversizedPacket(100))
    ));

    let mut short = BytesMut::new();
    short.extend_from_slice(&2u32.to_le_bytes());
    short.extend_from_slice(&[0, 0]);
    assert!(matches!(
        codec.decode(&mut short),
        Err(ProtocolError::InvalidHeader)
    ));

    let mut out = BytesMut::new();
    assert!(matches!(
        codec.encode(&packet(1, &[0; 32]), &mut out),
        Err(ProtocolError::OversizedPacket(36))
    ));
    assert!(out.is_empty());
}

fn registry(chat: Arc<AtomicU32>, blocker_first: bool) -> PacketTypeRegistry {
    let mut registry = PacketTypeRegistry::new();
    registry
        .add_static_type(StaticPacketType::Sync, "sync", |_: &Packet| {})
        .unwrap();
    let chat_hint = StaticPacketType::Chat.type_hint();
    if blocker_first {
        registry
            .add_dynamic_type_with_hint("mod$blocker", chat_hint, |_: &Packet| {})
            .unwrap();
    }
    registry
        .add_static_type(StaticPacketType::Chat, "chat", move |packet: &Packet| {
            chat.fetch_add(packet.payload_size() as u32, Ordering::SeqCst);
        })
        .unwrap();
    if !blocker_first {
        registry
            .add_dynamic_type_with_hint("mod$blocker", chat_hint, |_: &Packet| {})
            .unwrap();
    }
    registry
}

#[tokio::test]
async fn test_sync_and_dispatch_over_stream() {
    let (server_io, client_io) = tokio::io::duplex(4096);
    let mut server_stream = Framed::new(server_io, PacketCodec::default());
    let mut client_stream = Framed::new(client_io, PacketCodec::default());

    let server_registry = registry(Arc::new(AtomicU32::new(0)), false);
    let received = Arc::new(AtomicU32::new(0));
    let mut client_registry = registry(received.clone(), true);

    let mut server = PeerSession::new(1, Side::Server);
    let mut client = PeerSession::new(1, Side::Client);

    let mut sync = Packet::new();
    assert!(server.on_connected(&server_registry, &mut sync).unwrap());
    server_stream.send(&sync).await.unwrap();

    let mut chat = Packet::new();
    server_registry
        .build_header(&mut chat, StaticPacketType::Chat)
        .unwrap();
    chat.set_payload(b"hello").unwrap();
    server_stream.send(&chat).await.unwrap();

    let first = client_stream.next().await.expect("stream open").unwrap();
    client.receive(&mut client_registry, &first).unwrap();
    assert!(client.is_synced());

    let second = client_stream.next().await.expect("stream open").unwrap();
    client.receive(&mut client_registry, &second).unwrap();
    assert_eq!(received.load(Ordering::SeqCst), 5);
}

#[tokio::test]
async fn test_stream_rejects_traffic_before_sync() {
    let (server_io, client_io) = tokio::io::duplex(1024);
    let mut server_stream = Framed::new(server_io, PacketCodec::default());
    let mut client_stream = Framed::new(client_io, PacketCodec::default());

    let server_registry = registry(Arc::new(AtomicU32::new(0)), false);
    let mut client_registry = registry(Arc::new(AtomicU32::new(0)), false);
    let mut client = PeerSession::new(2, Side::Client);

    let mut chat = Packet::new();
    server_registry
        .build_header(&mut chat, StaticPacketType::Chat)
        .unwrap();
    server_stream.send(&chat).await.unwrap();

    let incoming = client_stream.next().await.expect("stream open").unwrap();
    assert!(matches!(
        client.receive(&mut client_registry, &incoming),
        Err(ProtocolError::NotSynced)
    ));
}
