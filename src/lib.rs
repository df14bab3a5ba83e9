//! # Packet Registry
//!
//! Fixed-capacity network packets and a packet type registry that keeps identifiers
//! consistent between a server and its clients.
//!
//! ## Features
//! - **Packets**: pre-sized buffers with a 4-byte type header, never grown implicitly
//! - **Structured Payloads**: scoped writer and sequential reader backed by bincode
//! - **Registry**: FNV-1a hashed identifiers with linear probing for collisions
//! - **Sync**: the server's table is sent on connect and the client re-keys to it
//! - **Framing**: Tokio codec for carrying packets over byte streams
//!
//! ## Quick Start
//! ```rust
//! use packet_registry::{Packet, PacketTypeRegistry, StaticPacketType};
//!
//! let mut server = PacketTypeRegistry::new();
//! server.add_static_type(StaticPacketType::Sync, "sync", |_: &Packet| {})?;
//! server.add_dynamic_type("mymod$hello", |_: &Packet| {})?;
//!
//! let mut client = PacketTypeRegistry::new();
//! client.add_static_type(StaticPacketType::Sync, "sync", |_: &Packet| {})?;
//! client.add_dynamic_type("mymod$hello", |_: &Packet| {})?;
//!
//! let mut sync = Packet::new();
//! server.build_sync_packet(&mut sync)?;
//! assert!(client.on_packet_sync(&sync)?.is_success());
//! # Ok::<(), packet_registry::ProtocolError>(())
//! ```

pub mod config;
pub mod core;
pub mod error;
pub mod protocol;
pub mod utils;

pub use crate::config::NetworkConfig;
pub use crate::core::codec::PacketCodec;
pub use crate::core::header::{PacketHeader, PacketType};
pub use crate::core::packet::{ConnectionId, Packet, HEADER_SIZE};
pub use crate::core::writer::{PacketReader, PacketWriter};
pub use crate::error::{ProtocolError, Result};
pub use crate::protocol::registry::{mod_packet_name, PacketCallback, PacketTypeRegistry};
pub use crate::protocol::session::{PeerSession, Side, SyncState};
pub use crate::protocol::static_types::StaticPacketType;
pub use crate::protocol::sync::{SyncRecord, SyncResult};
