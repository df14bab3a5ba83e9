//! # Packet Type Protocol
//!
//! Packet type registration, dispatch and cross-peer identifier synchronization.
//!
//! ## Components
//! - **Static Types**: packet types compiled into every build
//! - **Registry**: name and callback per identifier, hashing with linear probing
//! - **Sync**: re-keying a registry to the server's canonical table
//! - **Session**: per-connection gate that holds traffic until the table is synced

pub mod registry;
pub mod session;
pub mod static_types;
pub mod sync;
