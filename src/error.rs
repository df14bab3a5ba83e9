//! # Error Types
//!
//! Error handling for packets, the packet type registry and table synchronization.
//!
//! ## Error Categories
//! - **Capacity Errors**: writes that would not fit the allocated packet buffer
//! - **Registration Errors**: duplicate names, exhausted identifier probing
//! - **Dispatch Errors**: unknown packet types, unregistered names
//! - **Sync Errors**: peers that cannot agree on a packet type table
//! - **Framing / I/O Errors**: codec and serialization failures
//!
//! Everything except [`ProtocolError::HashSpaceExhausted`] is recoverable by the
//! immediate caller. Hash space exhaustion means the registry was configured with an
//! implausible number of colliding names and must be treated as fatal; check
//! [`ProtocolError::is_fatal`] and stop.
//!
//! ## Example Usage
//! ```rust
//! use packet_registry::error::{ProtocolError, Result};
//! use packet_registry::Packet;
//! use tracing::{error, info};
//!
//! fn load(bytes: &[u8]) -> Result<Packet> {
//!     let mut packet = Packet::with_capacity(64)?;
//!     packet.set_packet(bytes)?;
//!     Ok(packet)
//! }
//!
//! match load(&[0u8; 128]) {
//!     Ok(packet) => info!(size = packet.packet_size(), "Loaded packet"),
//!     Err(e) => error!(error = %e, "Packet did not fit"),
//! }
//! ```

use crate::core::header::PacketType;
use crate::protocol::sync::SyncResult;
use std::io;
use thiserror::Error;

/// Error message constants to reduce allocations in error paths.
pub mod constants {
    pub const ERR_WRITER_OVERFLOW: &str = "Packet writer ran out of capacity";
    pub const ERR_READER_UNDERFLOW: &str = "Packet reader ran past the payload";
    pub const ERR_INVALID_UTF8: &str = "Payload is not valid UTF-8";
}

// ProtocolError is the primary error type for all packet and registry operations
#[derive(Error, Debug)]
pub enum ProtocolError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] bincode::Error),

    #[error("Deserialize error: {0}")]
    DeserializeError(String),

    #[error("Capacity exceeded: {requested} bytes requested, {available} available")]
    CapacityExceeded { requested: usize, available: usize },

    #[error("Invalid packet capacity: {0} bytes (must hold the header)")]
    InvalidCapacity(usize),

    #[error("Invalid packet header")]
    InvalidHeader,

    #[error("Packet too large: {0} bytes")]
    OversizedPacket(usize),

    #[error("Packet type name already registered: {0}")]
    DuplicateName(String),

    #[error("Static packet type already registered: {0}")]
    DuplicateStaticType(&'static str),

    #[error("Could not find a free identifier for [{name}] after {attempts} attempts")]
    HashSpaceExhausted { name: String, attempts: usize },

    #[error("Unknown packet type: {0}")]
    UnknownType(PacketType),

    #[error("Unknown packet type name: {0}")]
    UnknownName(String),

    #[error("Static packet type not registered: {0}")]
    UnregisteredStaticType(&'static str),

    #[error("Connection has not been synchronized yet")]
    NotSynced,

    #[error("Packet type synchronization failed: {0}")]
    SyncFailed(SyncResult),

    #[error("Unexpected message type")]
    UnexpectedMessage,

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl ProtocolError {
    /// Errors after which the process should not carry on.
    ///
    /// Hosts are expected to abort (or refuse to start) when this returns `true`.
    pub fn is_fatal(&self) -> bool {
        matches!(self, ProtocolError::HashSpaceExhausted { .. })
    }
}

/// Type alias for Results using ProtocolError
pub type Result<T> = std::result::Result<T, ProtocolError>;
