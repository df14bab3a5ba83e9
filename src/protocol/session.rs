//! # Peer Session
//!
//! Tracks whether one connection has agreed on packet type identifiers yet.
//!
//! ## Flow
//! ```text
//! Server                                   Client
//!   | on_connected: build Sync packet         |
//!   |---------------- Sync ------------------>| receive: registry.on_packet_sync
//!   |                                         |   Success -> Synced
//!   |<------------ other packets ------------>|   otherwise -> Failed (disconnect)
//! ```
//!
//! The server's table is canonical, so a server session starts out synced. A client
//! session refuses everything except the `Sync` packet until it has been applied.

use crate::core::packet::{ConnectionId, Packet};
use crate::error::{ProtocolError, Result};
use crate::protocol::registry::PacketTypeRegistry;
use crate::protocol::sync::SyncResult;
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Server,
    Client,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    Unsynced,
    Synced,
    Failed(SyncResult),
}

#[derive(Debug)]
pub struct PeerSession {
    connection: ConnectionId,
    side: Side,
    state: SyncState,
}

impl PeerSession {
    pub fn new(connection: ConnectionId, side: Side) -> Self {
        let state = match side {
            Side::Server => SyncState::Synced,
            Side::Client => SyncState::Unsynced,
        };
        Self {
            connection,
            side,
            state,
        }
    }

    pub fn connection(&self) -> ConnectionId {
        self.connection
    }

    pub fn side(&self) -> Side {
        self.side
    }

    pub fn state(&self) -> SyncState {
        self.state
    }

    pub fn is_synced(&self) -> bool {
        self.state == SyncState::Synced
    }

    /// Called once the transport is up.
    ///
    /// On the server this fills `packet` with the registry's `Sync` packet and returns
    /// `true`; the caller must send it before anything else. Clients have nothing to send.
    pub fn on_connected(
        &mut self,
        registry: &PacketTypeRegistry,
        packet: &mut Packet,
    ) -> Result<bool> {
        match self.side {
            Side::Server => {
                registry.build_sync_packet(packet)?;
                info!(
                    connection = self.connection,
                    types = registry.len(),
                    bytes = packet.packet_size(),
                    "Sending packet type table"
                );
                Ok(true)
            }
            Side::Client => {
                debug!(connection = self.connection, "Waiting for packet type table");
                Ok(false)
            }
        }
    }

    /// Process a packet received on this connection.
    pub fn receive(&mut self, registry: &mut PacketTypeRegistry, packet: &Packet) -> Result<()> {
        match self.state {
            SyncState::Failed(result) => Err(ProtocolError::SyncFailed(result)),
            SyncState::Unsynced => {
                if !registry.is_sync_packet(packet) {
                    warn!(
                        connection = self.connection,
                        packet_type = packet.header().packet_type,
                        "Packet received before the packet type table"
                    );
                    return Err(ProtocolError::NotSynced);
                }

                let result = registry.on_packet_sync(packet)?;
                if result.is_success() {
                    self.state = SyncState::Synced;
                    Ok(())
                } else {
                    error!(connection = self.connection, %result, "Disconnecting peer");
                    self.state = SyncState::Failed(result);
                    Err(ProtocolError::SyncFailed(result))
                }
            }
            SyncState::Synced => {
                if registry.is_sync_packet(packet) {
                    warn!(connection = self.connection, "Unexpected second packet type table");
                    return Err(ProtocolError::UnexpectedMessage);
                }
                registry.handle_packet(packet)
            }
        }
    }
}
