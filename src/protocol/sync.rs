//! # Packet Type Table Synchronization
//!
//! Independent hashing and registration order can give the same name different
//! identifiers on two processes. The server is the source of truth: on connection it sends
//! its table in a `Sync` packet and the peer re-keys its own entries to match before any
//! other packet is processed.
//!
//! ## Wire Format
//! The `Sync` payload is a sequence of records, read until the payload is exhausted:
//! ```text
//! [Type(4, u32 LE)] [NameLen(8, u64 LE)] [Name(NameLen, UTF-8)] ...
//! ```

use crate::core::hash::fnv1a_32;
use crate::core::header::PacketType;
use crate::core::packet::Packet;
use crate::error::{ProtocolError, Result};
use crate::protocol::registry::{PacketTypeEntry, PacketTypeRegistry, TypeOrigin};
use crate::protocol::static_types::StaticPacketType;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use tracing::{debug, error, info, instrument, warn};

/// One `(identifier, name)` pair of a registry table.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SyncRecord {
    pub packet_type: PacketType,
    pub name: String,
}

impl SyncRecord {
    pub fn new(packet_type: PacketType, name: impl Into<String>) -> Self {
        Self {
            packet_type,
            name: name.into(),
        }
    }

    /// Encoded size on the wire.
    pub fn encoded_size(&self) -> usize {
        Self::encoded_len(&self.name)
    }

    /// `u32` type, `u64` name length, then the name bytes.
    fn encoded_len(name: &str) -> usize {
        4 + 8 + name.len()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncResult {
    Success,
    /// The peer knows a name we do not. The two sides cannot talk.
    NameMismatch,
    /// We have fewer types than the peer.
    MissingType,
    /// We have more types than the peer and extra types are not allowed.
    ExtraType,
}

impl SyncResult {
    pub fn is_success(self) -> bool {
        self == SyncResult::Success
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SyncResult::Success => "success",
            SyncResult::NameMismatch => "name mismatch",
            SyncResult::MissingType => "missing packet type",
            SyncResult::ExtraType => "extra packet type",
        }
    }
}

impl fmt::Display for SyncResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl PacketTypeRegistry {
    /// Snapshot of every registered `(identifier, name)`, ordered by identifier.
    pub fn serialize(&self) -> Vec<SyncRecord> {
        let mut records: Vec<_> = self
            .entries
            .iter()
            .map(|(packet_type, entry)| SyncRecord::new(*packet_type, entry.name.clone()))
            .collect();
        records.sort_unstable_by_key(|record| record.packet_type);
        records
    }

    /// Re-key local entries so every name in `canonical` uses the canonical identifier.
    ///
    /// Everything is validated before the first mutation, so any result other than
    /// [`SyncResult::Success`] leaves the registry exactly as it was.
    #[instrument(skip_all, fields(local = self.entries.len(), canonical = canonical.len()))]
    pub fn sync(&mut self, canonical: &[SyncRecord]) -> SyncResult {
        match self.reconcile(canonical) {
            Ok(remapped) => {
                self.metrics.sync_success(remapped as u64);
                debug!(remapped, "Packet types synchronized");
                SyncResult::Success
            }
            Err(result) => {
                self.metrics.sync_failed();
                result
            }
        }
    }

    fn reconcile(&mut self, canonical: &[SyncRecord]) -> std::result::Result<usize, SyncResult> {
        if self.entries.len() < canonical.len() {
            error!(
                missing = canonical.len() - self.entries.len(),
                "We are missing packet types"
            );
            return Err(SyncResult::MissingType);
        }

        if self.entries.len() > canonical.len() {
            let extra = self.entries.len() - canonical.len();
            if !self.config.allow_extra_types {
                error!(extra, "We have packet types our sync source does not");
                return Err(SyncResult::ExtraType);
            }
            debug!(extra, "We have more packet types than our sync source");
        }

        let mut canonical_names = HashSet::with_capacity(canonical.len());
        let mut canonical_types = HashSet::with_capacity(canonical.len());
        for record in canonical {
            if !canonical_names.insert(record.name.as_str())
                || !canonical_types.insert(record.packet_type)
            {
                error!(
                    packet_name = %record.name,
                    packet_type = record.packet_type,
                    "Sync source lists a packet type twice"
                );
                return Err(SyncResult::NameMismatch);
            }
        }

        let local: HashMap<&str, PacketType> = self
            .entries
            .iter()
            .map(|(packet_type, entry)| (entry.name.as_str(), *packet_type))
            .collect();

        let mut missing_names = Vec::new();
        let mut remaps = Vec::new();
        for record in canonical {
            match local.get(record.name.as_str()) {
                None => missing_names.push(record.name.as_str()),
                Some(&local_type) if local_type != record.packet_type => {
                    remaps.push((local_type, record.packet_type));
                }
                Some(_) => {}
            }
        }

        if !missing_names.is_empty() {
            error!(
                missing = %missing_names.join(", "),
                "Unable to find these packet types"
            );
            return Err(SyncResult::NameMismatch);
        }

        // Pull every entry that moves out first, so swapped identifiers never clobber
        // each other.
        let mut moving: Vec<(PacketType, PacketTypeEntry)> = Vec::with_capacity(remaps.len());
        for (local_type, canonical_type) in &remaps {
            if let Some(entry) = self.entries.remove(local_type) {
                moving.push((*canonical_type, entry));
            }
        }

        // A canonical identifier can only still be taken by a local-only type.
        let mut evicted = Vec::new();
        for (canonical_type, _) in &moving {
            if let Some(occupant) = self.entries.remove(canonical_type) {
                evicted.push(occupant);
            }
        }

        let remapped = moving.len();
        for (canonical_type, entry) in moving {
            self.place_entry(canonical_type, entry);
        }

        for entry in evicted {
            let type_hint = match entry.origin {
                TypeOrigin::Static(static_type) => static_type.type_hint(),
                TypeOrigin::Dynamic => fnv1a_32(entry.name.as_bytes()),
            };
            let packet_type = self.first_free_type(type_hint);
            warn!(
                packet_name = %entry.name,
                packet_type,
                "Moved local-only packet type out of the way of a synchronized one"
            );
            self.place_entry(packet_type, entry);
        }

        Ok(remapped)
    }

    /// Insert `entry` under `packet_type` and point its side table at the new identifier.
    fn place_entry(&mut self, packet_type: PacketType, entry: PacketTypeEntry) {
        match entry.origin {
            TypeOrigin::Static(static_type) => {
                self.static_types[static_type.ordinal()] = Some(packet_type);
            }
            TypeOrigin::Dynamic => {
                self.dynamic_types.insert(entry.name.clone(), packet_type);
            }
        }
        self.entries.insert(packet_type, entry);
    }

    /// Unbounded linear probe. Only used for local-only types, which peers never address,
    /// so the registration probe budget does not apply.
    fn first_free_type(&self, type_hint: PacketType) -> PacketType {
        let mut candidate = type_hint;
        while self.entries.contains_key(&candidate) {
            candidate = candidate.wrapping_add(1);
        }
        candidate
    }

    /// Bytes needed for the payload of a `Sync` packet describing this registry.
    pub fn encoded_sync_size(&self) -> usize {
        self.entries
            .values()
            .map(|entry| SyncRecord::encoded_len(&entry.name))
            .sum()
    }

    /// Whether the packet carries a peer's table.
    pub fn is_sync_packet(&self, packet: &Packet) -> bool {
        let sync_type = self
            .static_type(StaticPacketType::Sync)
            .unwrap_or_else(|| StaticPacketType::Sync.type_hint());
        packet.header().packet_type == sync_type
    }

    /// Replace the packet's contents with a `Sync` header and this registry's table.
    ///
    /// Fails without touching the packet if the table does not fit its capacity.
    pub fn build_sync_packet(&self, packet: &mut Packet) -> Result<()> {
        let needed = self.encoded_sync_size();
        if needed > packet.payload_capacity() {
            return Err(ProtocolError::CapacityExceeded {
                requested: needed,
                available: packet.payload_capacity(),
            });
        }

        self.build_header(packet, StaticPacketType::Sync)?;
        packet.clear();
        let mut writer = packet.writer();
        for record in self.serialize() {
            writer.write(&record)?;
        }
        writer.finalize();
        Ok(())
    }

    /// Decode the records carried by a `Sync` packet.
    pub fn decode_sync_payload(packet: &Packet) -> Result<Vec<SyncRecord>> {
        let mut reader = packet.reader();
        let mut records = Vec::new();
        while !reader.is_empty() {
            records.push(reader.read::<SyncRecord>()?);
        }
        Ok(records)
    }

    /// Apply a peer's `Sync` packet to this registry.
    pub fn on_packet_sync(&mut self, packet: &Packet) -> Result<SyncResult> {
        let records = Self::decode_sync_payload(packet)?;
        let result = self.sync(&records);
        if result.is_success() {
            info!(
                types = records.len(),
                from = packet.from_connection(),
                "Sync ok"
            );
        } else {
            error!(
                %result,
                from = packet.from_connection(),
                "Failed to sync packet types"
            );
        }
        Ok(result)
    }
}
