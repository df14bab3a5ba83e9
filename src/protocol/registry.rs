//! # Packet Type Registry
//!
//! Maps packet type identifiers to a name and a callback, and dispatches incoming packets.
//!
//! Identifiers are derived by hashing (FNV-1a 32), then made unique by linear probing:
//! `hint, hint + 1, hint + 2, ...` up to the configured attempt budget. Two independently
//! built registries can therefore disagree on identifiers when they registered colliding
//! names in a different order; [`sync`](PacketTypeRegistry::sync) fixes that.
//!
//! ```rust
//! use packet_registry::{Packet, PacketTypeRegistry};
//!
//! let mut registry = PacketTypeRegistry::new();
//! registry
//!     .add_dynamic_type("mymod$ping", |packet: &Packet| {
//!         tracing::info!(bytes = packet.payload_size(), "ping");
//!     })
//!     .expect("unique name");
//!
//! let mut packet = Packet::new();
//! registry.build_named_header(&mut packet, "mymod$ping").expect("registered");
//! registry.handle_packet(&packet).expect("dispatched");
//! ```

use crate::config::RegistryConfig;
use crate::core::hash::fnv1a_32;
use crate::core::header::{PacketHeader, PacketType};
use crate::core::packet::Packet;
use crate::error::{ProtocolError, Result};
use crate::protocol::static_types::StaticPacketType;
use crate::utils::metrics::Metrics;
use std::collections::HashMap;
use std::fmt::Write as _;
use tracing::{debug, error, info, instrument, warn};

/// Callback invoked with every packet of the registered type.
pub type PacketCallback = Box<dyn FnMut(&Packet) + Send + 'static>;

/// Which side table an entry's identifier is recorded in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TypeOrigin {
    Static(StaticPacketType),
    Dynamic,
}

pub(crate) struct PacketTypeEntry {
    pub(crate) name: String,
    pub(crate) origin: TypeOrigin,
    pub(crate) callback: PacketCallback,
}

/// Build the namespaced name a mod registers its packet types under.
pub fn mod_packet_name(mod_id: &str, packet_name: &str) -> String {
    format!("{mod_id}${packet_name}")
}

pub struct PacketTypeRegistry {
    pub(crate) entries: HashMap<PacketType, PacketTypeEntry>,
    pub(crate) static_types: [Option<PacketType>; StaticPacketType::COUNT],
    pub(crate) dynamic_types: HashMap<String, PacketType>,
    pub(crate) config: RegistryConfig,
    pub(crate) metrics: Metrics,
}

impl Default for PacketTypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for PacketTypeRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PacketTypeRegistry")
            .field("types", &self.entries.len())
            .field("static_types", &self.static_types)
            .field("dynamic_types", &self.dynamic_types)
            .finish()
    }
}

impl PacketTypeRegistry {
    pub fn new() -> Self {
        Self::with_config(&RegistryConfig::default())
    }

    pub fn with_config(config: &RegistryConfig) -> Self {
        Self {
            entries: HashMap::new(),
            static_types: [None; StaticPacketType::COUNT],
            dynamic_types: HashMap::new(),
            config: config.clone(),
            metrics: Metrics::new(),
        }
    }

    // ------------------------------------------------------------------ //
    // Registration
    // ------------------------------------------------------------------ //

    /// Register a packet type known at compile time.
    ///
    /// The first candidate identifier is derived from the ordinal, so every build with
    /// the same [`StaticPacketType`] enum starts from the same identifier.
    #[instrument(skip(self, callback), fields(ordinal = static_type.ordinal()))]
    pub fn add_static_type<F>(
        &mut self,
        static_type: StaticPacketType,
        name: &str,
        callback: F,
    ) -> Result<PacketType>
    where
        F: FnMut(&Packet) + Send + 'static,
    {
        if self.static_types[static_type.ordinal()].is_some() {
            error!(%static_type, packet_name = name, "Static packet type registered twice");
            self.metrics.registration_rejected();
            return Err(ProtocolError::DuplicateStaticType(static_type.as_str()));
        }

        let packet_type = self.insert_entry(
            name,
            static_type.type_hint(),
            TypeOrigin::Static(static_type),
            Box::new(callback),
        )?;
        self.static_types[static_type.ordinal()] = Some(packet_type);
        Ok(packet_type)
    }

    /// Register a packet type by name at runtime, typically on behalf of a mod.
    pub fn add_dynamic_type<F>(&mut self, name: &str, callback: F) -> Result<PacketType>
    where
        F: FnMut(&Packet) + Send + 'static,
    {
        self.add_dynamic_type_with_hint(name, fnv1a_32(name.as_bytes()), callback)
    }

    /// Register a dynamic packet type starting the identifier search at `type_hint`
    /// instead of the name hash.
    ///
    /// Peers only agree on such identifiers after a sync, so prefer
    /// [`add_dynamic_type`](Self::add_dynamic_type).
    #[instrument(skip(self, callback))]
    pub fn add_dynamic_type_with_hint<F>(
        &mut self,
        name: &str,
        type_hint: PacketType,
        callback: F,
    ) -> Result<PacketType>
    where
        F: FnMut(&Packet) + Send + 'static,
    {
        let packet_type =
            self.insert_entry(name, type_hint, TypeOrigin::Dynamic, Box::new(callback))?;
        self.dynamic_types.insert(name.to_string(), packet_type);
        Ok(packet_type)
    }

    fn insert_entry(
        &mut self,
        name: &str,
        type_hint: PacketType,
        origin: TypeOrigin,
        callback: PacketCallback,
    ) -> Result<PacketType> {
        if self.contains_name(name) {
            error!(
                packet_name = name,
                "Could not add packet type since an entry with that name already exists"
            );
            self.metrics.registration_rejected();
            return Err(ProtocolError::DuplicateName(name.to_string()));
        }

        let packet_type = match self.probe_free_type(name, type_hint) {
            Ok(packet_type) => packet_type,
            Err(e) => {
                self.metrics.registration_rejected();
                return Err(e);
            }
        };

        self.entries.insert(
            packet_type,
            PacketTypeEntry {
                name: name.to_string(),
                origin,
                callback,
            },
        );
        self.metrics.registration();
        debug!(packet_name = name, packet_type, "Packet type registered");
        Ok(packet_type)
    }

    /// Linear probe from `type_hint` for an unused identifier.
    ///
    /// Running out of attempts yields a fatal error (see [`ProtocolError::is_fatal`]).
    pub(crate) fn probe_free_type(&self, name: &str, type_hint: PacketType) -> Result<PacketType> {
        for attempt in 0..self.config.probe_attempts {
            let candidate = type_hint.wrapping_add(attempt as PacketType);
            if !self.entries.contains_key(&candidate) {
                self.metrics.collision_resolved(attempt as u64);
                return Ok(candidate);
            }
        }

        error!(
            packet_name = name,
            type_hint,
            attempts = self.config.probe_attempts,
            "Could not find a free packet type identifier, registry is misconfigured"
        );
        Err(ProtocolError::HashSpaceExhausted {
            name: name.to_string(),
            attempts: self.config.probe_attempts,
        })
    }

    // ------------------------------------------------------------------ //
    // Dispatch
    // ------------------------------------------------------------------ //

    /// Invoke the callback registered for the packet's type.
    ///
    /// Unknown types are logged and reported as [`ProtocolError::UnknownType`]; the
    /// packet is dropped and the caller can carry on.
    pub fn handle_packet(&mut self, packet: &Packet) -> Result<()> {
        let packet_type = packet.header().packet_type;
        match self.entries.get_mut(&packet_type) {
            Some(entry) => {
                (entry.callback)(packet);
                self.metrics.packet_dispatched(packet.payload_size() as u64);
                Ok(())
            }
            None => {
                warn!(
                    packet_type,
                    from = packet.from_connection(),
                    "Got packet of unknown type, ignoring"
                );
                self.metrics.packet_unknown();
                Err(ProtocolError::UnknownType(packet_type))
            }
        }
    }

    /// Write the identifier currently assigned to `static_type` into the packet header.
    pub fn build_header(&self, packet: &mut Packet, static_type: StaticPacketType) -> Result<()> {
        let packet_type = self
            .static_type(static_type)
            .ok_or(ProtocolError::UnregisteredStaticType(static_type.as_str()))?;
        packet.set_header(PacketHeader::new(packet_type));
        Ok(())
    }

    /// Write the identifier of the dynamic type `name` into the packet header.
    ///
    /// The packet is left untouched if `name` is not registered.
    pub fn build_named_header(&self, packet: &mut Packet, name: &str) -> Result<()> {
        let packet_type = self
            .find_dynamic_type(name)
            .ok_or_else(|| ProtocolError::UnknownName(name.to_string()))?;
        packet.set_header(PacketHeader::new(packet_type));
        Ok(())
    }

    // ------------------------------------------------------------------ //
    // Introspection
    // ------------------------------------------------------------------ //

    pub fn find_dynamic_type(&self, name: &str) -> Option<PacketType> {
        self.dynamic_types.get(name).copied()
    }

    pub fn static_type(&self, static_type: StaticPacketType) -> Option<PacketType> {
        self.static_types[static_type.ordinal()]
    }

    /// Name of the registered type the packet's header refers to.
    pub fn packet_type_name(&self, packet: &Packet) -> Option<&str> {
        self.type_name(packet.header().packet_type)
    }

    pub fn type_name(&self, packet_type: PacketType) -> Option<&str> {
        self.entries.get(&packet_type).map(|entry| entry.name.as_str())
    }

    pub fn contains_name(&self, name: &str) -> bool {
        self.entries.values().any(|entry| entry.name == name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Registered types as an `ID / NAME` table, sorted by identifier.
    pub fn packet_types_table(&self) -> String {
        let mut types: Vec<_> = self
            .entries
            .iter()
            .map(|(packet_type, entry)| (*packet_type, entry.name.as_str()))
            .collect();
        types.sort_unstable_by_key(|(packet_type, _)| *packet_type);

        let mut table = format!("{:-^34}\n", "Registered Packet Types");
        let _ = writeln!(table, "{:<15}PACKET TYPE NAME", "ID");
        for (packet_type, name) in types {
            let _ = writeln!(table, "#{packet_type:<14}{name}");
        }
        table
    }

    pub fn log_packet_types(&self) {
        info!(
            count = self.entries.len(),
            "Registered packet types\n{}",
            self.packet_types_table()
        );
    }
}
