use crate::core::hash::fnv1a_32;
use crate::core::header::PacketType;
use std::fmt;

/// Packet types every build knows at compile time.
///
/// The ordinal, not the name, seeds the identifier, so two processes built with the same
/// enum derive the same identifiers no matter in which order they register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StaticPacketType {
    /// Carries the sender's packet type table. Always sent first by the server.
    Sync = 0,
    Chat = 1,
    PlayerJoin = 2,
    PlayerLeave = 3,
    PlayerList = 4,
    PlayerIncrement = 5,
    NpcSpawn = 6,
}

impl StaticPacketType {
    pub const COUNT: usize = 7;

    pub const ALL: [StaticPacketType; Self::COUNT] = [
        StaticPacketType::Sync,
        StaticPacketType::Chat,
        StaticPacketType::PlayerJoin,
        StaticPacketType::PlayerLeave,
        StaticPacketType::PlayerList,
        StaticPacketType::PlayerIncrement,
        StaticPacketType::NpcSpawn,
    ];

    #[inline]
    pub fn ordinal(self) -> usize {
        self as usize
    }

    pub fn from_ordinal(ordinal: usize) -> Option<Self> {
        Self::ALL.get(ordinal).copied()
    }

    /// First candidate identifier: FNV-1a over the ordinal as 8 little-endian bytes.
    pub fn type_hint(self) -> PacketType {
        fnv1a_32(&(self.ordinal() as u64).to_le_bytes())
    }

    pub fn as_str(self) -> &'static str {
        match self {
            StaticPacketType::Sync => "Sync",
            StaticPacketType::Chat => "Chat",
            StaticPacketType::PlayerJoin => "PlayerJoin",
            StaticPacketType::PlayerLeave => "PlayerLeave",
            StaticPacketType::PlayerList => "PlayerList",
            StaticPacketType::PlayerIncrement => "PlayerIncrement",
            StaticPacketType::NpcSpawn => "NpcSpawn",
        }
    }
}

impl fmt::Display for StaticPacketType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
