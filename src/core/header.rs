/// Identifier carried in every packet header, assigned by the packet type registry.
pub type PacketType = u32;

/// Packet header (wire format).
///
/// Encoding rules:
/// - Fixed size: exactly [`PacketHeader::SIZE`] bytes at offset 0 of every packet.
/// - `packet_type` is a little-endian `u32`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct PacketHeader {
    /// Registry identifier of the packet type. Not validated here; the registry does that.
    pub packet_type: PacketType,
}

impl PacketHeader {
    /// Header size in bytes.
    pub const SIZE: usize = 4;

    pub fn new(packet_type: PacketType) -> Self {
        Self { packet_type }
    }

    /// Encode the header into its fixed wire layout.
    pub fn encode(&self) -> [u8; Self::SIZE] {
        self.packet_type.to_le_bytes()
    }

    /// Decode a header from its fixed wire layout.
    pub fn decode(bytes: &[u8; Self::SIZE]) -> Self {
        Self {
            packet_type: PacketType::from_le_bytes(*bytes),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_is_little_endian() {
        let header = PacketHeader::new(0x0A0B_0C0D);
        assert_eq!(header.encode(), [0x0D, 0x0C, 0x0B, 0x0A]);
        assert_eq!(PacketHeader::decode(&header.encode()), header);
    }

    #[test]
    fn test_default_header_is_zero() {
        assert_eq!(PacketHeader::default().encode(), [0; PacketHeader::SIZE]);
    }
}
