//! # Packet
//!
//! A packet is a header and a payload stored in one contiguous, pre-sized buffer.
//!
//! ```text
//! [Header(4)] [Payload(used - 4)] [unused slack (capacity - used)]
//! ```
//!
//! Capacity is chosen up front (usually per network MTU) and only changes through
//! [`Packet::set_capacity`]. Every write that would not fit fails with
//! [`ProtocolError::CapacityExceeded`] and leaves the packet untouched.

use crate::config::DEFAULT_PACKET_CAPACITY;
use crate::core::header::PacketHeader;
use crate::core::writer::{PacketReader, PacketWriter};
use crate::error::{constants, ProtocolError, Result};

/// Header size in bytes.
pub const HEADER_SIZE: usize = PacketHeader::SIZE;

/// Identifier of the connection a packet arrived on. Assigned by the transport.
pub type ConnectionId = u32;

/// Connection id of packets that did not come from the network.
pub const CONNECTION_ID_UNKNOWN: ConnectionId = 0;

#[derive(Debug, Clone)]
pub struct Packet {
    /// Allocated storage; `buffer.len()` is the packet capacity.
    buffer: Vec<u8>,
    /// Used bytes, header included. Always in `HEADER_SIZE..=buffer.len()`.
    size: usize,
    from: ConnectionId,
}

impl Default for Packet {
    fn default() -> Self {
        Self::new()
    }
}

/// Packets are equal when they would put the same bytes on the wire. Capacity, unused
/// slack and the source connection are not compared.
impl PartialEq for Packet {
    fn eq(&self, other: &Self) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

impl Eq for Packet {}

impl Packet {
    /// Create an empty packet with [`DEFAULT_PACKET_CAPACITY`] bytes allocated.
    pub fn new() -> Self {
        Self {
            buffer: vec![0; DEFAULT_PACKET_CAPACITY],
            size: HEADER_SIZE,
            from: CONNECTION_ID_UNKNOWN,
        }
    }

    /// Create an empty packet with `capacity` bytes allocated, header included.
    pub fn with_capacity(capacity: usize) -> Result<Self> {
        if capacity < HEADER_SIZE {
            return Err(ProtocolError::InvalidCapacity(capacity));
        }
        Ok(Self {
            buffer: vec![0; capacity],
            size: HEADER_SIZE,
            from: CONNECTION_ID_UNKNOWN,
        })
    }

    /// Copy a complete packet (header and payload) received from the transport.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let mut packet = Self::with_capacity(data.len().max(HEADER_SIZE))?;
        packet.set_packet(data)?;
        Ok(packet)
    }

    /// Create a packet with a zeroed header holding `payload`.
    pub fn from_payload(payload: &[u8]) -> Self {
        let mut buffer = vec![0; HEADER_SIZE + payload.len()];
        buffer[HEADER_SIZE..].copy_from_slice(payload);
        Self {
            size: buffer.len(),
            buffer,
            from: CONNECTION_ID_UNKNOWN,
        }
    }

    // ------------------------------------------------------------------ //
    // Packet / General
    // ------------------------------------------------------------------ //

    /// Total bytes allocated, header included.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }

    /// Total bytes used, header included.
    #[inline]
    pub fn packet_size(&self) -> usize {
        self.size
    }

    /// Unused bytes after the payload.
    #[inline]
    pub fn bytes_left(&self) -> usize {
        self.capacity() - self.size
    }

    /// Resize the allocation. Existing bytes up to `min(old, capacity)` are kept.
    ///
    /// Growing never changes the used size. Shrinking below the used size truncates the
    /// payload so the packet still fits its buffer.
    pub fn set_capacity(&mut self, capacity: usize) -> Result<()> {
        if capacity < HEADER_SIZE {
            return Err(ProtocolError::InvalidCapacity(capacity));
        }
        self.buffer.resize(capacity, 0);
        self.buffer.shrink_to_fit();
        self.size = self.size.min(capacity);
        Ok(())
    }

    /// Overwrite the whole packet, header included, with `data`.
    pub fn set_packet(&mut self, data: &[u8]) -> Result<()> {
        if data.len() < HEADER_SIZE {
            return Err(ProtocolError::InvalidHeader);
        }
        if data.len() > self.capacity() {
            return Err(ProtocolError::CapacityExceeded {
                requested: data.len(),
                available: self.capacity(),
            });
        }
        self.buffer[..data.len()].copy_from_slice(data);
        self.size = data.len();
        Ok(())
    }

    /// The used bytes, header and payload, ready to hand to the transport.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer[..self.size]
    }

    /// Where the packet came from. Set by whoever received it.
    pub fn from_connection(&self) -> ConnectionId {
        self.from
    }

    pub fn set_from_connection(&mut self, from: ConnectionId) {
        self.from = from;
    }

    // ------------------------------------------------------------------ //
    // Header
    // ------------------------------------------------------------------ //

    pub fn set_header(&mut self, header: PacketHeader) {
        self.buffer[..HEADER_SIZE].copy_from_slice(&header.encode());
    }

    pub fn header(&self) -> PacketHeader {
        let mut raw = [0u8; HEADER_SIZE];
        raw.copy_from_slice(&self.buffer[..HEADER_SIZE]);
        PacketHeader::decode(&raw)
    }

    /// Write zeros over the header.
    pub fn clear_header(&mut self) {
        self.buffer[..HEADER_SIZE].fill(0);
    }

    // ------------------------------------------------------------------ //
    // Payload
    // ------------------------------------------------------------------ //

    /// Drop the payload. The header and the underlying bytes are left as they are.
    pub fn clear(&mut self) {
        self.size = HEADER_SIZE;
    }

    #[inline]
    pub fn payload_size(&self) -> usize {
        self.size - HEADER_SIZE
    }

    /// Total bytes the payload can use.
    #[inline]
    pub fn payload_capacity(&self) -> usize {
        self.capacity() - HEADER_SIZE
    }

    /// Override the payload size directly, e.g. after writing through [`Packet::payload_mut`].
    pub fn set_payload_size(&mut self, size: usize) -> Result<()> {
        if size > self.payload_capacity() {
            return Err(ProtocolError::CapacityExceeded {
                requested: size,
                available: self.payload_capacity(),
            });
        }
        self.size = HEADER_SIZE + size;
        Ok(())
    }

    /// Replace the payload with `data`.
    pub fn set_payload(&mut self, data: &[u8]) -> Result<()> {
        if data.len() > self.payload_capacity() {
            return Err(ProtocolError::CapacityExceeded {
                requested: data.len(),
                available: self.payload_capacity(),
            });
        }
        self.buffer[HEADER_SIZE..HEADER_SIZE + data.len()].copy_from_slice(data);
        self.size = HEADER_SIZE + data.len();
        Ok(())
    }

    /// The live payload. Empty when nothing has been written.
    #[inline]
    pub fn payload(&self) -> &[u8] {
        &self.buffer[HEADER_SIZE..self.size]
    }

    #[inline]
    pub fn payload_mut(&mut self) -> &mut [u8] {
        &mut self.buffer[HEADER_SIZE..self.size]
    }

    /// The payload interpreted as UTF-8 text.
    pub fn payload_str(&self) -> Result<&str> {
        std::str::from_utf8(self.payload())
            .map_err(|_| ProtocolError::DeserializeError(constants::ERR_INVALID_UTF8.to_string()))
    }

    /// Sequential writer starting at the current end of the payload.
    ///
    /// Writes only become part of the packet once [`PacketWriter::finalize`] is called.
    /// Start from a fresh packet or call [`Packet::clear`] to write from the payload start.
    pub fn writer(&mut self) -> PacketWriter<'_> {
        PacketWriter::new(self)
    }

    /// Sequential reader over the payload.
    pub fn reader(&self) -> PacketReader<'_> {
        PacketReader::new(self.payload())
    }

    /// Unused bytes after the used region, for [`PacketWriter`].
    pub(crate) fn slack_mut(&mut self) -> &mut [u8] {
        let size = self.size;
        &mut self.buffer[size..]
    }

    /// Extend the used region by `count` bytes already written into the slack.
    pub(crate) fn commit(&mut self, count: usize) {
        debug_assert!(count <= self.bytes_left());
        self.size += count;
    }
}
