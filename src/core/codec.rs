//! Length-delimited framing for stream transports.
//!
//! ```text
//! [Length(4, u32 LE)] [Header(4)] [Payload(Length - 4)]
//! ```
//!
//! Datagram transports hand whole packets over already and can use
//! [`Packet::from_bytes`] directly; this codec is for byte streams.

use crate::config::MAX_PACKET_SIZE;
use crate::core::packet::{Packet, HEADER_SIZE};
use crate::error::{ProtocolError, Result};
use bytes::{Buf, BufMut, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

const LEN_PREFIX: usize = 4;

#[derive(Debug, Clone, Copy)]
pub struct PacketCodec {
    max_packet_size: usize,
}

impl Default for PacketCodec {
    fn default() -> Self {
        Self::new(MAX_PACKET_SIZE)
    }
}

impl PacketCodec {
    /// `max_packet_size` is capped at what the `u32` length prefix can express.
    pub fn new(max_packet_size: usize) -> Self {
        Self {
            max_packet_size: max_packet_size.min(u32::MAX as usize),
        }
    }

    pub fn max_packet_size(&self) -> usize {
        self.max_packet_size
    }
}

impl Decoder for PacketCodec {
    type Item = Packet;
    type Error = ProtocolError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>> {
        if src.len() < LEN_PREFIX {
            return Ok(None);
        }

        let mut len_bytes = [0u8; LEN_PREFIX];
        len_bytes.copy_from_slice(&src[..LEN_PREFIX]);
        let frame_len = u32::from_le_bytes(len_bytes) as usize;

        if frame_len < HEADER_SIZE {
            return Err(ProtocolError::InvalidHeader);
        }
        if frame_len > self.max_packet_size {
            return Err(ProtocolError::OversizedPacket(frame_len));
        }

        if src.len() < LEN_PREFIX + frame_len {
            src.reserve(LEN_PREFIX + frame_len - src.len());
            return Ok(None);
        }

        src.advance(LEN_PREFIX);
        let frame = src.split_to(frame_len);
        Packet::from_bytes(&frame).map(Some)
    }
}

impl Encoder<&Packet> for PacketCodec {
    type Error = ProtocolError;

    fn encode(&mut self, packet: &Packet, dst: &mut BytesMut) -> Result<()> {
        let bytes = packet.as_bytes();
        if bytes.len() > self.max_packet_size {
            return Err(ProtocolError::OversizedPacket(bytes.len()));
        }
        let frame_len =
            u32::try_from(bytes.len()).map_err(|_| ProtocolError::OversizedPacket(bytes.len()))?;
        dst.reserve(LEN_PREFIX + bytes.len());
        dst.put_u32_le(frame_len);
        dst.put_slice(bytes);
        Ok(())
    }
}
