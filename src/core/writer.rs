//! Sequential payload access.
//!
//! [`PacketWriter`] appends structured data after the current end of a packet and only
//! makes it part of the packet on [`PacketWriter::finalize`]. [`PacketReader`] walks a
//! payload front to back. Both use the same encoding: little-endian fixed-width integers,
//! `u64` length-prefixed strings, and bincode for `serde` types, so anything written with
//! `write` can be read back with `read`.

use crate::core::packet::Packet;
use crate::error::{constants, ProtocolError, Result};
use bincode::Options;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::io;
use tracing::warn;

/// Scoped writer over the unused part of a packet.
pub struct PacketWriter<'a> {
    packet: &'a mut Packet,
    written: usize,
    finalized: bool,
}

impl<'a> PacketWriter<'a> {
    pub(crate) fn new(packet: &'a mut Packet) -> Self {
        Self {
            packet,
            written: 0,
            finalized: false,
        }
    }

    /// Bytes written so far, not yet committed to the packet.
    pub fn written(&self) -> usize {
        self.written
    }

    /// Bytes that can still be written before the packet is full.
    pub fn remaining(&self) -> usize {
        self.packet.bytes_left() - self.written
    }

    pub fn write_bytes(&mut self, data: &[u8]) -> Result<()> {
        if data.len() > self.remaining() {
            return Err(ProtocolError::CapacityExceeded {
                requested: data.len(),
                available: self.remaining(),
            });
        }
        let start = self.written;
        self.packet.slack_mut()[start..start + data.len()].copy_from_slice(data);
        self.written += data.len();
        Ok(())
    }

    pub fn write_u8(&mut self, value: u8) -> Result<()> {
        self.write_bytes(&[value])
    }

    pub fn write_u16(&mut self, value: u16) -> Result<()> {
        self.write_bytes(&value.to_le_bytes())
    }

    pub fn write_u32(&mut self, value: u32) -> Result<()> {
        self.write_bytes(&value.to_le_bytes())
    }

    pub fn write_u64(&mut self, value: u64) -> Result<()> {
        self.write_bytes(&value.to_le_bytes())
    }

    pub fn write_i32(&mut self, value: i32) -> Result<()> {
        self.write_bytes(&value.to_le_bytes())
    }

    pub fn write_f32(&mut self, value: f32) -> Result<()> {
        self.write_bytes(&value.to_le_bytes())
    }

    /// Write a `u64` length prefix followed by the UTF-8 bytes. Nothing is written if
    /// the whole string does not fit.
    pub fn write_str(&mut self, value: &str) -> Result<()> {
        let needed = 8 + value.len();
        if needed > self.remaining() {
            return Err(ProtocolError::CapacityExceeded {
                requested: needed,
                available: self.remaining(),
            });
        }
        self.write_u64(value.len() as u64)?;
        self.write_bytes(value.as_bytes())
    }

    /// Write any serializable value with bincode. The encoded size is checked first so a
    /// value that does not fit leaves no partial bytes behind.
    pub fn write<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<()> {
        let needed = bincode::serialized_size(value)? as usize;
        if needed > self.remaining() {
            return Err(ProtocolError::CapacityExceeded {
                requested: needed,
                available: self.remaining(),
            });
        }
        bincode::serialize_into(&mut *self, value)?;
        Ok(())
    }

    /// Commit the written bytes to the packet and return how many there were.
    pub fn finalize(mut self) -> usize {
        self.packet.commit(self.written);
        self.finalized = true;
        self.written
    }
}

impl io::Write for PacketWriter<'_> {
    /// All-or-nothing: a buffer that does not fit is rejected instead of written partially.
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.write_bytes(buf)
            .map_err(|_| io::Error::new(io::ErrorKind::WriteZero, constants::ERR_WRITER_OVERFLOW))?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for PacketWriter<'_> {
    fn drop(&mut self) {
        if !self.finalized && self.written > 0 {
            warn!(
                discarded = self.written,
                "Packet writer dropped without finalize, writes discarded"
            );
        }
    }
}

/// Sequential reader over a packet payload.
#[derive(Debug, Clone)]
pub struct PacketReader<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> PacketReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, offset: 0 }
    }

    /// Bytes consumed so far.
    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.offset
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    pub fn read_bytes(&mut self, count: usize) -> Result<&'a [u8]> {
        if count > self.remaining() {
            return Err(ProtocolError::DeserializeError(
                constants::ERR_READER_UNDERFLOW.to_string(),
            ));
        }
        let bytes = &self.data[self.offset..self.offset + count];
        self.offset += count;
        Ok(bytes)
    }

    fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.read_bytes(N)?);
        Ok(out)
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.read_array::<1>()?[0])
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        self.read_array().map(u16::from_le_bytes)
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        self.read_array().map(u32::from_le_bytes)
    }

    pub fn read_u64(&mut self) -> Result<u64> {
        self.read_array().map(u64::from_le_bytes)
    }

    pub fn read_i32(&mut self) -> Result<i32> {
        self.read_array().map(i32::from_le_bytes)
    }

    pub fn read_f32(&mut self) -> Result<f32> {
        self.read_array().map(f32::from_le_bytes)
    }

    pub fn read_str(&mut self) -> Result<&'a str> {
        let len = usize::try_from(self.read_u64()?)
            .map_err(|_| ProtocolError::DeserializeError(constants::ERR_READER_UNDERFLOW.to_string()))?;
        let bytes = self.read_bytes(len)?;
        std::str::from_utf8(bytes)
            .map_err(|_| ProtocolError::DeserializeError(constants::ERR_INVALID_UTF8.to_string()))
    }

    /// Read a value written with [`PacketWriter::write`].
    pub fn read<T: DeserializeOwned>(&mut self) -> Result<T> {
        let limit = self.remaining() as u64;
        let value = bincode::options()
            .with_fixint_encoding()
            .allow_trailing_bytes()
            .with_limit(limit)
            .deserialize_from(&mut *self)?;
        Ok(value)
    }
}

impl io::Read for PacketReader<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let count = buf.len().min(self.remaining());
        buf[..count].copy_from_slice(&self.data[self.offset..self.offset + count]);
        self.offset += count;
        Ok(count)
    }
}
