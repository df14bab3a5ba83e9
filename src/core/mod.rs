//! # Core Packet Components
//!
//! Low-level packet buffer, header layout, sequential payload access and stream framing.
//!
//! ## Components
//! - **Header**: fixed 4-byte packet type tag
//! - **Packet**: pre-sized buffer holding header and payload
//! - **Writer / Reader**: structured sequential payload access
//! - **Codec**: Tokio codec for framing packets over byte streams
//! - **Hash**: FNV-1a seed for packet type identifiers
//!
//! ## Wire Format
//! ```text
//! [Type(4, u32 LE)] [Payload(N)]
//! ```

pub mod codec;
pub mod hash;
pub mod header;
pub mod packet;
pub mod writer;
