//! 32-bit FNV-1a, the seed for every packet type identifier.
//!
//! Both ends of a connection must derive the same initial identifiers, so the hash is
//! fixed here rather than taken from `std::hash` (whose output is not stable across
//! processes).

const FNV_OFFSET_BASIS_32: u32 = 0x811C_9DC5;
const FNV_PRIME_32: u32 = 0x0100_0193;

/// Hash `data` with 32-bit FNV-1a.
#[inline]
pub fn fnv1a_32(data: &[u8]) -> u32 {
    data.iter().fold(FNV_OFFSET_BASIS_32, |hash, &byte| {
        (hash ^ u32::from(byte)).wrapping_mul(FNV_PRIME_32)
    })
}
