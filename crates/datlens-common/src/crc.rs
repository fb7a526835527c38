//! CRC32C hashing utilities.
//!
//! CRC32C (Castagnoli) checksums archive entry bodies and derives stable
//! session identifiers from store identities.

/// Compute CRC32C hash of a byte slice.
///
/// Uses hardware acceleration when available (SSE4.2 on x86).
#[inline]
pub fn hash_bytes(data: &[u8]) -> u32 {
    crc32c::crc32c(data)
}

/// Compute CRC32C hash of a string.
///
/// The string is encoded as UTF-8 before hashing.
#[inline]
pub fn hash_str(s: &str) -> u32 {
    hash_bytes(s.as_bytes())
}
