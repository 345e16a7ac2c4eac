//! Random identity suffixes.

use rand::rngs::OsRng;
use rand::RngCore;

/// Suffix length in bytes when the configured size is zero or negative.
pub const DEFAULT_SUFFIX_BYTES: usize = 4;

/// Normalize a configured suffix size.
pub fn suffix_len(configured: i64) -> usize {
    if configured <= 0 {
        DEFAULT_SUFFIX_BYTES
    } else {
        configured as usize
    }
}

/// Generate `-<hex>` from `len` bytes of the operating system's CSPRNG.
pub fn generate_suffix(len: usize) -> Result<String, rand::Error> {
    generate_suffix_with(&mut OsRng, len)
}

/// Generate a suffix from the given random source.
pub fn generate_suffix_with<R: RngCore + ?Sized>(
    rng: &mut R,
    len: usize,
) -> Result<String, rand::Error> {
    let mut bytes = vec![0u8; len];
    rng.try_fill_bytes(&mut bytes)?;
    Ok(format!("-{}", hex::encode(bytes)))
}
