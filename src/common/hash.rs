//! The filter's single hash function.
//!
//! A Scalable Cuckoo Filter's fingerprints and bucket indices are all derived
//! from one 64-bit digest. It must be deterministic across processes and
//! platforms, and stable forever: a serialized filter embeds fingerprints
//! computed with this function, so changing it would silently invalidate
//! every filter ever written to disk.

use xxhash_rust::xxh64::xxh64;

/// Fixed seed used everywhere this crate calls [`digest`]. Never change this:
/// it is baked into every fingerprint and bucket index of every serialized filter.
pub const SEED: u64 = 0;

/// Hashes `data` with XXH64 at the crate's fixed seed.
///
/// # Examples
/// ```
/// use scalable_cuckoo_filter::common::hash::digest;
///
/// let a = digest(b"hello");
/// let b = digest(b"hello");
/// assert_eq!(a, b);
/// ```
pub fn digest(data: &[u8]) -> u64 {
    xxh64(data, SEED)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deterministic() {
        assert_eq!(digest(b"hello"), digest(b"hello"));
    }

    #[test]
    fn sensitive_to_input() {
        assert_ne!(digest(b"hello"), digest(b"world"));
    }

    #[test]
    fn empty_input_hashes() {
        // Must not panic on the empty byte string.
        let _ = digest(b"");
    }
}
