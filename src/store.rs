//! Bit-packed bucket store: B buckets × S slots × F-bit fingerprints, addressed
//! as a single contiguous bit-vector.
//!
//! # Layout
//!
//! Slot `(bucket, slot)` occupies the bit range
//! `[(bucket * slots_per_bucket + slot) * fingerprint_bits, .. + fingerprint_bits)`
//! of a byte vector, packed end-to-end with no padding between slots and no
//! bit crossing a bucket boundary in the logical view (only in the physical
//! byte layout, which is exactly the point of bit-packing). Reads and writes
//! use explicit little-endian byte access so the layout is identical on
//! little- and big-endian hosts.
//!
//! Fingerprint `0` means "empty slot": every unset bit in an unoccupied slot
//! is `0`, which is what lets [`BucketStore::empty_slot`] just test for zero.

/// A contiguous, bit-packed array of `bucket_count * slots_per_bucket`
/// fingerprints, each `fingerprint_bits` wide.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BucketStore {
    bits: Vec<u8>,
    bucket_count: usize,
    slots_per_bucket: usize,
    fingerprint_bits: u32,
}

impl BucketStore {
    /// Creates an all-empty store sized for `bucket_count` buckets of
    /// `slots_per_bucket` slots each, `fingerprint_bits` wide.
    pub fn new(bucket_count: usize, slots_per_bucket: usize, fingerprint_bits: u32) -> Self {
        let total_bits = bucket_count * slots_per_bucket * fingerprint_bits as usize;
        let byte_len = total_bits.div_ceil(8);
        BucketStore {
            bits: vec![0u8; byte_len],
            bucket_count,
            slots_per_bucket,
            fingerprint_bits,
        }
    }

    /// Reconstructs a store from its exact byte layout (as produced by [`BucketStore::as_bytes`]).
    pub fn from_bytes(
        bytes: &[u8],
        bucket_count: usize,
        slots_per_bucket: usize,
        fingerprint_bits: u32,
    ) -> Self {
        let total_bits = bucket_count * slots_per_bucket * fingerprint_bits as usize;
        let byte_len = total_bits.div_ceil(8);
        debug_assert_eq!(bytes.len(), byte_len);
        BucketStore {
            bits: bytes.to_vec(),
            bucket_count,
            slots_per_bucket,
            fingerprint_bits,
        }
    }

    /// The raw, zero-padded-to-whole-bytes physical layout, for serialization.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bits
    }

    /// Number of buckets.
    pub fn bucket_count(&self) -> usize {
        self.bucket_count
    }

    /// Number of slots per bucket.
    pub fn slots_per_bucket(&self) -> usize {
        self.slots_per_bucket
    }

    /// Fingerprint width in bits.
    pub fn fingerprint_bits(&self) -> u32 {
        self.fingerprint_bits
    }

    fn bit_offset(&self, bucket: usize, slot: usize) -> usize {
        (bucket * self.slots_per_bucket + slot) * self.fingerprint_bits as usize
    }

    /// Reads the fingerprint at `(bucket, slot)`.
    pub fn read(&self, bucket: usize, slot: usize) -> u32 {
        get_bits(&self.bits, self.bit_offset(bucket, slot), self.fingerprint_bits)
    }

    /// Writes `fingerprint` at `(bucket, slot)`. `fingerprint` must fit in
    /// `fingerprint_bits` bits.
    pub fn write(&mut self, bucket: usize, slot: usize, fingerprint: u32) {
        let offset = self.bit_offset(bucket, slot);
        set_bits(&mut self.bits, offset, self.fingerprint_bits, fingerprint);
    }

    /// All `slots_per_bucket` fingerprints of `bucket`, in slot order.
    pub fn slots_of(&self, bucket: usize) -> Vec<u32> {
        (0..self.slots_per_bucket)
            .map(|slot| self.read(bucket, slot))
            .collect()
    }

    /// The first slot in `bucket` holding `fingerprint`, if any.
    pub fn find_in(&self, bucket: usize, fingerprint: u32) -> Option<usize> {
        (0..self.slots_per_bucket).find(|&slot| self.read(bucket, slot) == fingerprint)
    }

    /// The first empty (zero) slot in `bucket`, if any.
    pub fn empty_slot(&self, bucket: usize) -> Option<usize> {
        self.find_in(bucket, 0)
    }
}

/// Reads a `width`-bit (`width <= 32`) little-endian field starting at `bit_offset`.
fn get_bits(bytes: &[u8], bit_offset: usize, width: u32) -> u32 {
    if width == 0 {
        return 0;
    }
    let byte_start = bit_offset / 8;
    let shift_in_byte = (bit_offset % 8) as u32;
    // Gather enough bytes (up to 5, since a field can straddle at most
    // ceil((7 + 32) / 8) = 5 bytes) into a u64 accumulator, LSB-first.
    let mut acc: u64 = 0;
    let needed_bytes = ((shift_in_byte + width) as usize).div_ceil(8);
    for i in 0..needed_bytes {
        let byte = bytes.get(byte_start + i).copied().unwrap_or(0);
        acc |= (byte as u64) << (8 * i);
    }
    let mask = if width == 64 { u64::MAX } else { (1u64 << width) - 1 };
    ((acc >> shift_in_byte) & mask) as u32
}

/// Writes a `width`-bit (`width <= 32`) little-endian field starting at `bit_offset`.
fn set_bits(bytes: &mut [u8], bit_offset: usize, width: u32, value: u32) {
    if width == 0 {
        return;
    }
    let byte_start = bit_offset / 8;
    let shift_in_byte = (bit_offset % 8) as u32;
    let needed_bytes = ((shift_in_byte + width) as usize).div_ceil(8);

    let mask = if width == 64 { u64::MAX } else { (1u64 << width) - 1 };
    let value_bits = (value as u64 & mask) << shift_in_byte;
    let clear_mask = !(mask << shift_in_byte);

    let mut acc: u64 = 0;
    for i in 0..needed_bytes {
        let byte = bytes.get(byte_start + i).copied().unwrap_or(0);
        acc |= (byte as u64) << (8 * i);
    }
    acc = (acc & clear_mask) | value_bits;
    for i in 0..needed_bytes {
        if let Some(slot) = bytes.get_mut(byte_start + i) {
            *slot = (acc >> (8 * i)) as u8;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_simple() {
        let mut store = BucketStore::new(4, 4, 11);
        store.write(0, 0, 1);
        store.write(0, 1, 2047);
        store.write(3, 3, 42);
        assert_eq!(store.read(0, 0), 1);
        assert_eq!(store.read(0, 1), 2047);
        assert_eq!(store.read(3, 3), 42);
        assert_eq!(store.read(1, 0), 0);
    }

    #[test]
    fn empty_slot_and_find_in() {
        let mut store = BucketStore::new(2, 4, 8);
        assert_eq!(store.empty_slot(0), Some(0));
        store.write(0, 0, 5);
        assert_eq!(store.empty_slot(0), Some(1));
        assert_eq!(store.find_in(0, 5), Some(0));
        assert_eq!(store.find_in(0, 6), None);
    }

    #[test]
    fn serialize_round_trip() {
        let mut store = BucketStore::new(8, 4, 13);
        for b in 0..8 {
            for s in 0..4 {
                store.write(b, s, ((b * 4 + s) * 3 + 1) as u32 % ((1 << 13) - 1));
            }
        }
        let bytes = store.as_bytes().to_vec();
        let restored = BucketStore::from_bytes(&bytes, 8, 4, 13);
        for b in 0..8 {
            for s in 0..4 {
                assert_eq!(store.read(b, s), restored.read(b, s));
            }
        }
    }

    #[test]
    fn non_byte_dividing_widths_round_trip() {
        for &bits in &[1u32, 7, 8, 11, 16, 31, 32] {
            let slots_per_bucket = 4;
            let bucket_count = 4;
            let mut store = BucketStore::new(bucket_count, slots_per_bucket, bits);
            let max_val: u64 = if bits == 32 { u32::MAX as u64 } else { (1u64 << bits) - 1 };
            for b in 0..bucket_count {
                for s in 0..slots_per_bucket {
                    let v = ((b * slots_per_bucket + s) as u64 * 2654435761 % (max_val + 1)) as u32;
                    store.write(b, s, v);
                }
            }
            for b in 0..bucket_count {
                for s in 0..slots_per_bucket {
                    let expected = ((b * slots_per_bucket + s) as u64 * 2654435761 % (max_val + 1)) as u32;
                    assert_eq!(store.read(b, s), expected, "bits={bits} bucket={b} slot={s}");
                }
            }
        }
    }

    #[test]
    fn max_width_32_bits_round_trips() {
        let mut store = BucketStore::new(2, 4, 32);
        store.write(0, 0, u32::MAX - 1);
        store.write(1, 3, 0xDEAD_BEEF);
        assert_eq!(store.read(0, 0), u32::MAX - 1);
        assert_eq!(store.read(1, 3), 0xDEAD_BEEF);
    }

    proptest::proptest! {
        #[test]
        fn arbitrary_writes_read_back(values in proptest::collection::vec(0u32..2047, 16)) {
            let mut store = BucketStore::new(4, 4, 11);
            for (i, &v) in values.iter().enumerate() {
                store.write(i / 4, i % 4, v.max(1));
            }
            for (i, &v) in values.iter().enumerate() {
                proptest::prop_assert_eq!(store.read(i / 4, i % 4), v.max(1));
            }
        }
    }
}
