//! Cuckoo Filter: space-efficient membership with deletions (Fan et al. 2014)
//!
//! Each item is hashed to a fingerprint and two candidate buckets. Insertion
//! places the fingerprint in either candidate bucket if one has room;
//! otherwise it evicts a random occupant and relocates it to its own
//! alternate bucket, repeating up to `max_kicks` times. Deletion removes a
//! matching fingerprint; membership checks both candidate buckets.
//!
//! Unlike a fixed-width `u16`-per-slot layout, fingerprints here are packed
//! bit-tight into a [`BucketStore`] so the filter can be sized for any
//! fingerprint width from 1 to 32 bits, as the false-positive probability
//! demands (see [`fingerprint_bits_for`] and [`bucket_count_for`]).
//!
//! # Time Complexity
//!
//! - Insert: O(1) amortized
//! - Delete: O(1)
//! - Query: O(1)
//!
//! # References
//!
//! - Fan et al. "Cuckoo Filter: Practically Better Than Bloom" (2014)

use crate::common::hash::digest;
use crate::store::BucketStore;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// Minimum load factor headroom the sizing formula assumes for a 4-slot bucket.
pub const DEFAULT_LOAD_FACTOR: f64 = 0.95;

/// Fixed eviction-attempt ceiling before an insert is reported as rejected.
pub const DEFAULT_MAX_KICKS: usize = 500;

/// Computes the fingerprint bit width for a target false-positive probability
/// `fpp` and `slots_per_bucket` slots: `ceil(log2(1/fpp) + log2(2*slots_per_bucket))`.
pub fn fingerprint_bits_for(fpp: f64, slots_per_bucket: usize) -> u32 {
    let bits = (1.0 / fpp).log2() + (2.0 * slots_per_bucket as f64).log2();
    bits.ceil() as u32
}

/// Computes the smallest power-of-two bucket count that can hold `capacity`
/// items at `slots_per_bucket` slots/bucket and `load_factor` target fill.
pub fn bucket_count_for(capacity: u64, slots_per_bucket: usize, load_factor: f64) -> usize {
    let raw = (capacity as f64) / (slots_per_bucket as f64 * load_factor);
    (raw.ceil() as usize).max(1).next_power_of_two()
}

/// Outcome of an internal eviction attempt. Never surfaced to callers of
/// [`crate::ScalableCuckooFilter`]: a `Full` result there triggers growth.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum InsertOutcome {
    Inserted,
    Full,
}

/// A single cuckoo filter: fixed bucket count, fixed fingerprint width.
#[derive(Clone, Debug)]
pub struct CuckooFilter {
    store: BucketStore,
    capacity: u64,
    size: u64,
    fingerprint_bits: u32,
    slots_per_bucket: usize,
    bucket_count: usize,
    max_kicks: usize,
    rng: SmallRng,
}

impl CuckooFilter {
    /// Creates a new, empty cuckoo filter sized for `capacity` items with a
    /// `fingerprint_bits`-wide fingerprint shared across the whole scalable
    /// sequence (see the crate root docs on why fingerprint width is fixed
    /// once and not re-derived per sub-filter). Seeded nondeterministically
    /// from OS entropy.
    pub fn new(capacity: u64, fingerprint_bits: u32, slots_per_bucket: usize, max_kicks: usize) -> Self {
        let bucket_count = bucket_count_for(capacity, slots_per_bucket, DEFAULT_LOAD_FACTOR);
        CuckooFilter {
            store: BucketStore::new(bucket_count, slots_per_bucket, fingerprint_bits),
            capacity,
            size: 0,
            fingerprint_bits,
            slots_per_bucket,
            bucket_count,
            max_kicks,
            rng: SmallRng::from_os_rng(),
        }
    }

    /// Same as [`CuckooFilter::new`] but with an explicit eviction-PRNG seed,
    /// for reproducible tests.
    pub fn with_seed(
        capacity: u64,
        fingerprint_bits: u32,
        slots_per_bucket: usize,
        max_kicks: usize,
        seed: u64,
    ) -> Self {
        let bucket_count = bucket_count_for(capacity, slots_per_bucket, DEFAULT_LOAD_FACTOR);
        CuckooFilter {
            store: BucketStore::new(bucket_count, slots_per_bucket, fingerprint_bits),
            capacity,
            size: 0,
            fingerprint_bits,
            slots_per_bucket,
            bucket_count,
            max_kicks,
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    /// Reconstructs a filter from its serialized bucket store. The PRNG is
    /// re-seeded from OS entropy since eviction randomness is not part of
    /// the wire format.
    pub(crate) fn from_parts(
        store: BucketStore,
        capacity: u64,
        size: u64,
        fingerprint_bits: u32,
        slots_per_bucket: usize,
        max_kicks: usize,
    ) -> Self {
        let bucket_count = store.bucket_count();
        CuckooFilter {
            store,
            capacity,
            size,
            fingerprint_bits,
            slots_per_bucket,
            bucket_count,
            max_kicks,
            rng: SmallRng::from_os_rng(),
        }
    }

    /// Number of items currently stored.
    pub fn len(&self) -> u64 {
        self.size
    }

    /// True if no items are stored.
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Target item count this filter was sized for.
    pub fn capacity(&self) -> u64 {
        self.capacity
    }

    pub(crate) fn store(&self) -> &BucketStore {
        &self.store
    }

    pub(crate) fn fingerprint_bits(&self) -> u32 {
        self.fingerprint_bits
    }

    pub(crate) fn slots_per_bucket(&self) -> usize {
        self.slots_per_bucket
    }

    pub(crate) fn max_kicks(&self) -> usize {
        self.max_kicks
    }

    fn fingerprint(&self, h: u64) -> u32 {
        let modulus = (1u64 << self.fingerprint_bits) - 1;
        1 + (h % modulus) as u32
    }

    fn primary_index(&self, h: u64) -> usize {
        ((h >> 32) as usize) & (self.bucket_count - 1)
    }

    fn alt_index(&self, idx: usize, fingerprint: u32) -> usize {
        let fp_hash = digest(&fingerprint.to_le_bytes());
        (idx ^ (fp_hash as usize)) & (self.bucket_count - 1)
    }

    fn candidate_indices(&self, h: u64, fingerprint: u32) -> (usize, usize) {
        let i1 = self.primary_index(h);
        let i2 = self.alt_index(i1, fingerprint);
        (i1, i2)
    }

    /// Inserts the already-canonicalized and hashed `item_hash`. On
    /// [`InsertOutcome::Full`] the store is left byte-for-byte as it was
    /// before the call: a rejected insert never evicts an item it then
    /// fails to relocate.
    pub(crate) fn insert_hash(&mut self, item_hash: u64) -> InsertOutcome {
        let fp = self.fingerprint(item_hash);
        let (i1, i2) = self.candidate_indices(item_hash, fp);

        if let Some(slot) = self.store.empty_slot(i1) {
            self.store.write(i1, slot, fp);
            self.size += 1;
            return InsertOutcome::Inserted;
        }
        if let Some(slot) = self.store.empty_slot(i2) {
            self.store.write(i2, slot, fp);
            self.size += 1;
            return InsertOutcome::Inserted;
        }

        let mut current_fp = fp;
        let mut current_idx = if self.rng.random::<bool>() { i1 } else { i2 };
        // Every kick overwrites a slot that held a real, already-inserted
        // fingerprint; record what it held so a failed eviction run can be
        // undone rather than silently dropping that item.
        let mut swaps: Vec<(usize, usize, u32)> = Vec::new();

        for _ in 0..self.max_kicks {
            let victim_slot = self.rng.random_range(0..self.slots_per_bucket);
            let victim_fp = self.store.read(current_idx, victim_slot);
            swaps.push((current_idx, victim_slot, victim_fp));
            self.store.write(current_idx, victim_slot, current_fp);
            current_fp = victim_fp;
            current_idx = self.alt_index(current_idx, current_fp);

            if let Some(slot) = self.store.empty_slot(current_idx) {
                self.store.write(current_idx, slot, current_fp);
                self.size += 1;
                return InsertOutcome::Inserted;
            }
        }

        // max_kicks exhausted with no home found for the displaced
        // fingerprint: undo every swap in reverse so the store ends up
        // exactly as it started. A failed insert must never cost the
        // caller an item that was already present.
        for (idx, slot, prior_fp) in swaps.into_iter().rev() {
            self.store.write(idx, slot, prior_fp);
        }
        InsertOutcome::Full
    }

    /// Checks whether `item_hash` (the hash of an already-canonicalized item)
    /// might be present.
    pub(crate) fn contains_hash(&self, item_hash: u64) -> bool {
        let fp = self.fingerprint(item_hash);
        let (i1, i2) = self.candidate_indices(item_hash, fp);
        self.store.find_in(i1, fp).is_some() || self.store.find_in(i2, fp).is_some()
    }

    /// Removes a matching fingerprint for `item_hash`, if present. Clears the
    /// match in the primary bucket if present in both.
    pub(crate) fn remove_hash(&mut self, item_hash: u64) -> bool {
        let fp = self.fingerprint(item_hash);
        let (i1, i2) = self.candidate_indices(item_hash, fp);
        if let Some(slot) = self.store.find_in(i1, fp) {
            self.store.write(i1, slot, 0);
            self.size -= 1;
            return true;
        }
        if let Some(slot) = self.store.find_in(i2, fp) {
            self.store.write(i2, slot, 0);
            self.size -= 1;
            return true;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filter(capacity: u64, fpp: f64) -> CuckooFilter {
        let f = fingerprint_bits_for(fpp, 4);
        CuckooFilter::with_seed(capacity, f, 4, DEFAULT_MAX_KICKS, 42)
    }

    #[test]
    fn sizing_formula_matches_fan_et_al() {
        // ceil(log2(1/0.01) + log2(8)) = ceil(6.6439 + 3) = 10
        assert_eq!(fingerprint_bits_for(0.01, 4), 10);
    }

    #[test]
    fn bucket_count_is_power_of_two() {
        assert!(bucket_count_for(100, 4, 0.95).is_power_of_two());
        assert!(bucket_count_for(1, 4, 0.95).is_power_of_two());
    }

    #[test]
    fn insert_then_contains() {
        let mut f = filter(100, 0.01);
        let h = digest(b"hello");
        assert!(!f.contains_hash(h));
        assert_eq!(f.insert_hash(h), InsertOutcome::Inserted);
        assert!(f.contains_hash(h));
        assert_eq!(f.len(), 1);
    }

    #[test]
    fn remove_clears_membership() {
        let mut f = filter(100, 0.01);
        let h = digest(b"hello");
        f.insert_hash(h);
        assert!(f.remove_hash(h));
        assert!(!f.contains_hash(h));
        assert!(!f.remove_hash(h));
    }

    #[test]
    fn many_inserts_all_found() {
        let mut f = filter(2000, 0.01);
        let hashes: Vec<u64> = (0..1500u64).map(|i| digest(&i.to_le_bytes())).collect();
        for &h in &hashes {
            loop {
                match f.insert_hash(h) {
                    InsertOutcome::Inserted => break,
                    InsertOutcome::Full => panic!("filter rejected insert before nominal capacity"),
                }
            }
        }
        for &h in &hashes {
            assert!(f.contains_hash(h));
        }
        assert_eq!(f.len(), 1500);
    }

    #[test]
    fn eventually_reports_full() {
        let mut f = CuckooFilter::with_seed(16, 8, 4, 50, 7);
        let mut inserted = 0u64;
        for i in 0..10_000u64 {
            match f.insert_hash(digest(&i.to_le_bytes())) {
                InsertOutcome::Inserted => inserted += 1,
                InsertOutcome::Full => {
                    assert!(inserted > 0);
                    return;
                }
            }
        }
        panic!("expected a tiny 16-bucket filter to eventually report Full");
    }

    #[test]
    fn a_rejected_insert_does_not_evict_any_existing_item() {
        let mut f = CuckooFilter::with_seed(16, 8, 4, 50, 7);
        let mut hashes = Vec::new();
        loop {
            let h = digest(&(hashes.len() as u64).to_le_bytes());
            match f.insert_hash(h) {
                InsertOutcome::Inserted => hashes.push(h),
                InsertOutcome::Full => break,
            }
        }
        let size_before = f.len();
        for &h in &hashes {
            assert!(f.contains_hash(h), "rejected insert discarded an existing item");
        }
        assert_eq!(f.len(), size_before);
    }
}
