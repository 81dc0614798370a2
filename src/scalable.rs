//! Scalable Cuckoo Filter: an append-only sequence of [`CuckooFilter`]
//! sub-filters that grows without a fixed upper bound.
//!
//! A single cuckoo filter is sized once and its insert success rate drops
//! sharply near that limit. This wrapper keeps inserting into its newest
//! ("tail") sub-filter only until it reaches its target capacity, then
//! appends a new, larger sub-filter and routes further inserts there —
//! never pushing a tail into the regime where eviction is likely to fail.
//! Membership and removal walk the sequence newest-to-oldest, since an item
//! is always inserted into whichever sub-filter was the tail at the time.
//!
//! Every sub-filter shares one fingerprint width, computed once from the
//! filter's initial capacity and false-positive target (see the crate root
//! docs for why this cannot vary per sub-filter). Each sub-filter's bucket
//! count is sized for its own capacity alone.

use crate::common::validation::{
    validate_capacity, validate_fingerprint_bits, validate_probability, validate_scale_factor,
    validate_slots_per_bucket,
};
use crate::common::{FilterError, Result};
use crate::cuckoo::{fingerprint_bits_for, CuckooFilter, InsertOutcome, DEFAULT_MAX_KICKS};
use crate::input::{hash_input, Input};

/// Default growth multiplier applied to a sub-filter's capacity when a new
/// one is appended.
pub const DEFAULT_SCALE_FACTOR: u64 = 4;

/// Default per-generation tightening of the false-positive budget. This only
/// affects [`ScalableCuckooFilter::false_positive_probability`]'s bookkeeping
/// estimate: actual fingerprint width is fixed at construction, so tightening
/// the budget does not change how any sub-filter is sized.
pub const DEFAULT_TIGHTENING_RATIO: f64 = 0.9;

/// Default slots per bucket (matches the reference cuckoo-filter sizing).
pub const DEFAULT_SLOTS_PER_BUCKET: usize = 4;

/// Configuration for constructing a [`ScalableCuckooFilter`].
#[derive(Debug, Clone, Copy)]
pub struct Builder {
    initial_capacity: u64,
    initial_fpp: f64,
    slots_per_bucket: usize,
    scale_factor: u64,
    tightening_ratio: f64,
    max_kicks: usize,
}

impl Builder {
    /// Starts a builder for a filter with an initial capacity and
    /// false-positive probability target.
    pub fn new(initial_capacity: u64, initial_fpp: f64) -> Self {
        Builder {
            initial_capacity,
            initial_fpp,
            slots_per_bucket: DEFAULT_SLOTS_PER_BUCKET,
            scale_factor: DEFAULT_SCALE_FACTOR,
            tightening_ratio: DEFAULT_TIGHTENING_RATIO,
            max_kicks: DEFAULT_MAX_KICKS,
        }
    }

    /// Overrides the slots-per-bucket (default 4).
    pub fn slots_per_bucket(mut self, slots: usize) -> Self {
        self.slots_per_bucket = slots;
        self
    }

    /// Overrides the capacity growth multiplier applied on each new sub-filter (default 4).
    pub fn scale_factor(mut self, factor: u64) -> Self {
        self.scale_factor = factor;
        self
    }

    /// Overrides the per-generation false-positive tightening ratio (default 0.9).
    pub fn tightening_ratio(mut self, ratio: f64) -> Self {
        self.tightening_ratio = ratio;
        self
    }

    /// Overrides the eviction-kick ceiling per insert (default 500).
    pub fn max_kicks(mut self, kicks: usize) -> Self {
        self.max_kicks = kicks;
        self
    }

    /// Validates the configuration and constructs the filter.
    pub fn build(self) -> Result<ScalableCuckooFilter> {
        validate_capacity(self.initial_capacity)?;
        validate_probability(self.initial_fpp, "initial_fpp")?;
        validate_slots_per_bucket(self.slots_per_bucket)?;
        validate_scale_factor(self.scale_factor)?;
        validate_probability(self.tightening_ratio, "tightening_ratio")?;

        let fingerprint_bits = fingerprint_bits_for(self.initial_fpp, self.slots_per_bucket);
        validate_fingerprint_bits(fingerprint_bits)?;

        let tail = CuckooFilter::new(
            self.initial_capacity,
            fingerprint_bits,
            self.slots_per_bucket,
            self.max_kicks,
        );

        Ok(ScalableCuckooFilter {
            filters: vec![tail],
            initial_capacity: self.initial_capacity,
            initial_fpp: self.initial_fpp,
            fingerprint_bits,
            slots_per_bucket: self.slots_per_bucket,
            scale_factor: self.scale_factor,
            tightening_ratio: self.tightening_ratio,
            max_kicks: self.max_kicks,
        })
    }
}

/// An approximate-membership filter with no fixed capacity ceiling, zero
/// false negatives, and support for deletion.
#[derive(Debug, Clone)]
pub struct ScalableCuckooFilter {
    pub(crate) filters: Vec<CuckooFilter>,
    initial_capacity: u64,
    initial_fpp: f64,
    pub(crate) fingerprint_bits: u32,
    pub(crate) slots_per_bucket: usize,
    pub(crate) scale_factor: u64,
    tightening_ratio: f64,
    pub(crate) max_kicks: usize,
}

impl ScalableCuckooFilter {
    /// Creates a filter with the default growth policy (scale factor 4,
    /// tightening ratio 0.9, 4 slots per bucket).
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::InvalidParameter`] if `initial_capacity` is
    /// zero or absurdly large, or if `initial_fpp` is not in `(0.0, 1.0)`.
    pub fn new(initial_capacity: u64, initial_fpp: f64) -> Result<Self> {
        Builder::new(initial_capacity, initial_fpp).build()
    }

    /// Starts a [`Builder`] for non-default growth policy parameters.
    pub fn builder(initial_capacity: u64, initial_fpp: f64) -> Builder {
        Builder::new(initial_capacity, initial_fpp)
    }

    /// Reassembles a filter from already-decoded sub-filters and header
    /// fields. Used only by [`crate::codec::deserialize`]; the tightening
    /// ratio is not part of the wire format, so callers supply the default.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn from_parts(
        filters: Vec<CuckooFilter>,
        initial_capacity: u64,
        initial_fpp: f64,
        fingerprint_bits: u32,
        slots_per_bucket: usize,
        scale_factor: u64,
        tightening_ratio: f64,
        max_kicks: usize,
    ) -> Self {
        ScalableCuckooFilter {
            filters,
            initial_capacity,
            initial_fpp,
            fingerprint_bits,
            slots_per_bucket,
            scale_factor,
            tightening_ratio,
            max_kicks,
        }
    }

    /// Inserts `item`, growing by one sub-filter if the current tail has
    /// reached its target capacity.
    ///
    /// Growth is proactive: a new sub-filter is appended *before* the tail
    /// is asked to hold more items than it was sized for, so an insert is
    /// never routed through a tail that is already at the point where
    /// eviction is likely to fail. [`CuckooFilter::insert_hash`] is also
    /// non-destructive on failure (see its docs), so even the rare case of
    /// an unlucky eviction run below that threshold falls back to growing
    /// and retrying without losing the fingerprint it was carrying.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::GrowthInsertFailed`] only if a brand-new,
    /// empty sub-filter itself rejects the insert — a configuration problem
    /// (all `max_kicks` evictions exhausted on an otherwise-empty bucket
    /// array), never ordinary capacity pressure.
    pub fn insert(&mut self, item: &Input) -> Result<()> {
        let h = hash_input(item);
        loop {
            let tail_at_capacity = self
                .filters
                .last()
                .map(|f| f.len() >= f.capacity())
                .unwrap_or(true);
            if tail_at_capacity {
                self.grow();
            }

            let tail = self.filters.last_mut().expect("at least one sub-filter always exists");
            match tail.insert_hash(h) {
                InsertOutcome::Inserted => return Ok(()),
                InsertOutcome::Full => {
                    if tail.is_empty() {
                        return Err(FilterError::GrowthInsertFailed);
                    }
                    self.grow();
                }
            }
        }
    }

    fn grow(&mut self) {
        let next_capacity = self
            .filters
            .last()
            .map(|f| f.capacity() * self.scale_factor)
            .unwrap_or(self.initial_capacity);
        let new_filter = CuckooFilter::new(
            next_capacity,
            self.fingerprint_bits,
            self.slots_per_bucket,
            self.max_kicks,
        );
        self.filters.push(new_filter);
    }

    /// Checks whether `item` might have been inserted. Never false-negative:
    /// if `item` was inserted and never removed, this always returns `true`.
    pub fn might_contain(&self, item: &Input) -> bool {
        let h = hash_input(item);
        self.filters.iter().rev().any(|f| f.contains_hash(h))
    }

    /// Removes `item` if present, searching newest sub-filter first.
    /// Returns `true` if a matching fingerprint was found and cleared.
    pub fn remove(&mut self, item: &Input) -> bool {
        let h = hash_input(item);
        for f in self.filters.iter_mut().rev() {
            if f.remove_hash(h) {
                return true;
            }
        }
        false
    }

    /// Total number of items currently stored across all sub-filters.
    pub fn len(&self) -> u64 {
        self.filters.iter().map(CuckooFilter::len).sum()
    }

    /// True if no sub-filter holds any item.
    pub fn is_empty(&self) -> bool {
        self.filters.iter().all(CuckooFilter::is_empty)
    }

    /// Number of sub-filters currently in the sequence.
    pub fn generation_count(&self) -> usize {
        self.filters.len()
    }

    /// Returns the configured target false-positive probability of the
    /// first sub-filter (`initial_fpp`). This is the user-facing contract;
    /// it does not track how many generations have accumulated. The actual
    /// aggregate false-positive rate across all sub-filters is bounded
    /// above by `initial_fpp / (1 - tightening_ratio)` — see
    /// [`ScalableCuckooFilter::aggregate_false_positive_bound`].
    pub fn false_positive_probability(&self) -> f64 {
        self.initial_fpp
    }

    /// The geometric-series upper bound on the aggregate false-positive
    /// rate across every sub-filter created so far:
    /// `initial_fpp * (1 + r + r^2 + ...) = initial_fpp / (1 - r)`, where
    /// `r` is the tightening ratio. This does not feed back into any
    /// sub-filter's fingerprint width — see the crate root docs.
    pub fn aggregate_false_positive_bound(&self) -> f64 {
        self.initial_fpp / (1.0 - self.tightening_ratio)
    }

    /// Serializes this filter to the binary layout documented on
    /// [`crate::codec`].
    pub fn serialize(&self) -> Vec<u8> {
        crate::codec::serialize(self)
    }

    /// Reconstructs a filter from bytes produced by [`ScalableCuckooFilter::serialize`].
    pub fn deserialize(bytes: &[u8]) -> Result<Self> {
        crate::codec::deserialize(bytes)
    }

    /// Runs `item` through the canonicalizer and returns the exact bytes
    /// that get hashed. Exposed for test assertions comparing two items'
    /// canonical forms.
    pub fn debug_value(item: &Input) -> Vec<u8> {
        crate::input::canonicalize(item)
    }

    pub(crate) fn initial_capacity(&self) -> u64 {
        self.initial_capacity
    }

    pub(crate) fn initial_fpp(&self) -> f64 {
        self.initial_fpp
    }

    pub(crate) fn scale_factor(&self) -> u64 {
        self.scale_factor
    }

    pub(crate) fn tightening_ratio(&self) -> f64 {
        self.tightening_ratio
    }
}
