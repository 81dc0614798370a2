//! scalable-cuckoo-filter: an approximate-membership filter that grows without bound
//!
//! A [`cuckoo::CuckooFilter`] is fast and deletable but, unlike a Bloom
//! filter, must be sized up front: once its buckets fill, further inserts
//! are rejected outright rather than degrading gracefully. This crate wraps
//! a growing sequence of cuckoo filters — a "scalable cuckoo filter" — so
//! callers get a filter with no fixed capacity ceiling while keeping the
//! cuckoo filter's two advantages over Bloom filters: bounded false-positive
//! rate with much less memory per item at the same false-positive target,
//! and support for deletion.
//!
//! # Algorithm Overview
//!
//! Items are inserted into the newest ("tail") sub-filter. When the tail
//! reports itself full, a new sub-filter is appended with capacity scaled
//! up by a fixed factor (default 4x), and the insert retries there.
//! Membership and removal both search sub-filters newest-to-oldest. Because
//! no sub-filter is ever resized in place and removal never crosses a
//! fingerprint from one sub-filter into another, deletion remains exact:
//! removing an item that was inserted and never removed always succeeds.
//!
//! # Comparison
//!
//! | | Bloom filter | Cuckoo filter | Scalable cuckoo filter |
//! |---|---|---|---|
//! | Deletion | no | yes | yes |
//! | Fixed capacity | no (degrades past load) | yes (rejects past load) | no |
//! | False negatives | never | never | never |
//! | Space per item at fixed FPP | baseline | less | less, plus bookkeeping overhead per generation |
//!
//! # Time/Space Complexity
//!
//! Insert and lookup are O(1) amortized in the number of sub-filters, since
//! new generations are rare relative to total inserts (geometric capacity
//! growth). Space is O(n) in the number of items stored, within a constant
//! factor set by the target false-positive probability.
//!
//! # Examples
//!
//! ```
//! use scalable_cuckoo_filter::{Input, ScalableCuckooFilter};
//!
//! let mut filter = ScalableCuckooFilter::new(1000, 0.01).unwrap();
//! filter.insert(&Input::text("hello")).unwrap();
//! assert!(filter.might_contain(&Input::text("hello")));
//! assert!(!filter.might_contain(&Input::text("goodbye")));
//! assert!(filter.remove(&Input::text("hello")));
//! assert!(!filter.might_contain(&Input::text("hello")));
//! ```
//!
//! # References
//!
//! - Fan, Andersen, Kaminsky, Mitzenmacher. "Cuckoo Filter: Practically
//!   Better Than Bloom" (CoNEXT 2014).

#![warn(missing_docs)]

pub mod codec;
pub mod common;
pub mod cuckoo;
pub mod input;
pub mod scalable;
pub mod store;

pub use common::{FilterError, Result};
pub use input::Input;
pub use scalable::ScalableCuckooFilter;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequence_equivalence_across_host_shapes() {
        let mut filter = ScalableCuckooFilter::new(1000, 0.01).unwrap();
        let list = Input::Seq(vec![Input::Int(1), Input::Int(2), Input::Int(3)]);
        filter.insert(&list).unwrap();
        let tuple_equivalent = Input::Seq(vec![Input::Int(1), Input::Int(2), Input::Int(3)]);
        assert!(filter.might_contain(&tuple_equivalent));
    }

    #[test]
    fn grows_past_single_generation_under_heavy_load() {
        let mut filter = ScalableCuckooFilter::new(100, 0.01).unwrap();
        for i in 0..100_000i64 {
            filter.insert(&Input::Int(i)).unwrap();
        }
        assert!(filter.generation_count() > 1);
        for i in 0..100_000i64 {
            assert!(filter.might_contain(&Input::Int(i)), "false negative for {i}");
        }
    }

    #[test]
    fn float_nan_edge_cases_do_not_collide_with_zero() {
        let mut filter = ScalableCuckooFilter::new(100, 0.01).unwrap();
        filter.insert(&Input::Float(f64::NAN)).unwrap();
        assert!(filter.might_contain(&Input::Float(f64::NAN)));
        assert!(!filter.might_contain(&Input::Float(0.0)));
    }

    #[test]
    fn write_and_read_round_trip_through_a_file() {
        let dir = std::env::temp_dir();
        let path = dir.join(format!(
            "scalable-cuckoo-filter-test-{:?}.bin",
            std::thread::current().id()
        ));
        let mut filter = ScalableCuckooFilter::new(100, 0.01).unwrap();
        filter.insert(&Input::text("hello")).unwrap();
        codec::write_to_file(&filter, &path).unwrap();
        let restored = codec::read_from_file(&path).unwrap();
        assert!(restored.might_contain(&Input::text("hello")));
        std::fs::remove_file(&path).ok();
    }
}
