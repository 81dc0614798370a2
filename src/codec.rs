//! Deterministic little-endian binary format for [`ScalableCuckooFilter`].
//!
//! The format has no endianness negotiation and no version beyond a fixed
//! `version_tag`: every field is written in the exact order and width below,
//! and a future incompatible change would bump `VERSION_TAG` rather than add
//! a branch to this decoder.
//!
//! ```text
//! u64  version_tag             = 1
//! u64  fingerprint_bits        (F)
//! u64  slots_per_bucket        (S)
//! u64  max_kicks
//! u64  filter_count            (K)
//! for each of K filters:
//!   u64   capacity             (N_i)
//!   bytes bucket_store         (B_i * S * F bits, zero-padded to whole bytes)
//!   u64   size                 (nonzero-slot count)
//! u64   initial_capacity       N0
//! f64   initial_fpp            (IEEE-754 little-endian)
//! u64   scale_factor
//! u64   tail_index             = K - 1
//! ```
//!
//! `B_i` (the bucket count of sub-filter `i`) is never stored: it is
//! re-derived from `N_i`, the shared `S`, and the fixed load factor, so the
//! same sizing formula must run identically on encode and decode or the
//! byte layout and the decode cursor disagree.
//!
//! The tightening ratio is deliberately absent from the wire format (see
//! §6.2 of the design notes): it is bookkeeping for the aggregate
//! false-positive estimate, not filter state, so a deserialized filter
//! always resumes with [`crate::scalable::DEFAULT_TIGHTENING_RATIO`].

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use crate::common::validation::{validate_byte_size, validate_min_size};
use crate::common::{FilterError, Result};
use crate::cuckoo::{bucket_count_for, CuckooFilter, DEFAULT_LOAD_FACTOR};
use crate::scalable::{ScalableCuckooFilter, DEFAULT_TIGHTENING_RATIO};
use crate::store::BucketStore;

const VERSION_TAG: u64 = 1;

/// Serializes `filter` into the exact byte layout documented on this module.
pub fn serialize(filter: &ScalableCuckooFilter) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(&VERSION_TAG.to_le_bytes());
    out.extend_from_slice(&(filter.fingerprint_bits as u64).to_le_bytes());
    out.extend_from_slice(&(filter.slots_per_bucket as u64).to_le_bytes());
    out.extend_from_slice(&(filter.max_kicks as u64).to_le_bytes());
    out.extend_from_slice(&(filter.filters.len() as u64).to_le_bytes());

    for f in &filter.filters {
        out.extend_from_slice(&f.capacity().to_le_bytes());
        out.extend_from_slice(f.store().as_bytes());
        out.extend_from_slice(&f.len().to_le_bytes());
    }

    out.extend_from_slice(&filter.initial_capacity().to_le_bytes());
    out.extend_from_slice(&filter.initial_fpp().to_le_bytes());
    out.extend_from_slice(&filter.scale_factor().to_le_bytes());
    let tail_index = filter.filters.len() as u64 - 1;
    out.extend_from_slice(&tail_index.to_le_bytes());

    out
}

/// Reconstructs a [`ScalableCuckooFilter`] from bytes produced by [`serialize`].
///
/// # Errors
///
/// Returns [`FilterError::DeserializeInvalid`] on truncated input, an
/// unrecognized `version_tag`, or dimensions that cannot correspond to any
/// valid filter (zero filters, or a bucket-store length inconsistent with
/// its declared capacity).
pub fn deserialize(bytes: &[u8]) -> Result<ScalableCuckooFilter> {
    validate_byte_size(bytes.len())?;
    let mut cursor = Cursor::new(bytes);

    let version_tag = cursor.read_u64()?;
    if version_tag != VERSION_TAG {
        return Err(FilterError::DeserializeInvalid(format!(
            "unrecognized version_tag {version_tag}, expected {VERSION_TAG}"
        )));
    }

    let fingerprint_bits = cursor.read_u64()? as u32;
    let slots_per_bucket = cursor.read_u64()? as usize;
    let max_kicks = cursor.read_u64()? as usize;
    let filter_count = cursor.read_u64()? as usize;

    if filter_count == 0 {
        return Err(FilterError::DeserializeInvalid(
            "filter_count must be at least 1".to_string(),
        ));
    }

    let mut filters = Vec::with_capacity(filter_count);
    for _ in 0..filter_count {
        let capacity = cursor.read_u64()?;
        let bucket_count = bucket_count_for(capacity, slots_per_bucket, DEFAULT_LOAD_FACTOR);
        let total_bits = bucket_count * slots_per_bucket * fingerprint_bits as usize;
        let byte_len = total_bits.div_ceil(8);
        let store_bytes = cursor.read_bytes(byte_len)?;
        let store = BucketStore::from_bytes(store_bytes, bucket_count, slots_per_bucket, fingerprint_bits);
        let size = cursor.read_u64()?;
        filters.push(CuckooFilter::from_parts(
            store,
            capacity,
            size,
            fingerprint_bits,
            slots_per_bucket,
            max_kicks,
        ));
    }

    let initial_capacity = cursor.read_u64()?;
    let initial_fpp = cursor.read_f64()?;
    let scale_factor = cursor.read_u64()?;
    let tail_index = cursor.read_u64()? as usize;

    if tail_index != filter_count - 1 {
        return Err(FilterError::DeserializeInvalid(format!(
            "tail_index {tail_index} inconsistent with filter_count {filter_count}"
        )));
    }

    Ok(ScalableCuckooFilter::from_parts(
        filters,
        initial_capacity,
        initial_fpp,
        fingerprint_bits,
        slots_per_bucket,
        scale_factor,
        DEFAULT_TIGHTENING_RATIO,
        max_kicks,
    ))
}

/// Writes `filter`'s serialized form to `path`, truncating any existing file.
pub fn write_to_file(filter: &ScalableCuckooFilter, path: impl AsRef<Path>) -> Result<()> {
    let mut file = File::create(path)?;
    file.write_all(&serialize(filter))?;
    Ok(())
}

/// Reads and deserializes a filter previously written with [`write_to_file`].
pub fn read_from_file(path: impl AsRef<Path>) -> Result<ScalableCuckooFilter> {
    let mut file = File::open(path)?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes)?;
    deserialize(&bytes)
}

struct Cursor<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Cursor { bytes, pos: 0 }
    }

    fn read_bytes(&mut self, len: usize) -> Result<&'a [u8]> {
        validate_min_size(self.bytes.len() - self.pos, len)?;
        let slice = &self.bytes[self.pos..self.pos + len];
        self.pos += len;
        Ok(slice)
    }

    fn read_u64(&mut self) -> Result<u64> {
        let slice = self.read_bytes(8)?;
        Ok(u64::from_le_bytes(slice.try_into().expect("read_bytes(8) yields 8 bytes")))
    }

    fn read_f64(&mut self) -> Result<f64> {
        let slice = self.read_bytes(8)?;
        Ok(f64::from_le_bytes(slice.try_into().expect("read_bytes(8) yields 8 bytes")))
    }
}
