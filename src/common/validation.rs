//! Validation utilities for constructor arguments and deserialization bounds checking

use crate::common::{FilterError, Result};

/// Maximum capacity for any filter (2^31 - 1, ~2.1 billion items)
pub const MAX_CAPACITY: u64 = (1u64 << 31) - 1;

/// Maximum serialized filter size (256MB) to prevent resource exhaustion
pub const MAX_BYTE_SIZE: usize = 256 * 1024 * 1024;

/// Validate that capacity is positive and within limits
pub fn validate_capacity(capacity: u64) -> Result<()> {
    if capacity == 0 {
        return Err(FilterError::InvalidParameter {
            param: "initial_capacity".to_string(),
            value: capacity.to_string(),
            constraint: "must be greater than 0".to_string(),
        });
    }
    if capacity > MAX_CAPACITY {
        return Err(FilterError::InvalidParameter {
            param: "initial_capacity".to_string(),
            value: capacity.to_string(),
            constraint: format!("must not exceed {}", MAX_CAPACITY),
        });
    }
    Ok(())
}

/// Validate that a value is a valid probability (0.0 < p < 1.0)
/// Used for the false-positive probability and the tightening ratio.
pub fn validate_probability(value: f64, param_name: &str) -> Result<()> {
    if !(value > 0.0 && value < 1.0) {
        return Err(FilterError::InvalidParameter {
            param: param_name.to_string(),
            value: value.to_string(),
            constraint: "must be in range (0.0, 1.0) (exclusive)".to_string(),
        });
    }
    Ok(())
}

/// Validate the fingerprint bit width (1..=32, per the bucket-store word size)
pub fn validate_fingerprint_bits(bits: u32) -> Result<()> {
    if !(1..=32).contains(&bits) {
        return Err(FilterError::InvalidParameter {
            param: "fingerprint_bits".to_string(),
            value: bits.to_string(),
            constraint: "must be in range [1, 32]".to_string(),
        });
    }
    Ok(())
}

/// Validate the number of slots per bucket
pub fn validate_slots_per_bucket(slots: usize) -> Result<()> {
    if slots == 0 {
        return Err(FilterError::InvalidParameter {
            param: "slots_per_bucket".to_string(),
            value: slots.to_string(),
            constraint: "must be greater than 0".to_string(),
        });
    }
    Ok(())
}

/// Validate the scale factor used to grow the scalable filter's capacity
pub fn validate_scale_factor(scale_factor: u64) -> Result<()> {
    if scale_factor < 2 {
        return Err(FilterError::InvalidParameter {
            param: "scale_factor".to_string(),
            value: scale_factor.to_string(),
            constraint: "must be >= 2".to_string(),
        });
    }
    Ok(())
}

/// Validate minimum required bytes for a deserialization header
pub fn validate_min_size(actual: usize, required: usize) -> Result<()> {
    if actual < required {
        return Err(FilterError::DeserializeInvalid(format!(
            "Insufficient data: need at least {} bytes, got {}",
            required, actual
        )));
    }
    Ok(())
}

/// Validate that a deserialized filter's claimed size doesn't exceed safety limits
pub fn validate_byte_size(size: usize) -> Result<()> {
    if size > MAX_BYTE_SIZE {
        return Err(FilterError::DeserializeInvalid(format!(
            "Deserialized filter size {} exceeds maximum allowed size {}",
            size, MAX_BYTE_SIZE
        )));
    }
    Ok(())
}
