//! Error types for filter operations

use std::fmt;

/// Errors that can occur while constructing, mutating, or (de)serializing a filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterError {
    /// Invalid parameter provided to a constructor or operation
    InvalidParameter {
        /// Parameter name
        param: String,
        /// Invalid value provided
        value: String,
        /// Constraint that was violated
        constraint: String,
    },

    /// The host binding could not map an item to a canonical `Input`.
    ///
    /// The core never constructs this variant itself: `Input` is an exhaustively
    /// matched enum, so every value the core ever sees is already canonicalizable.
    /// It exists so a host-language binding shim has somewhere to report a type it
    /// does not know how to translate.
    UnsupportedItem(String),

    /// Error during deserialization: truncated bytes, a bad version tag, or
    /// dimensions that cannot correspond to any valid filter.
    DeserializeInvalid(String),

    /// Error during the underlying file read/write.
    IoFailure(String),

    /// Insertion was rejected even by a brand-new, empty sub-filter.
    ///
    /// This indicates a configuration bug (fingerprint width too small for the
    /// requested false-positive probability, or a degenerate load factor) rather
    /// than ordinary capacity pressure, which is handled by growth.
    GrowthInsertFailed,
}

impl fmt::Display for FilterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterError::InvalidParameter {
                param,
                value,
                constraint,
            } => {
                write!(
                    f,
                    "Invalid parameter '{}': value '{}' {}",
                    param, value, constraint
                )
            }
            FilterError::UnsupportedItem(msg) => write!(f, "Unsupported item: {}", msg),
            FilterError::DeserializeInvalid(msg) => write!(f, "Deserialization error: {}", msg),
            FilterError::IoFailure(msg) => write!(f, "I/O error: {}", msg),
            FilterError::GrowthInsertFailed => write!(
                f,
                "a freshly created sub-filter rejected an insert; check fingerprint_bits and load factor"
            ),
        }
    }
}

impl std::error::Error for FilterError {}

impl From<std::io::Error> for FilterError {
    fn from(err: std::io::Error) -> Self {
        FilterError::IoFailure(err.to_string())
    }
}

/// Result type alias for filter operations
pub type Result<T> = std::result::Result<T, FilterError>;
