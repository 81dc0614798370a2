//! Value-hashing bridge: turns a typed item into the stable byte sequence
//! that feeds the filter's hash function.
//!
//! # Algorithm Overview
//!
//! A host-language binding normally receives a dynamically-typed value (a
//! Python `int`, `str`, `list`, ...) and must decide how to turn it into
//! bytes before it can be hashed. Doing that type inspection is the binding's
//! job, not this crate's — see the crate root docs. What this module owns is
//! the other half of the contract: given an already-tagged [`Input`], produce
//! the exact byte sequence the rest of the filter hashes.
//!
//! # Canonicalization rules
//!
//! | Input variant | Encoding |
//! |---|---|
//! | `Bytes` | the bytes themselves |
//! | `Text` | UTF-8 bytes (identical to `Bytes` of the same content) |
//! | `Int` | little-endian two's complement, 8 bytes |
//! | `Bool` | a single byte, `0` or `1` |
//! | `Float` | IEEE-754 bits, little-endian, 8 bytes (NaN bit pattern preserved) |
//! | `Seq` | concatenation of each element's canonical encoding, no delimiter |
//!
//! `Text` and `Bytes` of the same content canonicalize identically, and lists
//! canonicalize the same as tuples of the same elements in the same order,
//! because both reduce to [`Input::Seq`] before encoding.
//!
//! # Examples
//!
//! ```
//! use scalable_cuckoo_filter::input::{canonicalize, Input};
//!
//! assert_eq!(canonicalize(&Input::Text("hi".into())), canonicalize(&Input::Bytes(b"hi".to_vec())));
//! assert_ne!(canonicalize(&Input::Bool(true)), canonicalize(&Input::Int(1)));
//! ```

/// A typed item, tagged by the host binding, ready to be canonicalized.
///
/// This is the statically-typed replacement for the duck-typed dispatch a
/// dynamically-typed host language would otherwise perform at the FFI
/// boundary: the binding shim inspects its own native value and constructs
/// the matching `Input` variant; this crate never inspects anything beyond
/// the variant tag itself.
#[derive(Debug, Clone, PartialEq)]
pub enum Input {
    /// Raw bytes.
    Bytes(Vec<u8>),
    /// UTF-8 text. Canonicalizes identically to `Bytes` of the same content.
    Text(String),
    /// A signed or unsigned integer, reduced to its 64-bit two's-complement
    /// bit pattern (an unsigned value's bits are identical once widened to
    /// 64 bits, so one variant covers both).
    Int(i64),
    /// A 64-bit floating point value. NaN's bit pattern is preserved exactly
    /// as given, so two NaNs with different payloads canonicalize differently.
    Float(f64),
    /// A boolean. Distinct from `Int` — `Bool(true)` never canonicalizes the
    /// same as `Int(1)`.
    Bool(bool),
    /// An ordered sequence of items (a list, a tuple, any iterable). Encoded
    /// as the concatenation of each element's canonical bytes, in order, with
    /// no delimiter — so a list and a tuple of the same elements canonicalize
    /// identically, and nested sequences flatten without markers.
    Seq(Vec<Input>),
}

impl Input {
    /// Convenience constructor for borrowed text, avoiding a `.to_string()` at call sites.
    pub fn text(s: impl Into<String>) -> Self {
        Input::Text(s.into())
    }

    /// Convenience constructor for borrowed bytes.
    pub fn bytes(b: impl Into<Vec<u8>>) -> Self {
        Input::Bytes(b.into())
    }
}

/// Converts an [`Input`] into the byte sequence the hasher consumes.
pub fn canonicalize(input: &Input) -> Vec<u8> {
    let mut out = Vec::new();
    canonicalize_into(input, &mut out);
    out
}

/// Canonicalizes `input` and feeds the result through the crate's hash function.
pub fn hash_input(input: &Input) -> u64 {
    crate::common::hash::digest(&canonicalize(input))
}

fn canonicalize_into(input: &Input, out: &mut Vec<u8>) {
    match input {
        Input::Bytes(b) => out.extend_from_slice(b),
        Input::Text(s) => out.extend_from_slice(s.as_bytes()),
        Input::Int(v) => out.extend_from_slice(&v.to_le_bytes()),
        Input::Float(v) => out.extend_from_slice(&v.to_bits().to_le_bytes()),
        Input::Bool(b) => out.push(if *b { 1 } else { 0 }),
        Input::Seq(items) => {
            for item in items {
                canonicalize_into(item, out);
            }
        }
    }
}
