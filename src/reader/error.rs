//! Error type for reader operations.

use thiserror::Error;

use crate::format::ValueType;

/// Errors raised while navigating an encoded buffer.
///
/// Array-index-out-of-bounds and missing-dict-key are *not* represented here —
/// those are lookup misses and surface as `None`, distinguishable from a present
/// `null`.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReadError {
    /// A pointer's offset field was zero, which is never valid.
    #[error("pointer offset is zero at byte {at}")]
    ZeroOffset {
        /// Absolute position of the offending pointer slot.
        at: usize,
    },

    /// A pointer chain exceeded the cycle guard without reaching a concrete value.
    #[error("pointer chain exceeded {limit} hops (cycle or corrupt document)")]
    PointerChainTooLong {
        /// The configured hop limit.
        limit: u32,
    },

    /// A pointer's target position fell outside the buffer.
    #[error("pointer at byte {at} targets out-of-range offset {target}")]
    PointerOutOfRange {
        /// Absolute position of the offending pointer slot.
        at: usize,
        /// The computed (invalid) target position.
        target: i64,
    },

    /// A typed accessor (`as_i64`, `as_str`, ...) was called on a value of a
    /// different kind.
    #[error("expected {expected:?}, found {actual:?}")]
    WrongType {
        /// The kind the accessor requires.
        expected: ValueType,
        /// The kind actually found at this position.
        actual: ValueType,
    },

    /// A string payload was not valid UTF-8.
    #[error("string payload is not valid UTF-8")]
    InvalidUtf8,

    /// The buffer was too short to read a header, payload, or varint.
    #[error("buffer truncated at byte {at}")]
    Truncated {
        /// Absolute position at which a read ran past the end of the buffer.
        at: usize,
    },

    /// The buffer is too short to hold even a root slot (minimum 2 bytes).
    #[error("buffer too short to contain a root slot: {len} bytes")]
    BufferTooShort {
        /// Actual length of the buffer.
        len: usize,
    },
}
