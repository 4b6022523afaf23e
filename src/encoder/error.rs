//! Error type for encoder operations.

use thiserror::Error;

/// Errors raised while serializing a value tree.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EncodeError {
    /// A value kind reached the encoder that it has no wire representation for.
    ///
    /// Unreachable through [`crate::encoder::Element`]'s closed variant set; kept
    /// as a defensive case for the internal `Encodable` trait, which a future
    /// value source could implement incompletely.
    #[error("value kind has no wire representation")]
    UnsupportedValue,

    /// A long-int value read from a borrowed [`crate::reader::Value`] carries
    /// an unsigned magnitude past `i64::MAX`, which this crate's write side
    /// (always signed long-ints) has no encoding for.
    #[error("integer magnitude {value} does not fit the signed 64-bit long-int range")]
    IntegerOutOfRange {
        /// The unsigned magnitude that didn't fit.
        value: u64,
    },
}
