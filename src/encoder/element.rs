//! Owned value tree built up by callers before encoding.

use std::collections::BTreeMap;

/// An owned, caller-constructed value, the Rust stand-in for a dynamically
/// typed object literal.
///
/// `Element` has no behavior beyond construction: build one with the `From`
/// impls below or the [`Element::array`]/[`Element::dict`] constructors, then
/// hand it to [`crate::document::Document::standalone`] or
/// [`crate::encoder::Encoder::encode_value`].
#[derive(Debug, Clone, PartialEq)]
pub enum Element {
    /// `null`.
    Null,
    /// `true`/`false`.
    Bool(bool),
    /// A 64-bit signed integer.
    Int(i64),
    /// A floating-point number.
    Float(f64),
    /// A UTF-8 string.
    Str(String),
    /// Uninterpreted binary data.
    Bin(Vec<u8>),
    /// An ordered sequence of values.
    Array(Vec<Element>),
    /// A key/value mapping, stored sorted so encoding never needs to re-sort.
    Dict(BTreeMap<String, Element>),
}

impl Element {
    /// Build an array from any iterable of elements.
    pub fn array(items: impl IntoIterator<Item = Element>) -> Element {
        Element::Array(items.into_iter().collect())
    }

    /// Build a dict from any iterable of key/value pairs.
    pub fn dict<K: Into<String>>(entries: impl IntoIterator<Item = (K, Element)>) -> Element {
        Element::Dict(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

impl From<bool> for Element {
    fn from(value: bool) -> Self {
        Element::Bool(value)
    }
}

impl From<i64> for Element {
    fn from(value: i64) -> Self {
        Element::Int(value)
    }
}

impl From<i32> for Element {
    fn from(value: i32) -> Self {
        Element::Int(i64::from(value))
    }
}

impl From<u32> for Element {
    fn from(value: u32) -> Self {
        Element::Int(i64::from(value))
    }
}

impl From<f64> for Element {
    fn from(value: f64) -> Self {
        Element::Float(value)
    }
}

impl From<f32> for Element {
    fn from(value: f32) -> Self {
        Element::Float(f64::from(value))
    }
}

impl From<&str> for Element {
    fn from(value: &str) -> Self {
        Element::Str(value.to_owned())
    }
}

impl From<String> for Element {
    fn from(value: String) -> Self {
        Element::Str(value)
    }
}

impl From<Vec<u8>> for Element {
    fn from(value: Vec<u8>) -> Self {
        Element::Bin(value)
    }
}

impl From<&[u8]> for Element {
    fn from(value: &[u8]) -> Self {
        Element::Bin(value.to_vec())
    }
}
