//! Copy-on-write mutation overlays over reader handles.
//!
//! A [`MutableDict`]/[`MutableArray`] never touches the bytes of the document
//! it was opened from; it accumulates edits in memory against an
//! [`Encodable`](crate::encoder::Encodable) [`Overlay`] for each child, and is
//! consumed by [`crate::encoder::Encoder::encode_value`] to produce a delta
//! that reuses unchanged subtrees as base-buffer pointers.

mod array;
mod dict;

pub use array::MutableArray;
pub use dict::{Lookup, MutableDict};

use crate::encoder::Element;
use crate::reader::Value;

/// A child slot in a mutable overlay: either untouched (still a reader
/// handle), freshly built from scratch, or itself promoted to a nested
/// mutable overlay.
pub(crate) enum Overlay<'a> {
    /// Unedited: still borrows the original document.
    Reader(Value<'a>),
    /// Replaced wholesale with a freshly built value.
    Owned(Element),
    /// Promoted to a nested dict overlay via `get_mutable_dict`.
    Dict(MutableDict<'a>),
    /// Promoted to a nested array overlay via `get_mutable_array`.
    Array(MutableArray<'a>),
}
