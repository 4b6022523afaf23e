#![allow(clippy::cast_possible_truncation)] // Intentional for binary format parsing
#![allow(clippy::cast_possible_wrap)] // Intentional for binary operations
#![allow(clippy::cast_lossless)] // Sometimes clearer than From
#![allow(clippy::doc_markdown)] // Format-specific terms don't need backticks
#![allow(clippy::similar_names)] // Domain-specific naming patterns (prefix/suffix pairs)
#![allow(clippy::module_name_repetitions)] // Clear naming is preferred
//! A binary encoding for semi-structured values designed to be read without parsing.
//!
//! Navigation — indexing into arrays, looking up keys in dicts — dereferences relative
//! pointers directly inside the raw byte buffer, so a single deep lookup touches
//! O(depth·log n) bytes rather than the whole document. The format also supports
//! append-only delta updates: a modified tree is re-emitted as a short suffix whose
//! pointers reach back into the original buffer for unchanged subtrees, so
//! `base || delta` concatenation yields a valid document.
//!
//! # Modules
//!
//! - [`format`]: wire-level constants, tag layout, and the varint codec shared by
//!   the encoder and reader.
//! - [`encoder`]: serializes an owned [`encoder::Element`] tree (or a mix of owned
//!   values and borrowed [`reader::Value`] subtrees) bottom-up into a byte buffer.
//! - [`reader`]: zero-copy navigation of an encoded buffer via [`reader::Value`].
//! - [`mutable`]: copy-on-write overlays ([`mutable::MutableDict`],
//!   [`mutable::MutableArray`]) for editing a document without touching its bytes.
//!
//! # Example
//!
//! ```
//! use lazydoc::document::Document;
//! use lazydoc::encoder::Element;
//!
//! let value = Element::dict([
//!     ("a", Element::from(1i64)),
//!     ("b", Element::from(2i64)),
//! ]);
//! let doc = Document::standalone(&value).expect("encode");
//! let root = doc.root().expect("root");
//! assert_eq!(root.get_key("b").expect("lookup").as_i64().unwrap(), 2);
//! ```

#![warn(missing_docs)]

/// Owned document wrapper: a complete encoded buffer plus its root accessor.
pub mod document;
/// The encoder: serializes owned and borrowed values into the wire format.
pub mod encoder;
/// Wire-level constants, tag layout, and the shared varint codec.
pub mod format;
/// Copy-on-write mutation overlays over reader handles.
pub mod mutable;
/// Zero-copy reader: lazy navigation of an encoded buffer.
pub mod reader;

#[cfg(test)]
pub(crate) mod test_utils;

pub use document::Document;
pub use encoder::{EncodeError, Element, Encoder};
pub use reader::{ReadError, Value, ValueType};
