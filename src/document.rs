//! Owned wrapper around a complete encoded buffer.

use crate::encoder::{EncodeError, Encodable, Encoder};
use crate::reader::{ReadError, Value, resolve_root};

/// A complete, owned, encoded document: a byte buffer plus the entry point
/// into the reader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    bytes: Vec<u8>,
}

impl Document {
    /// One-shot encode with no base buffer.
    pub fn standalone<E: Encodable>(value: &E) -> Result<Document, EncodeError> {
        let bytes = Encoder::new().encode_value(value)?;
        Ok(Document { bytes })
    }

    /// Wrap an already-encoded buffer. The buffer's validity is checked
    /// lazily, the first time [`Document::root`] is called.
    pub fn from_bytes(bytes: Vec<u8>) -> Document {
        Document { bytes }
    }

    /// The encoded bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Consume the document, returning the encoded bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// Resolve the root value.
    pub fn root(&self) -> Result<Value<'_>, ReadError> {
        resolve_root(&self.bytes)
    }

    /// Encode `value` as a delta suffix against this document, without
    /// modifying it. Concatenate the returned bytes after
    /// [`Document::as_bytes`] to get the updated document.
    pub fn delta<E: Encodable>(&self, value: &E) -> Result<Vec<u8>, EncodeError> {
        Encoder::with_base(&self.bytes).encode_value(value)
    }

    /// Encode `value` as a delta suffix and append it in place.
    pub fn extend_with_delta<E: Encodable>(&mut self, value: &E) -> Result<(), EncodeError> {
        let suffix = self.delta(value)?;
        self.bytes.extend_from_slice(&suffix);
        Ok(())
    }
}
