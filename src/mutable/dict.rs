//! Copy-on-write dict overlay.

use std::collections::{BTreeMap, BTreeSet};

use crate::encoder::{Element, EncodeError, Encodable, Encoder, Slot};
use crate::format::{ValueType, tag};
use crate::mutable::Overlay;
use crate::reader::{ReadError, Value};

enum Change<'a> {
    Set(Overlay<'a>),
    Remove,
}

/// A key/value mapping opened from a document (or built from nothing) that
/// accumulates edits without touching the source bytes.
pub struct MutableDict<'a> {
    source: Option<Value<'a>>,
    changes: BTreeMap<String, Change<'a>>,
}

/// A borrowed view of one value in a [`MutableDict`]/[`MutableArray`]: either
/// untouched (`Reader`), freshly built (`Owned`), or a nested overlay.
pub enum Lookup<'a, 'm> {
    /// Unedited, still borrowing the source document.
    Reader(Value<'a>),
    /// Replaced wholesale.
    Owned(&'m Element),
    /// A nested dict overlay.
    Dict(&'m MutableDict<'a>),
    /// A nested array overlay.
    Array(&'m super::MutableArray<'a>),
}

impl<'a> MutableDict<'a> {
    /// An empty dict with no base: edits build a standalone document.
    pub fn new() -> Self {
        Self {
            source: None,
            changes: BTreeMap::new(),
        }
    }

    /// Open `value` (must be a dict) for editing.
    pub fn from_value(value: Value<'a>) -> Self {
        Self {
            source: Some(value),
            changes: BTreeMap::new(),
        }
    }

    /// Open `doc`'s root (must be a dict) for editing.
    pub fn from_document(doc: &'a crate::document::Document) -> Result<Self, ReadError> {
        Ok(Self::from_value(doc.root()?))
    }

    pub(crate) fn from_element_map(map: BTreeMap<String, Element>) -> Self {
        Self {
            source: None,
            changes: map
                .into_iter()
                .map(|(k, v)| (k, Change::Set(Overlay::Owned(v))))
                .collect(),
        }
    }

    /// Look up `key`, consulting in-memory edits first, then the source.
    pub fn get(&self, key: &str) -> Option<Lookup<'a, '_>> {
        if let Some(change) = self.changes.get(key) {
            return match change {
                Change::Remove => None,
                Change::Set(overlay) => Some(overlay_to_lookup(overlay)),
            };
        }
        self.source.and_then(|source| source.get_key(key)).map(Lookup::Reader)
    }

    /// Set `key` to a freshly built value, overwriting any prior edit.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Element>) {
        self.changes.insert(key.into(), Change::Set(Overlay::Owned(value.into())));
    }

    /// Mark `key` as removed, shadowing any value the source might have.
    pub fn remove(&mut self, key: impl Into<String>) {
        self.changes.insert(key.into(), Change::Remove);
    }

    /// All live keys: the source's keys plus edited keys, minus tombstones.
    pub fn keys(&self) -> Result<BTreeSet<String>, ReadError> {
        let mut out = BTreeSet::new();
        if let Some(source) = self.source {
            for entry in source.dict_iter()? {
                let (key, _) = entry?;
                out.insert(key.to_owned());
            }
        }
        for (key, change) in &self.changes {
            match change {
                Change::Remove => {
                    out.remove(key);
                }
                Change::Set(_) => {
                    out.insert(key.clone());
                }
            }
        }
        Ok(out)
    }

    /// Promote `key` to a nested dict overlay, seeding it from whatever is
    /// currently there (a dict reader handle, a dict `Element`, or nothing).
    /// Subsequent mutations through the returned overlay are picked up by a
    /// later `encode_value` call on `self`.
    pub fn get_mutable_dict(&mut self, key: &str) -> &mut MutableDict<'a> {
        if !matches!(self.changes.get(key), Some(Change::Set(Overlay::Dict(_)))) {
            let seed = self.take_current(key);
            let promoted = match seed {
                Overlay::Reader(v) if v.value_type() == ValueType::Dict => MutableDict::from_value(v),
                Overlay::Owned(Element::Dict(map)) => MutableDict::from_element_map(map),
                _ => MutableDict::new(),
            };
            self.changes.insert(key.to_owned(), Change::Set(Overlay::Dict(promoted)));
        }
        match self.changes.get_mut(key) {
            Some(Change::Set(Overlay::Dict(dict))) => dict,
            _ => unreachable!("just inserted a Dict overlay"),
        }
    }

    /// Promote `key` to a nested array overlay. See [`Self::get_mutable_dict`].
    pub fn get_mutable_array(&mut self, key: &str) -> &mut super::MutableArray<'a> {
        if !matches!(self.changes.get(key), Some(Change::Set(Overlay::Array(_)))) {
            let seed = self.take_current(key);
            let promoted = match seed {
                Overlay::Reader(v) if v.value_type() == ValueType::Array => super::MutableArray::from_value(v),
                Overlay::Owned(Element::Array(items)) => super::MutableArray::from_elements(items),
                _ => super::MutableArray::new(),
            };
            self.changes.insert(key.to_owned(), Change::Set(Overlay::Array(promoted)));
        }
        match self.changes.get_mut(key) {
            Some(Change::Set(Overlay::Array(array))) => array,
            _ => unreachable!("just inserted an Array overlay"),
        }
    }

    fn take_current(&mut self, key: &str) -> Overlay<'a> {
        if let Some(Change::Set(overlay)) = self.changes.remove(key) {
            return overlay;
        }
        if let Some(source) = self.source {
            if let Some(child) = source.get_key(key) {
                return Overlay::Reader(child);
            }
        }
        Overlay::Owned(Element::Null)
    }
}

impl Default for MutableDict<'_> {
    fn default() -> Self {
        Self::new()
    }
}

fn overlay_to_lookup<'a, 'm>(overlay: &'m Overlay<'a>) -> Lookup<'a, 'm> {
    match overlay {
        Overlay::Reader(v) => Lookup::Reader(*v),
        Overlay::Owned(e) => Lookup::Owned(e),
        Overlay::Dict(d) => Lookup::Dict(d),
        Overlay::Array(a) => Lookup::Array(a),
    }
}

impl Encodable for MutableDict<'_> {
    fn write(&self, encoder: &mut Encoder<'_>) -> Result<Slot, EncodeError> {
        let keys = self.keys().map_err(|_| EncodeError::UnsupportedValue)?;
        let mut slots = Vec::with_capacity(keys.len() * 2);
        for key in &keys {
            let value = self.get(key).expect("key came from keys()");
            slots.push(encoder.write_string(key)?);
            let value_slot = match value {
                Lookup::Reader(v) => v.write(encoder)?,
                Lookup::Owned(e) => e.write(encoder)?,
                Lookup::Dict(d) => d.write(encoder)?,
                Lookup::Array(a) => a.write(encoder)?,
            };
            slots.push(value_slot);
        }
        Ok(encoder.write_collection(tag::DICT, slots))
    }
}
