//! Copy-on-write array overlay.

use std::ops::RangeBounds;

use crate::encoder::{Element, EncodeError, Encodable, Encoder, Slot};
use crate::format::{ValueType, tag};
use crate::mutable::Overlay;
use crate::mutable::dict::Lookup;
use crate::reader::Value;

/// An ordered sequence opened from a document (or built from nothing) that
/// accumulates edits without touching the source bytes.
///
/// Unlike [`super::MutableDict`], which diffs lazily against its source, an
/// array overlay materializes every element into memory on construction —
/// insertion shifts indices, so there is no way to diff an insert against a
/// source position the way a dict can diff a keyed change.
pub struct MutableArray<'a> {
    items: Vec<Overlay<'a>>,
}

impl<'a> MutableArray<'a> {
    /// An empty array with no base.
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Materialize `value` (must be an array) into an editable overlay.
    ///
    /// Elements that fail to resolve (a truncated or malformed slot) are
    /// dropped rather than failing construction outright, since the caller
    /// already holds a `Value` that passed type checking to get here.
    pub fn from_value(value: Value<'a>) -> Self {
        let items = value
            .iter()
            .into_iter()
            .flatten()
            .filter_map(Result::ok)
            .map(Overlay::Reader)
            .collect();
        Self { items }
    }

    /// Build directly from an owned element list.
    pub fn from_elements(elements: Vec<Element>) -> Self {
        Self {
            items: elements.into_iter().map(Overlay::Owned).collect(),
        }
    }

    /// Open `doc`'s root (must be an array) for editing.
    pub fn from_document(doc: &'a crate::document::Document) -> Result<Self, crate::reader::ReadError> {
        Ok(Self::from_value(doc.root()?))
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether there are no elements.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Element at `index`, if any.
    pub fn get(&self, index: usize) -> Option<Lookup<'a, '_>> {
        self.items.get(index).map(overlay_to_lookup)
    }

    /// Replace the element at `index`. Panics if out of bounds, matching `Vec`.
    pub fn set(&mut self, index: usize, value: impl Into<Element>) {
        self.items[index] = Overlay::Owned(value.into());
    }

    /// Append an element.
    pub fn push(&mut self, value: impl Into<Element>) {
        self.items.push(Overlay::Owned(value.into()));
    }

    /// Remove and discard the last element, if any.
    pub fn pop(&mut self) {
        self.items.pop();
    }

    /// Replace `range` with `replacement`, like `Vec::splice`. Index stability
    /// across the call is not guaranteed, matching an in-memory `Vec`.
    pub fn splice(&mut self, range: impl RangeBounds<usize>, replacement: impl IntoIterator<Item = Element>) {
        self.items
            .splice(range, replacement.into_iter().map(Overlay::Owned))
            .for_each(drop);
    }

    /// Promote `index` to a nested dict overlay.
    pub fn get_mutable_dict(&mut self, index: usize) -> &mut super::MutableDict<'a> {
        if !matches!(self.items[index], Overlay::Dict(_)) {
            let current = std::mem::replace(&mut self.items[index], Overlay::Owned(Element::Null));
            let promoted = match current {
                Overlay::Reader(v) if v.value_type() == ValueType::Dict => super::MutableDict::from_value(v),
                Overlay::Owned(Element::Dict(map)) => super::MutableDict::from_element_map(map),
                _ => super::MutableDict::new(),
            };
            self.items[index] = Overlay::Dict(promoted);
        }
        match &mut self.items[index] {
            Overlay::Dict(dict) => dict,
            _ => unreachable!("just inserted a Dict overlay"),
        }
    }

    /// Promote `index` to a nested array overlay.
    pub fn get_mutable_array(&mut self, index: usize) -> &mut MutableArray<'a> {
        if !matches!(self.items[index], Overlay::Array(_)) {
            let current = std::mem::replace(&mut self.items[index], Overlay::Owned(Element::Null));
            let promoted = match current {
                Overlay::Reader(v) if v.value_type() == ValueType::Array => MutableArray::from_value(v),
                Overlay::Owned(Element::Array(items)) => MutableArray::from_elements(items),
                _ => MutableArray::new(),
            };
            self.items[index] = Overlay::Array(promoted);
        }
        match &mut self.items[index] {
            Overlay::Array(array) => array,
            _ => unreachable!("just inserted an Array overlay"),
        }
    }
}

impl Default for MutableArray<'_> {
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

impl Encodable for MutableArray<'_> {
    fn write(&self, encoder: &mut Encoder<'_>) -> Result<Slot, EncodeError> {
        let mut slots = Vec::with_capacity(self.items.len());
        for item in &self.items {
            let slot = match item {
                Overlay::Reader(v) => v.write(encoder)?,
                Overlay::Owned(e) => e.write(encoder)?,
                Overlay::Dict(d) => d.write(encoder)?,
                Overlay::Array(a) => a.write(encoder)?,
            };
            slots.push(slot);
        }
        Ok(encoder.write_collection(tag::ARRAY, slots))
    }
}
