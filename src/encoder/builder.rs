//! Bottom-up buffer writer: string interning, slot finalization, narrow/wide
//! promotion, root finalization.

use std::collections::HashMap;

use crate::encoder::EncodeError;
use crate::encoder::element::Element;
use crate::format::{self, minimal_long_int_size, tag, varint::write_varint};

/// Where a written value ended up: either it fit inline in a slot, or it lives
/// at an absolute offset and needs a pointer.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Slot {
    /// A 2-byte payload small enough to store directly in any slot.
    Immediate([u8; 2]),
    /// A pointer to the value's header at this absolute offset.
    Pointer(u64),
}

/// Serializes values into a growing buffer, optionally atop an immutable base.
///
/// All positions the encoder records (string table entries, collection/number
/// offsets) are absolute positions in the *final concatenated document* —
/// `base_len + pos` — so pointers correctly reach into `base` when one is set.
pub struct Encoder<'a> {
    buf: Vec<u8>,
    string_table: HashMap<String, u64>,
    base: Option<&'a [u8]>,
}

impl<'a> Default for Encoder<'a> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> Encoder<'a> {
    /// A fresh encoder with no base buffer: `encode_value` produces a
    /// standalone document.
    pub fn new() -> Self {
        Self {
            buf: Vec::with_capacity(1024),
            string_table: HashMap::new(),
            base: None,
        }
    }

    /// A fresh encoder that will emit deltas against `base`.
    pub fn with_base(base: &'a [u8]) -> Self {
        let mut encoder = Self::new();
        encoder.set_base(base);
        encoder
    }

    /// Register `base` as the immutable prefix subsequent `encode_value`
    /// calls serialize deltas against.
    pub fn set_base(&mut self, base: &'a [u8]) {
        self.base = Some(base);
    }

    pub(crate) fn base(&self) -> Option<&'a [u8]> {
        self.base
    }

    fn base_len(&self) -> u64 {
        self.base.map_or(0, |b| b.len() as u64)
    }

    /// Absolute position the next byte written will land at.
    fn abs_pos(&self) -> u64 {
        self.base_len() + self.buf.len() as u64
    }

    fn pad_to_even(&mut self) {
        if self.abs_pos() % 2 != 0 {
            self.buf.push(0x00);
        }
    }

    /// Serialize `value` and finalize the root slot. Returns the bytes written
    /// by this pass only — concatenate after `base` (if any) to get a complete
    /// document.
    pub fn encode_value<E: super::Encodable>(&mut self, value: &E) -> Result<Vec<u8>, EncodeError> {
        let slot = value.write(self)?;
        self.finalize_root(slot);
        Ok(std::mem::take(&mut self.buf))
    }

    fn finalize_root(&mut self, slot: Slot) {
        self.pad_to_even();
        let root_pos = self.abs_pos();
        match slot {
            Slot::Immediate(bytes) => self.buf.extend_from_slice(&bytes),
            Slot::Pointer(target) => {
                let distance = root_pos - target;
                if distance > format::NARROW_POINTER_MAX_BYTES {
                    let wide_pos = root_pos;
                    self.buf.extend_from_slice(&finalize_pointer_wide(wide_pos, target));
                    let narrow_pos = self.abs_pos();
                    self.buf
                        .extend_from_slice(&finalize_pointer_narrow(narrow_pos, wide_pos));
                    tracing::debug!(indirection = true, "finalized root slot");
                } else {
                    self.buf.extend_from_slice(&finalize_pointer_narrow(root_pos, target));
                    tracing::debug!(indirection = false, "finalized root slot");
                }
            }
        }
    }

    pub(crate) fn write_element(&mut self, element: &Element) -> Result<Slot, EncodeError> {
        match element {
            Element::Null => Ok(Slot::Immediate([0x30, 0x00])),
            Element::Bool(false) => Ok(Slot::Immediate([0x34, 0x00])),
            Element::Bool(true) => Ok(Slot::Immediate([0x38, 0x00])),
            Element::Int(value) => self.write_int(*value),
            Element::Float(value) => Ok(self.write_float(*value)),
            Element::Str(value) => self.write_string(value),
            Element::Bin(value) => Ok(self.write_binary(value)),
            Element::Array(items) => {
                let mut slots = Vec::with_capacity(items.len());
                for item in items {
                    slots.push(self.write_element(item)?);
                }
                Ok(self.write_collection(tag::ARRAY, slots))
            }
            Element::Dict(entries) => {
                let mut slots = Vec::with_capacity(entries.len() * 2);
                for (key, value) in entries {
                    slots.push(self.write_string(key)?);
                    slots.push(self.write_element(value)?);
                }
                Ok(self.write_collection(tag::DICT, slots))
            }
        }
    }

    pub(crate) fn write_int(&mut self, value: i64) -> Result<Slot, EncodeError> {
        if (-2048..=2047).contains(&value) {
            let field = (value as i16 as u16) & 0x0FFF;
            let b0 = (tag::SMALL_INT << 4) | ((field >> 8) as u8);
            let b1 = (field & 0xFF) as u8;
            return Ok(Slot::Immediate([b0, b1]));
        }
        self.pad_to_even();
        let header_pos = self.abs_pos();
        let size = minimal_long_int_size(value);
        let b0 = (tag::LONG_INT << 4) | (size - 1);
        self.buf.push(b0);
        self.buf.extend_from_slice(&value.to_le_bytes()[..size as usize]);
        Ok(Slot::Pointer(header_pos))
    }

    pub(crate) fn write_float(&mut self, value: f64) -> Slot {
        self.pad_to_even();
        let header_pos = self.abs_pos();
        let b0 = (tag::FLOAT << 4) | (1 << 3);
        self.buf.push(b0);
        self.buf.push(0x00);
        self.buf.extend_from_slice(&value.to_le_bytes());
        Slot::Pointer(header_pos)
    }

    pub(crate) fn write_string(&mut self, value: &str) -> Result<Slot, EncodeError> {
        if let Some(&offset) = self.string_table.get(value) {
            tracing::trace!(value, offset, "string intern cache hit");
            return Ok(Slot::Pointer(offset));
        }
        self.pad_to_even();
        let header_pos = self.abs_pos();
        self.write_length_prefixed(tag::STRING, value.as_bytes());
        self.string_table.insert(value.to_owned(), header_pos);
        Ok(Slot::Pointer(header_pos))
    }

    pub(crate) fn write_binary(&mut self, value: &[u8]) -> Slot {
        self.pad_to_even();
        let header_pos = self.abs_pos();
        self.write_length_prefixed(tag::BINARY, value);
        Slot::Pointer(header_pos)
    }

    fn write_length_prefixed(&mut self, value_tag: u8, bytes: &[u8]) {
        let len = bytes.len();
        if len <= format::NIBBLE_COUNT_MAX as usize {
            self.buf.push((value_tag << 4) | (len as u8));
        } else {
            self.buf.push((value_tag << 4) | format::NIBBLE_COUNT_OVERFLOW);
            write_varint(&mut self.buf, len as u64);
        }
        self.buf.extend_from_slice(bytes);
    }

    fn collection_header_len(count: usize) -> u64 {
        if (count as u64) < u64::from(format::WIDE_COUNT_OVERFLOW) {
            2
        } else {
            let mut probe = Vec::new();
            write_varint(&mut probe, count as u64);
            let raw = 2 + probe.len();
            if probe.len() % 2 == 1 { raw as u64 + 1 } else { raw as u64 }
        }
    }

    pub(crate) fn write_collection(&mut self, value_tag: u8, slots: Vec<Slot>) -> Slot {
        self.pad_to_even();
        let header_pos = self.abs_pos();
        let count = slots.len();
        let data_pos = header_pos + Self::collection_header_len(count);

        let mut wide = false;
        let mut widest = 0u64;
        for (index, slot) in slots.iter().enumerate() {
            if let Slot::Pointer(target) = slot {
                let slot_pos = data_pos + (index as u64) * 2;
                let distance = slot_pos - target;
                widest = widest.max(distance);
                if distance > format::NARROW_POINTER_MAX_BYTES {
                    wide = true;
                }
            }
        }

        let slot_size: u64 = if wide { 4 } else { 2 };
        let count_field: u16 = if (count as u64) < u64::from(format::WIDE_COUNT_OVERFLOW) {
            count as u16
        } else {
            format::WIDE_COUNT_OVERFLOW
        };
        let b0 = (value_tag << 4) | (u8::from(wide) << 3) | ((count_field >> 8) as u8 & 0x07);
        let b1 = (count_field & 0xFF) as u8;
        self.buf.push(b0);
        self.buf.push(b1);
        if count_field == format::WIDE_COUNT_OVERFLOW {
            write_varint(&mut self.buf, count as u64);
        }
        self.pad_to_even();
        debug_assert_eq!(self.abs_pos(), data_pos);

        tracing::debug!(tag = value_tag, count, wide, widest, "finalizing collection");

        for (index, slot) in slots.into_iter().enumerate() {
            let slot_pos = data_pos + (index as u64) * slot_size;
            debug_assert_eq!(self.abs_pos(), slot_pos);
            self.emit_slot(slot, slot_pos, wide);
        }

        Slot::Pointer(header_pos)
    }

    fn emit_slot(&mut self, slot: Slot, slot_pos: u64, wide: bool) {
        match slot {
            Slot::Immediate(bytes) => {
                if wide {
                    // The value lives in the low half of a wide slot; see
                    // `Value::resolve`'s matching `+2` on the read side.
                    self.buf.extend_from_slice(&[0x00, 0x00]);
                }
                self.buf.extend_from_slice(&bytes);
            }
            Slot::Pointer(target) => {
                if wide {
                    self.buf.extend_from_slice(&finalize_pointer_wide(slot_pos, target));
                } else {
                    self.buf.extend_from_slice(&finalize_pointer_narrow(slot_pos, target));
                }
            }
        }
    }
}

fn finalize_pointer_narrow(slot_pos: u64, target: u64) -> [u8; 2] {
    let offset_units = (slot_pos - target) / 2;
    (0x8000u16 | (offset_units as u16 & 0x7FFF)).to_be_bytes()
}

fn finalize_pointer_wide(slot_pos: u64, target: u64) -> [u8; 4] {
    let offset_units = (slot_pos - target) / 2;
    (0x8000_0000u32 | (offset_units as u32 & 0x7FFF_FFFF)).to_be_bytes()
}
