//! The `Encodable` trait: the single code path the plain [`Element`] tree and
//! the mutation layer's overlays both write through.

use crate::encoder::builder::{Encoder, Slot};
use crate::encoder::element::Element;
use crate::encoder::error::EncodeError;
use crate::format::{ValueType, read_long_int_signed, read_long_int_unsigned, tag};
use crate::reader::Value;

/// Anything the encoder knows how to serialize.
///
/// There are exactly two implementations: `&Element` writes a freshly
/// constructed value tree, and `Value<'_>` writes a handle borrowed from an
/// existing buffer — reusing a base-buffer pointer when possible instead of
/// copying.
pub(crate) trait Encodable {
    fn write(&self, encoder: &mut Encoder<'_>) -> Result<Slot, EncodeError>;
}

impl Encodable for &Element {
    fn write(&self, encoder: &mut Encoder<'_>) -> Result<Slot, EncodeError> {
        encoder.write_element(self)
    }
}

impl Encodable for Element {
    fn write(&self, encoder: &mut Encoder<'_>) -> Result<Slot, EncodeError> {
        encoder.write_element(self)
    }
}

impl<'v> Encodable for Value<'v> {
    fn write(&self, encoder: &mut Encoder<'_>) -> Result<Slot, EncodeError> {
        if let Some(base) = encoder.base() {
            if std::ptr::eq(self.buf.as_ptr(), base.as_ptr()) && self.buf.len() == base.len() {
                // Same backing buffer as the registered base: reuse the
                // existing bytes with a pointer rather than recursing.
                return Ok(Slot::Pointer(self.pos as u64));
            }
        }
        write_structural_copy(encoder, *self)
    }
}

/// Re-serialize a reader handle into `encoder`'s own buffer, walking it the
/// same way a caller would through the public accessors. Used when a `Value`
/// doesn't point into the registered base (or no base is registered), so it
/// can't be reused as a back-pointer.
fn write_structural_copy(encoder: &mut Encoder<'_>, value: Value<'_>) -> Result<Slot, EncodeError> {
    match value.value_type() {
        ValueType::Null => Ok(Slot::Immediate([0x30, 0x00])),
        ValueType::Bool => {
            let b = value.as_bool().map_err(|_| EncodeError::UnsupportedValue)?;
            Ok(Slot::Immediate(if b { [0x38, 0x00] } else { [0x34, 0x00] }))
        }
        ValueType::Number => {
            if value.header_tag() == tag::FLOAT {
                let f = value.as_f64().map_err(|_| EncodeError::UnsupportedValue)?;
                Ok(encoder.write_float(f))
            } else if value.header_tag() == tag::SMALL_INT {
                let signed = value.as_i64().map_err(|_| EncodeError::UnsupportedValue)?;
                encoder.write_int(signed)
            } else {
                let (unsigned, payload) = value.long_int_parts().map_err(|_| EncodeError::UnsupportedValue)?;
                let signed = if unsigned {
                    let magnitude = read_long_int_unsigned(payload);
                    i64::try_from(magnitude).map_err(|_| EncodeError::IntegerOutOfRange { value: magnitude })?
                } else {
                    read_long_int_signed(payload)
                };
                encoder.write_int(signed)
            }
        }
        ValueType::String => {
            let s = value.as_str().map_err(|_| EncodeError::UnsupportedValue)?;
            encoder.write_string(s)
        }
        ValueType::Binary => {
            let b = value.as_bytes().map_err(|_| EncodeError::UnsupportedValue)?;
            Ok(encoder.write_binary(b))
        }
        ValueType::Array => {
            let items = value.iter().map_err(|_| EncodeError::UnsupportedValue)?;
            let mut slots = Vec::with_capacity(value.len().unwrap_or(0));
            for item in items {
                let item = item.map_err(|_| EncodeError::UnsupportedValue)?;
                slots.push(write_structural_copy(encoder, item)?);
            }
            Ok(encoder.write_collection(tag::ARRAY, slots))
        }
        ValueType::Dict => {
            let entries = value.dict_iter().map_err(|_| EncodeError::UnsupportedValue)?;
            let mut slots = Vec::new();
            for entry in entries {
                let (key, val) = entry.map_err(|_| EncodeError::UnsupportedValue)?;
                slots.push(encoder.write_string(key)?);
                slots.push(write_structural_copy(encoder, val)?);
            }
            Ok(encoder.write_collection(tag::DICT, slots))
        }
    }
}
