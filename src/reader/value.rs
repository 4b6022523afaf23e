//! The reader handle: pointer resolution and primitive extraction.

use crate::format::{
    self, POINTER_BIT, ValueType, read_long_int_signed, read_long_int_unsigned, sign_extend_12,
    special, tag,
    varint::read_varint,
};
use crate::reader::ReadError;

/// Cap on pointer-chain hops before a document is considered cyclic/corrupt.
pub(crate) const MAX_POINTER_HOPS: u32 = 100;

/// A lazy, borrowed view over one value inside an encoded buffer.
///
/// Constructing a `Value` resolves any pointer chain at the given position, so
/// by the time you hold one its `pos` always addresses a concrete value header.
/// `Value` is `Copy`: it is just a slice reference and a position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Value<'a> {
    pub(crate) buf: &'a [u8],
    pub(crate) pos: usize,
}

/// Header fields shared by arrays and dicts.
pub(crate) struct CollectionHeader {
    pub(crate) wide: bool,
    pub(crate) count: usize,
    pub(crate) data_pos: usize,
}

impl<'a> Value<'a> {
    /// Resolve a handle at `pos`, chasing pointers until a concrete value is
    /// found. `wide` tells the first hop (if any) whether `pos` holds a 2-byte
    /// or 4-byte slot; every subsequent hop is narrow, since a pointer's target
    /// is always a concrete value, never another slot (the one exception, the
    /// root's double indirection, is handled separately in
    /// [`crate::reader::resolve_root`]).
    pub(crate) fn resolve(buf: &'a [u8], mut pos: usize, mut wide: bool) -> Result<Self, ReadError> {
        let mut hops = 0u32;
        loop {
            let b0 = *buf.get(pos).ok_or(ReadError::Truncated { at: pos })?;
            if b0 & POINTER_BIT == 0 {
                if wide {
                    // Immediate wide slot: the 2-byte value lives in the low half.
                    pos = pos.checked_add(2).ok_or(ReadError::Truncated { at: pos })?;
                }
                return Ok(Value { buf, pos });
            }

            hops += 1;
            if hops > MAX_POINTER_HOPS {
                return Err(ReadError::PointerChainTooLong {
                    limit: MAX_POINTER_HOPS,
                });
            }

            let offset_units = if wide {
                read_u31(buf, pos)?
            } else {
                read_u15(buf, pos)?
            };
            if offset_units == 0 {
                return Err(ReadError::ZeroOffset { at: pos });
            }
            let byte_offset = offset_units * 2;
            let target = pos as i64 - byte_offset as i64;
            tracing::trace!(from = pos, to = target, wide, "resolving pointer");
            if target < 0 {
                return Err(ReadError::PointerOutOfRange { at: pos, target });
            }
            pos = target as usize;
            wide = false;
        }
    }

    fn byte(&self, rel_offset: usize) -> Result<u8, ReadError> {
        self.buf
            .get(self.pos + rel_offset)
            .copied()
            .ok_or(ReadError::Truncated {
                at: self.pos + rel_offset,
            })
    }

    fn slice(&self, rel_offset: usize, len: usize) -> Result<&'a [u8], ReadError> {
        let start = self.pos + rel_offset;
        let end = start.checked_add(len).ok_or(ReadError::Truncated { at: start })?;
        self.buf
            .get(start..end)
            .ok_or(ReadError::Truncated { at: start })
    }

    pub(crate) fn header_tag(&self) -> u8 {
        self.buf[self.pos] >> 4
    }

    fn wrong_type(&self, expected: ValueType) -> ReadError {
        ReadError::WrongType {
            expected,
            actual: self.value_type(),
        }
    }

    /// This value's high-level kind.
    pub fn value_type(&self) -> ValueType {
        match self.header_tag() {
            tag::SMALL_INT | tag::LONG_INT | tag::FLOAT => ValueType::Number,
            tag::SPECIAL => {
                let ss = (self.buf[self.pos] >> 2) & 0x3;
                if ss == special::NULL {
                    ValueType::Null
                } else {
                    ValueType::Bool
                }
            }
            tag::STRING => ValueType::String,
            tag::BINARY => ValueType::Binary,
            tag::ARRAY => ValueType::Array,
            tag::DICT => ValueType::Dict,
            t => unreachable!("resolved value carries pointer tag {t:#x}"),
        }
    }

    /// Whether this value is `null`.
    pub fn is_null(&self) -> bool {
        self.value_type() == ValueType::Null
    }

    /// Extract a `bool`, failing if this value isn't `true`/`false`.
    pub fn as_bool(&self) -> Result<bool, ReadError> {
        if self.header_tag() != tag::SPECIAL {
            return Err(self.wrong_type(ValueType::Bool));
        }
        match (self.buf[self.pos] >> 2) & 0x3 {
            special::FALSE => Ok(false),
            special::TRUE => Ok(true),
            _ => Err(self.wrong_type(ValueType::Bool)),
        }
    }

    /// The `unsigned` flag and payload bytes of a long-int value.
    pub(crate) fn long_int_parts(&self) -> Result<(bool, &'a [u8]), ReadError> {
        if self.header_tag() != tag::LONG_INT {
            return Err(self.wrong_type(ValueType::Number));
        }
        let b0 = self.buf[self.pos];
        let unsigned = (b0 >> 3) & 1 == 1;
        let size = ((b0 & 0x07) + 1) as usize;
        Ok((unsigned, self.slice(1, size)?))
    }

    /// Extract a signed 64-bit integer from a small-int or long-int value.
    pub fn as_i64(&self) -> Result<i64, ReadError> {
        match self.header_tag() {
            tag::SMALL_INT => {
                let b1 = self.byte(1)?;
                let field = (u16::from(self.buf[self.pos] & 0x0F) << 8) | u16::from(b1);
                Ok(sign_extend_12(field))
            }
            tag::LONG_INT => {
                let (unsigned, payload) = self.long_int_parts()?;
                if unsigned {
                    // Interop-only: accept documents with unsigned long-ints that
                    // don't fit signed range by wrapping, matching the "accept
                    // more than we emit" convention used for 4-byte floats.
                    Ok(read_long_int_unsigned(payload) as i64)
                } else {
                    Ok(read_long_int_signed(payload))
                }
            }
            _ => Err(self.wrong_type(ValueType::Number)),
        }
    }

    /// Extract an unsigned 64-bit integer from a small-int or long-int value.
    pub fn as_u64(&self) -> Result<u64, ReadError> {
        match self.header_tag() {
            tag::SMALL_INT => Ok(self.as_i64()? as u64),
            tag::LONG_INT => {
                let (unsigned, payload) = self.long_int_parts()?;
                if unsigned {
                    Ok(read_long_int_unsigned(payload))
                } else {
                    Ok(read_long_int_signed(payload) as u64)
                }
            }
            _ => Err(self.wrong_type(ValueType::Number)),
        }
    }

    /// Extract a floating-point value. Accepts both the 4-byte and 8-byte
    /// payload forms on read, even though this crate's encoder only emits the
    /// 8-byte form.
    pub fn as_f64(&self) -> Result<f64, ReadError> {
        if self.header_tag() != tag::FLOAT {
            return Err(self.wrong_type(ValueType::Number));
        }
        let wide_float = (self.buf[self.pos] >> 3) & 1 == 1;
        if wide_float {
            let bytes = self.slice(2, 8)?;
            Ok(f64::from_le_bytes(bytes.try_into().expect("8 bytes")))
        } else {
            let bytes = self.slice(2, 4)?;
            Ok(f64::from(f32::from_le_bytes(bytes.try_into().expect("4 bytes"))))
        }
    }

    fn string_like_payload(&self, expected_tag: u8, expected: ValueType) -> Result<&'a [u8], ReadError> {
        if self.header_tag() != expected_tag {
            return Err(self.wrong_type(expected));
        }
        let nibble = self.buf[self.pos] & 0x0F;
        if nibble < format::NIBBLE_COUNT_OVERFLOW {
            self.slice(1, nibble as usize)
        } else {
            let (len, varint_len) = read_varint(self.buf, self.pos + 1)?;
            self.slice(1 + varint_len, len as usize)
        }
    }

    /// Extract a UTF-8 string slice, zero-copy.
    pub fn as_str(&self) -> Result<&'a str, ReadError> {
        let bytes = self.string_like_payload(tag::STRING, ValueType::String)?;
        std::str::from_utf8(bytes).map_err(|_| ReadError::InvalidUtf8)
    }

    /// Extract a binary payload, zero-copy.
    pub fn as_bytes(&self) -> Result<&'a [u8], ReadError> {
        self.string_like_payload(tag::BINARY, ValueType::Binary)
    }

    pub(crate) fn collection_header(&self, expected_tag: u8) -> Result<CollectionHeader, ReadError> {
        let expected = if expected_tag == tag::ARRAY {
            ValueType::Array
        } else {
            ValueType::Dict
        };
        if self.header_tag() != expected_tag {
            return Err(self.wrong_type(expected));
        }
        let b0 = self.buf[self.pos];
        let b1 = self.byte(1)?;
        let wide = (b0 >> 3) & 1 == 1;
        let count_field = (u16::from(b0 & 0x07) << 8) | u16::from(b1);
        if count_field < format::WIDE_COUNT_OVERFLOW {
            Ok(CollectionHeader {
                wide,
                count: count_field as usize,
                data_pos: self.pos + 2,
            })
        } else {
            let (count, varint_len) = read_varint(self.buf, self.pos + 2)?;
            let raw_data_pos = self.pos + 2 + varint_len;
            let data_pos = if varint_len % 2 == 1 { raw_data_pos + 1 } else { raw_data_pos };
            Ok(CollectionHeader {
                wide,
                count: count as usize,
                data_pos,
            })
        }
    }
}

pub(crate) fn read_u15(buf: &[u8], pos: usize) -> Result<u64, ReadError> {
    let b0 = *buf.get(pos).ok_or(ReadError::Truncated { at: pos })?;
    let b1 = *buf.get(pos + 1).ok_or(ReadError::Truncated { at: pos + 1 })?;
    Ok(u64::from(u16::from_be_bytes([b0, b1]) & 0x7FFF))
}

pub(crate) fn read_u31(buf: &[u8], pos: usize) -> Result<u64, ReadError> {
    let bytes = buf.get(pos..pos + 4).ok_or(ReadError::Truncated { at: pos })?;
    let raw = u32::from_be_bytes(bytes.try_into().expect("4 bytes"));
    Ok(u64::from(raw & 0x7FFF_FFFF))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pointer_chain_past_the_hop_limit_is_rejected() {
        // Every 2-byte slot is a narrow pointer to its immediate predecessor;
        // resolving from the last one chases strictly decreasing positions,
        // never terminating at a concrete value within the hop limit.
        let slots = (MAX_POINTER_HOPS as usize) + 20;
        let mut buf = vec![0u8; slots * 2];
        for i in 1..slots {
            buf[i * 2] = 0x80;
            buf[i * 2 + 1] = 0x01;
        }
        let start = (slots - 1) * 2;
        assert_eq!(
            Value::resolve(&buf, start, false).unwrap_err(),
            ReadError::PointerChainTooLong { limit: MAX_POINTER_HOPS }
        );
    }
}
