//! Dict navigation: sorted key/value pairs, looked up by binary search.

use std::cmp::Ordering;

use crate::format::tag;
use crate::reader::value::Value;
use crate::reader::ReadError;

impl<'a> Value<'a> {
    /// Number of key/value pairs, if this value is a dict.
    pub fn dict_len(&self) -> Result<usize, ReadError> {
        Ok(self.collection_header(tag::DICT)?.count)
    }

    /// Look up `key` by binary search over the sorted key slots.
    ///
    /// Returns `None` if the key is absent *or* the document is malformed at
    /// this position — a missing key and a broken pointer are both "nothing to
    /// hand back" from the caller's point of view.
    pub fn get_key(&self, key: &str) -> Option<Value<'a>> {
        let header = self.collection_header(tag::DICT).ok()?;
        let slot_size = if header.wide { 4 } else { 2 };
        let entry_stride = slot_size * 2;

        let mut lo = 0i64;
        let mut hi = header.count as i64 - 1;
        let mut probes = 0u32;
        while lo <= hi {
            probes += 1;
            let mid = lo + (hi - lo) / 2;
            let key_slot_pos = header.data_pos + (mid as usize) * entry_stride;
            let key_value = Value::resolve(self.buf, key_slot_pos, header.wide).ok()?;
            let probe_key = key_value.as_str().ok()?;
            match probe_key.cmp(key) {
                Ordering::Equal => {
                    let value_slot_pos = key_slot_pos + slot_size;
                    let found = Value::resolve(self.buf, value_slot_pos, header.wide).ok();
                    tracing::debug!(key, probes, hit = true, "dict lookup");
                    return found;
                }
                Ordering::Less => lo = mid + 1,
                Ordering::Greater => hi = mid - 1,
            }
        }
        tracing::debug!(key, probes, hit = false, "dict lookup");
        None
    }

    /// Iterate over `(key, value)` pairs in sorted key order.
    pub fn dict_iter(&self) -> Result<DictIter<'a>, ReadError> {
        let header = self.collection_header(tag::DICT)?;
        Ok(DictIter {
            buf: self.buf,
            wide: header.wide,
            slot_size: if header.wide { 4 } else { 2 },
            data_pos: header.data_pos,
            count: header.count,
            index: 0,
        })
    }

    /// Iterate over keys only, in sorted order.
    pub fn keys(&self) -> Result<impl Iterator<Item = Result<&'a str, ReadError>>, ReadError> {
        Ok(self.dict_iter()?.map(|pair| pair.map(|(k, _)| k)))
    }
}

/// Iterator over a dict's `(key, value)` pairs, yielded by [`Value::dict_iter`].
pub struct DictIter<'a> {
    buf: &'a [u8],
    wide: bool,
    slot_size: usize,
    data_pos: usize,
    count: usize,
    index: usize,
}

impl<'a> Iterator for DictIter<'a> {
    type Item = Result<(&'a str, Value<'a>), ReadError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.index >= self.count {
            return None;
        }
        let entry_stride = self.slot_size * 2;
        let key_slot_pos = self.data_pos + self.index * entry_stride;
        self.index += 1;

        let result = (|| {
            let key_value = Value::resolve(self.buf, key_slot_pos, self.wide)?;
            let key = key_value.as_str()?;
            let value_slot_pos = key_slot_pos + self.slot_size;
            let value = Value::resolve(self.buf, value_slot_pos, self.wide)?;
            Ok((key, value))
        })();
        Some(result)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.count - self.index;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for DictIter<'_> {}
