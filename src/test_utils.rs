//! Shared test-only helpers: an `Element` generator for property tests.

use proptest::prelude::*;

use crate::encoder::Element;
use crate::format::{ValueType, tag};
use crate::reader::Value;

/// A strategy producing arbitrary `Element` trees, with bounded recursion so
/// `proptest` doesn't build unbounded structures.
pub(crate) fn element_strategy() -> impl Strategy<Item = Element> {
    let leaf = prop_oneof![
        Just(Element::Null),
        any::<bool>().prop_map(Element::from),
        any::<i64>().prop_map(Element::from),
        any::<f64>().prop_filter("finite", |f| f.is_finite()).prop_map(Element::from),
        ".{0,16}".prop_map(Element::from),
        prop::collection::vec(any::<u8>(), 0..16).prop_map(Element::from),
    ];

    leaf.prop_recursive(4, 64, 8, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..8).prop_map(Element::array),
            prop::collection::btree_map(".{1,8}", inner, 0..8).prop_map(Element::Dict),
        ]
    })
}

/// Walk a resolved `Value` back into an owned `Element`, for round-trip
/// comparison against the tree that produced it.
pub(crate) fn decode_to_element(value: Value<'_>) -> Element {
    match value.value_type() {
        ValueType::Null => Element::Null,
        ValueType::Bool => Element::Bool(value.as_bool().unwrap()),
        ValueType::Number => {
            if value.header_tag() == tag::FLOAT {
                Element::Float(value.as_f64().unwrap())
            } else {
                Element::Int(value.as_i64().unwrap())
            }
        }
        ValueType::String => Element::Str(value.as_str().unwrap().to_owned()),
        ValueType::Binary => Element::Bin(value.as_bytes().unwrap().to_vec()),
        ValueType::Array => Element::array(value.iter().unwrap().map(|v| decode_to_element(v.unwrap()))),
        ValueType::Dict => Element::dict(
            value
                .dict_iter()
                .unwrap()
                .map(|pair| pair.unwrap())
                .map(|(k, v)| (k.to_owned(), decode_to_element(v))),
        ),
    }
}
