//! End-to-end tests against the public API: the concrete worked scenarios a
//! document-format implementation is expected to get right.

use lazydoc::document::Document;
use lazydoc::encoder::Element;
use lazydoc::mutable::MutableDict;
use lazydoc::reader::ReadError;
use lazydoc::reader::ValueType;
use pretty_assertions::assert_eq;

#[test]
fn null_root_is_the_two_byte_fixture() {
    let doc = Document::standalone(&Element::Null).unwrap();
    let bytes = doc.as_bytes();
    assert_eq!(&bytes[bytes.len() - 2..], &[0x30, 0x00]);
    assert!(doc.root().unwrap().is_null());
}

#[test]
fn small_negative_int_round_trips() {
    let doc = Document::standalone(&Element::from(-1i64)).unwrap();
    assert_eq!(doc.root().unwrap().as_i64().unwrap(), -1);
}

#[test]
fn two_entry_dict_has_narrow_slots_and_random_access() {
    let value = Element::dict([("a", Element::from(1i64)), ("b", Element::from(2i64))]);
    let doc = Document::standalone(&value).unwrap();

    let root = doc.root().unwrap();
    assert_eq!(root.dict_len().unwrap(), 2);
    assert_eq!(root.get_key("a").unwrap().as_i64().unwrap(), 1);
    assert_eq!(root.get_key("b").unwrap().as_i64().unwrap(), 2);
    assert!(root.get_key("c").is_none());
}

#[test]
fn repeated_array_strings_reuse_one_payload() {
    let value = Element::array(["foo", "foo", "foo"].map(Element::from));
    let doc = Document::standalone(&value).unwrap();
    let root = doc.root().unwrap();

    assert_eq!(root.len().unwrap(), 3);
    for item in root.iter().unwrap() {
        assert_eq!(item.unwrap().as_str().unwrap(), "foo");
    }
    // header(2) + 3 narrow slots(6) + string header/payload(4) + root slot(2)
    assert!(doc.as_bytes().len() <= 2 + 3 * 2 + 1 + 3 + 2);
}

#[test]
fn nested_dicts_chain_to_a_leaf_array_element() {
    let value = Element::dict([(
        "level1",
        Element::dict([(
            "level2",
            Element::dict([("level3", Element::array([1i64, 2, 3].map(Element::from)))]),
        )]),
    )]);
    let doc = Document::standalone(&value).unwrap();

    let leaf = doc
        .root()
        .unwrap()
        .get_key("level1")
        .unwrap()
        .get_key("level2")
        .unwrap()
        .get_key("level3")
        .unwrap()
        .get(1)
        .unwrap();
    assert_eq!(leaf.as_i64().unwrap(), 2);
}

#[test]
fn delta_reuses_unchanged_sibling_and_shrinks_payload() {
    let kept = "A".repeat(1000);
    let base_value = Element::dict([("kept", Element::from(kept.clone())), ("changed", Element::from("old"))]);
    let base = Document::standalone(&base_value).unwrap();

    let mut overlay = MutableDict::from_document(&base).unwrap();
    overlay.set("changed", Element::from("new"));
    let delta = base.delta(&overlay).unwrap();

    assert!(delta.len() < 100, "delta was {} bytes", delta.len());

    let mut combined = base.as_bytes().to_vec();
    combined.extend_from_slice(&delta);
    let combined = Document::from_bytes(combined);

    assert_eq!(combined.root().unwrap().get_key("kept").unwrap().as_str().unwrap(), kept);
    assert_eq!(
        combined.root().unwrap().get_key("changed").unwrap().as_str().unwrap(),
        "new"
    );
}

#[test]
fn delta_root_reaches_a_distant_base_value_through_double_indirection() {
    let blob = vec![0xCDu8; 70_000];
    let base_value = Element::array([Element::from(blob.clone()), Element::from(7i64)]);
    let base = Document::standalone(&base_value).unwrap();
    assert!(base.as_bytes().len() > 65536, "base is only {} bytes", base.as_bytes().len());

    // The blob is the first thing the encoder ever writes, so it sits at
    // offset 0 — reusing it as a delta root puts the whole base length
    // between the root slot and its target, forcing the wide branch.
    let first = base.root().unwrap().get(0).unwrap();
    assert_eq!(first.as_bytes().unwrap(), &blob[..]);

    let delta = base.delta(&first).unwrap();

    // Tail shape: a 4-byte wide pointer straight back to the blob, followed
    // by the fixed 2-byte root slot holding a narrow pointer 2 units back to
    // that wide pointer.
    assert_eq!(delta.len(), 6);
    assert_eq!(delta[0] & 0x80, 0x80, "expected the pointer bit on the wide slot");
    assert_eq!(&delta[4..6], &[0x80, 0x02]);

    let mut combined = base.as_bytes().to_vec();
    combined.extend_from_slice(&delta);
    let combined = Document::from_bytes(combined);
    assert_eq!(combined.root().unwrap().as_bytes().unwrap(), &blob[..]);
}

#[test]
fn wrong_type_access_fails_fast_with_expected_and_actual_kinds() {
    let int_doc = Document::standalone(&Element::from(5i64)).unwrap();
    let int_root = int_doc.root().unwrap();
    assert_eq!(
        int_root.as_str().unwrap_err(),
        ReadError::WrongType {
            expected: ValueType::String,
            actual: ValueType::Number,
        }
    );

    let str_doc = Document::standalone(&Element::from("hi")).unwrap();
    let str_root = str_doc.root().unwrap();
    assert_eq!(
        str_root.as_i64().unwrap_err(),
        ReadError::WrongType {
            expected: ValueType::Number,
            actual: ValueType::String,
        }
    );
}

#[test]
fn zero_pointer_offset_is_rejected() {
    // A root slot with the pointer bit set and an offset field of zero.
    let doc = Document::from_bytes(vec![0x80, 0x00]);
    assert_eq!(doc.root().unwrap_err(), ReadError::ZeroOffset { at: 0 });
}

#[test]
fn pointer_target_below_zero_is_rejected() {
    // A root slot pointing 2 units (4 bytes) back from offset 0: out of range.
    let doc = Document::from_bytes(vec![0x80, 0x02]);
    assert_eq!(
        doc.root().unwrap_err(),
        ReadError::PointerOutOfRange { at: 0, target: -4 }
    );
}

#[test]
fn invalid_utf8_behind_a_string_tag_is_rejected() {
    // A 1-byte string payload that's a lone continuation byte (invalid UTF-8),
    // reached via a narrow root pointer.
    let doc = Document::from_bytes(vec![0x41, 0xFF, 0x80, 0x01]);
    assert_eq!(doc.root().unwrap().as_str().unwrap_err(), ReadError::InvalidUtf8);
}

#[test]
fn buffers_shorter_than_a_root_slot_are_rejected() {
    assert_eq!(Document::from_bytes(Vec::new()).root().unwrap_err(), ReadError::BufferTooShort { len: 0 });
    assert_eq!(
        Document::from_bytes(vec![0x00]).root().unwrap_err(),
        ReadError::BufferTooShort { len: 1 }
    );
}

#[test]
fn deep_reuse_does_not_duplicate_untouched_subtree() {
    let base_value = Element::dict([
        (
            "a",
            Element::dict([("x", Element::from(1i64)), ("y", Element::from(2i64))]),
        ),
        ("b", Element::array([1i64, 2, 3].map(Element::from))),
    ]);
    let base = Document::standalone(&base_value).unwrap();

    let mut overlay = MutableDict::from_document(&base).unwrap();
    overlay.set("b", Element::array([4i64, 5].map(Element::from)));
    let delta = base.delta(&overlay).unwrap();

    assert!(delta.len() < 30, "delta was {} bytes", delta.len());
}
