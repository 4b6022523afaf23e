//! Cross-cutting invariants that don't fit a single worked scenario: a bound
//! on how many decision points a lazy lookup chain touches, read off the
//! `tracing` events the reader already emits at each pointer hop and dict
//! probe.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use lazydoc::document::Document;
use lazydoc::encoder::Element;
use tracing::span::{Attributes, Id, Record};
use tracing::{Event, Metadata, Subscriber};

struct EventCounter(Arc<AtomicUsize>);

impl Subscriber for EventCounter {
    fn enabled(&self, _metadata: &Metadata<'_>) -> bool {
        true
    }

    fn new_span(&self, _span: &Attributes<'_>) -> Id {
        Id::from_u64(1)
    }

    fn record(&self, _span: &Id, _values: &Record<'_>) {}

    fn record_follows_from(&self, _span: &Id, _follows: &Id) {}

    fn event(&self, _event: &Event<'_>) {
        self.0.fetch_add(1, Ordering::Relaxed);
    }

    fn enter(&self, _span: &Id) {}

    fn exit(&self, _span: &Id) {}
}

#[test]
fn lazy_lookup_touches_a_bounded_number_of_decision_points() {
    const TOP_LEVEL_ENTRIES: usize = 1000;
    const CHAIN_DEPTH: usize = 5;

    let mut top = BTreeMap::new();
    for i in 0..TOP_LEVEL_ENTRIES {
        top.insert(format!("key{i:04}"), Element::from(i as i64));
    }

    let mut leaf = Element::array([Element::from(42i64)]);
    for level in (0..CHAIN_DEPTH).rev() {
        leaf = Element::dict([(format!("level{level}"), leaf)]);
    }
    top.insert("chain".to_owned(), leaf);

    let doc = Document::standalone(&Element::Dict(top)).unwrap();

    let touched = Arc::new(AtomicUsize::new(0));
    let subscriber = EventCounter(touched.clone());

    let leaf_value = tracing::subscriber::with_default(subscriber, || {
        let mut value = doc.root().unwrap().get_key("chain").unwrap();
        for level in 0..CHAIN_DEPTH {
            value = value.get_key(&format!("level{level}")).unwrap();
        }
        value.get(0).unwrap().as_i64().unwrap()
    });
    assert_eq!(leaf_value, 42);

    // log2(1000) ~ 10 probes per dict lookup; one lookup per chain level,
    // plus a constant-ish number of pointer-resolution trace events per hop.
    let log_n = (TOP_LEVEL_ENTRIES as f64).log2().ceil() as usize;
    let bound = CHAIN_DEPTH * (log_n + 4);
    let events = touched.load(Ordering::Relaxed);
    assert!(
        events <= bound,
        "lookup chain touched {events} decision points, expected at most {bound}"
    );
}
