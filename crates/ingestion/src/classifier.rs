//! Concert/upsell partitioning.
//!
//! Every event already carries its [`EventKind`]; this splits a table into
//! the two disjoint sets the linker works on.

use crate::loader::EventTable;
use std::collections::BTreeMap;
use tour_core::{Event, EventId, EventKind};
use tracing::info;

/// Events split by kind. Every input event lands in exactly one map.
#[derive(Debug, Clone, Default)]
pub struct Classified {
    /// Tour concerts, keyed by id.
    pub concerts: BTreeMap<EventId, Event>,
    /// Everything else, keyed by id.
    pub upsells: BTreeMap<EventId, Event>,
}

impl Classified {
    /// Look up an event in either set.
    pub fn get(&self, id: &str) -> Option<&Event> {
        self.concerts.get(id).or_else(|| self.upsells.get(id))
    }

    /// Total number of events.
    pub fn len(&self) -> usize {
        self.concerts.len() + self.upsells.len()
    }

    /// No events at all?
    pub fn is_empty(&self) -> bool {
        self.concerts.is_empty() && self.upsells.is_empty()
    }
}

/// Partition events into concerts and upsells.
pub fn classify_events(table: &EventTable) -> Classified {
    let mut classified = Classified::default();

    for event in table.iter() {
        let target = match event.kind {
            EventKind::Concert => &mut classified.concerts,
            EventKind::Upsell => &mut classified.upsells,
        };
        target.insert(event.id.clone(), event.clone());
    }

    info!(
        concerts = classified.concerts.len(),
        upsells = classified.upsells.len(),
        "classified events"
    );
    classified
}
