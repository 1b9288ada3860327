//! Upsell-to-concert linking.
//!
//! An upsell belongs to the concert that shares its exact venue and start
//! time. There is no tolerance window.

use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use tour_core::{EventId, Timestamp, VenueId, VenueKey};
use tour_ingestion::Classified;
use tracing::{debug, info, warn};

/// Two concerts on the same venue and start time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeyConflict {
    pub venue_id: VenueId,
    pub event_dt: Timestamp,
    /// Concert that owns the key (lowest id).
    pub kept: EventId,
    /// Concert that lost the key. It still forms its own show.
    pub shadowed: EventId,
}

/// Result of linking every event to its owning concert.
#[derive(Debug, Clone, Default)]
pub struct ShowLinks {
    /// Event id -> owning concert id. Concerts map to themselves.
    pub event_to_concert: HashMap<EventId, EventId>,
    /// Upsells with no concert on their venue and start time, ascending by id.
    pub orphaned_upsells: Vec<EventId>,
    /// Venue/start-time collisions between concerts.
    pub key_conflicts: Vec<KeyConflict>,
}

impl ShowLinks {
    /// Owning concert of an event, if linked.
    pub fn concert_for(&self, event_id: &str) -> Option<&EventId> {
        self.event_to_concert.get(event_id)
    }

    /// Number of linked upsells.
    pub fn linked_upsells(&self) -> usize {
        self.event_to_concert
            .iter()
            .filter(|(event_id, concert_id)| event_id != concert_id)
            .count()
    }
}

/// Map every concert to itself and every upsell to its concert.
///
/// The venue index is filled in ascending concert-id order and the first
/// concert on a key keeps it; later ones are reported as conflicts.
pub fn link_events(classified: &Classified) -> ShowLinks {
    let mut index: BTreeMap<VenueKey, &EventId> = BTreeMap::new();
    let mut links = ShowLinks::default();

    for (concert_id, concert) in &classified.concerts {
        links
            .event_to_concert
            .insert(concert_id.clone(), concert_id.clone());

        let key = concert.venue_key();
        match index.get(&key) {
            Some(&kept) => {
                warn!(
                    venue_id = %key.venue_id,
                    event_dt = %key.event_dt,
                    kept = %kept,
                    shadowed = %concert_id,
                    "two concerts share a venue and start time"
                );
                links.key_conflicts.push(KeyConflict {
                    venue_id: key.venue_id.clone(),
                    event_dt: key.event_dt,
                    kept: kept.clone(),
                    shadowed: concert_id.clone(),
                });
            }
            None => {
                index.insert(key, concert_id);
            }
        }
    }

    for (upsell_id, upsell) in &classified.upsells {
        match index.get(&upsell.venue_key()) {
            Some(&concert_id) => {
                links
                    .event_to_concert
                    .insert(upsell_id.clone(), concert_id.clone());
            }
            None => {
                debug!(upsell_id = %upsell_id, venue_id = %upsell.venue_id, "orphaned upsell");
                links.orphaned_upsells.push(upsell_id.clone());
            }
        }
    }

    if !links.orphaned_upsells.is_empty() {
        warn!(
            count = links.orphaned_upsells.len(),
            "upsells without a matching concert are excluded"
        );
    }
    info!(
        concerts = classified.concerts.len(),
        linked_upsells = links.linked_upsells(),
        orphaned_upsells = links.orphaned_upsells.len(),
        key_conflicts = links.key_conflicts.len(),
        "linked events to shows"
    );

    links
}
