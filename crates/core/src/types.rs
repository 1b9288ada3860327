//! Core data types for the tour-sales system.

use crate::error::{Error, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// Event identifier as it appears in the source tables.
pub type EventId = String;

/// Venue identifier as it appears in the source tables.
pub type VenueId = String;

/// UTC instant.
pub type Timestamp = DateTime<Utc>;

/// Substring (lower-case) that marks an event as a tour concert.
pub const TOUR_MARKER: &str = "super awesome tour";

/// Offset-carrying formats tried after RFC 3339.
const OFFSET_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f%:z", "%Y-%m-%d %H:%M:%S%.f%z"];

/// Formats without an offset; interpreted as UTC.
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Parse an ISO-8601 style timestamp into a UTC instant.
///
/// Accepts RFC 3339, space-separated date/time with or without an offset,
/// minute precision, and a bare date (midnight UTC).
pub fn parse_timestamp(raw: &str) -> Result<Timestamp> {
    let s = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    for fmt in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(s, fmt) {
            return Ok(dt.with_timezone(&Utc));
        }
    }
    for fmt in NAIVE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(dt.and_utc());
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        if let Some(dt) = date.and_hms_opt(0, 0, 0) {
            return Ok(dt.and_utc());
        }
    }

    Err(Error::timestamp(format!("unrecognised timestamp '{}'", raw)))
}

/// Whether an event is the tour concert itself or something sold alongside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// Name contains the tour marker.
    Concert,
    /// Anything else (VIP package, meet-and-greet, parking...).
    Upsell,
}

impl EventKind {
    /// Classify an event by its name.
    ///
    /// Any name that happens to contain the marker is a concert; there is no
    /// way to opt an event out.
    pub fn classify(name: &str) -> Self {
        if name.to_lowercase().contains(TOUR_MARKER) {
            EventKind::Concert
        } else {
            EventKind::Upsell
        }
    }

    /// Is this a concert?
    #[inline]
    pub fn is_concert(self) -> bool {
        self == EventKind::Concert
    }
}

/// Venue and start time shared by a concert and its upsells.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VenueKey {
    pub venue_id: VenueId,
    pub event_dt: Timestamp,
}

/// A row of the event metadata table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Event identifier.
    pub id: EventId,
    /// Display name (trimmed).
    pub name: String,
    /// Venue identifier.
    pub venue_id: VenueId,
    /// Scheduled start, as a UTC instant.
    pub event_dt: Timestamp,
    /// Scheduled start as written in the source table.
    pub event_dt_text: String,
    /// Kind, assigned once from the name.
    pub kind: EventKind,
}

impl Event {
    /// Create an event, classifying it from its name.
    ///
    /// The display form of the start time is its RFC 3339 rendering.
    pub fn new(
        id: impl Into<EventId>,
        name: impl Into<String>,
        venue_id: impl Into<VenueId>,
        event_dt: Timestamp,
    ) -> Self {
        let name = name.into().trim().to_string();
        let kind = EventKind::classify(&name);
        Self {
            id: id.into(),
            name,
            venue_id: venue_id.into(),
            event_dt,
            event_dt_text: event_dt.to_rfc3339(),
            kind,
        }
    }

    /// Create an event from a source row, keeping `event_dt` as written.
    pub fn from_source(
        id: impl Into<EventId>,
        name: impl Into<String>,
        venue_id: impl Into<VenueId>,
        event_dt: &str,
    ) -> Result<Self> {
        let mut event = Self::new(id, name, venue_id, parse_timestamp(event_dt)?);
        event.event_dt_text = event_dt.trim().to_string();
        Ok(event)
    }

    /// Key used to attach upsells to concerts.
    pub fn venue_key(&self) -> VenueKey {
        VenueKey {
            venue_id: self.venue_id.clone(),
            event_dt: self.event_dt,
        }
    }
}

/// Tickets sold for one event in one minute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleRecord {
    /// Event the tickets belong to.
    pub event_id: EventId,
    /// Minute of sale.
    pub sales_minute: Timestamp,
    /// Tickets sold in that minute.
    pub tickets: u32,
}

/// A point of a show's merged sales series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SalePoint {
    pub ts: Timestamp,
    pub tickets: u32,
}

/// Upsell share of a total, in percent. Zero when there is nothing sold.
#[inline]
pub fn upsell_percentage(upsell_tickets: u64, total_tickets: u64) -> f64 {
    if total_tickets > 0 {
        upsell_tickets as f64 / total_tickets as f64 * 100.0
    } else {
        0.0
    }
}

/// One concert plus every upsell attached to it, with sales rolled up.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Show {
    /// Id of the anchoring concert.
    pub concert_id: EventId,
    /// Venue of the concert.
    pub venue_id: VenueId,
    /// Start of the concert.
    pub event_dt: Timestamp,
    /// Start of the concert as written in the source table.
    pub event_dt_text: String,
    /// Concert name.
    pub concert_name: String,
    /// Tickets sold for the concert event itself.
    pub concert_tickets: u64,
    /// Tickets sold for attached upsells.
    pub upsell_tickets: u64,
    /// concert_tickets + upsell_tickets.
    pub total_tickets: u64,
    /// upsell_tickets / total_tickets * 100, or 0 with no sales.
    pub upsell_pct: f64,
    /// Concert and upsell sales merged, ascending by time.
    pub timeseries: Vec<SalePoint>,
}

impl Show {
    /// Build a show for a concert. The series is sorted here.
    pub fn new(
        concert: &Event,
        concert_tickets: u64,
        upsell_tickets: u64,
        mut timeseries: Vec<SalePoint>,
    ) -> Self {
        let total_tickets = concert_tickets + upsell_tickets;
        timeseries.sort();
        Self {
            concert_id: concert.id.clone(),
            venue_id: concert.venue_id.clone(),
            event_dt: concert.event_dt,
            event_dt_text: concert.event_dt_text.clone(),
            concert_name: concert.name.clone(),
            concert_tickets,
            upsell_tickets,
            total_tickets,
            upsell_pct: upsell_percentage(upsell_tickets, total_tickets),
            timeseries,
        }
    }

    /// Did anything sell?
    #[inline]
    pub fn has_sales(&self) -> bool {
        self.total_tickets > 0
    }

    /// Were any upsell tickets sold?
    #[inline]
    pub fn has_upsell_sales(&self) -> bool {
        self.upsell_tickets > 0
    }

    /// Running ticket total at each point of the series.
    pub fn cumulative_series(&self) -> Vec<(Timestamp, u64)> {
        self.timeseries
            .iter()
            .scan(0u64, |running, p| {
                *running += p.tickets as u64;
                Some((p.ts, *running))
            })
            .collect()
    }
}
