//! Event and ticket-sale table loading.
//!
//! Both tables are header-driven CSV, optionally prefixed with a UTF-8 byte
//! order mark. Any malformed row fails the whole load.

use serde::Deserialize;
use std::collections::btree_map::{self, BTreeMap};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tour_core::{parse_timestamp, Error, Event, EventId, Result, SaleRecord};
use tracing::{debug, info, warn};

const BOM: char = '\u{feff}';

#[derive(Debug, Deserialize)]
struct EventRow {
    event_id: String,
    event_name: String,
    venue_id: String,
    event_dt: String,
}

#[derive(Debug, Deserialize)]
struct SaleRow {
    event_id: String,
    sales_minute: String,
    tickets_sold_in_minute: String,
}

/// Events keyed by id, plus what happened while loading them.
#[derive(Debug, Clone, Default)]
pub struct EventTable {
    events: BTreeMap<EventId, Event>,
    /// Data rows read from the source.
    rows_read: u64,
    /// Rows whose id had already been seen (the later row replaced the earlier).
    duplicate_ids: u64,
}

impl EventTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an event. A repeated id replaces the earlier event.
    pub fn insert(&mut self, event: Event) -> Option<Event> {
        self.rows_read += 1;
        let previous = self.events.insert(event.id.clone(), event);
        if previous.is_some() {
            self.duplicate_ids += 1;
        }
        previous
    }

    /// Look up an event.
    pub fn get(&self, id: &str) -> Option<&Event> {
        self.events.get(id)
    }

    /// Number of distinct events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Is the table empty?
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Events in ascending id order.
    pub fn iter(&self) -> btree_map::Values<'_, EventId, Event> {
        self.events.values()
    }

    /// Data rows read.
    pub fn rows_read(&self) -> u64 {
        self.rows_read
    }

    /// Rows that replaced an earlier row with the same id.
    pub fn duplicate_ids(&self) -> u64 {
        self.duplicate_ids
    }
}

impl FromIterator<Event> for EventTable {
    fn from_iter<I: IntoIterator<Item = Event>>(iter: I) -> Self {
        let mut table = EventTable::new();
        for event in iter {
            table.insert(event);
        }
        table
    }
}

/// Load the event table from a file.
pub fn load_events(path: impl AsRef<Path>) -> Result<EventTable> {
    let path = path.as_ref();
    let file = File::open(path)?;
    read_events(file, &path.display().to_string())
}

/// Load the ticket-sale table from a file.
pub fn load_sales(path: impl AsRef<Path>) -> Result<Vec<SaleRecord>> {
    let path = path.as_ref();
    let file = File::open(path)?;
    read_sales(file, &path.display().to_string())
}

/// Read the event table. `source` names the input in error messages.
pub fn read_events<R: Read>(reader: R, source: &str) -> Result<EventTable> {
    let mut table = EventTable::new();

    for_each_row(reader, source, |line, row: EventRow| {
        let event = Event::from_source(row.event_id, row.event_name, row.venue_id, &row.event_dt)
            .map_err(|e| Error::data(format!("{} line {}: event_dt: {}", source, line, e)))?;

        debug!(event_id = %event.id, kind = ?event.kind, "loaded event");
        if table.insert(event).is_some() {
            warn!(source, line, "duplicate event_id, keeping the later row");
        }
        Ok(())
    })?;

    info!(
        source,
        rows = table.rows_read(),
        events = table.len(),
        duplicates = table.duplicate_ids(),
        "loaded events"
    );
    Ok(table)
}

/// Read the ticket-sale table. `source` names the input in error messages.
pub fn read_sales<R: Read>(reader: R, source: &str) -> Result<Vec<SaleRecord>> {
    let mut sales = Vec::new();

    for_each_row(reader, source, |line, row: SaleRow| {
        let sales_minute = parse_timestamp(&row.sales_minute)
            .map_err(|e| Error::data(format!("{} line {}: sales_minute: {}", source, line, e)))?;
        let tickets = parse_ticket_count(&row.tickets_sold_in_minute).ok_or_else(|| {
            Error::data(format!(
                "{} line {}: tickets_sold_in_minute '{}' is not a non-negative integer",
                source, line, row.tickets_sold_in_minute
            ))
        })?;

        sales.push(SaleRecord {
            event_id: row.event_id,
            sales_minute,
            tickets,
        });
        Ok(())
    })?;

    info!(source, rows = sales.len(), "loaded ticket sales");
    Ok(sales)
}

fn parse_ticket_count(raw: &str) -> Option<u32> {
    let trimmed = raw.trim();
    if trimmed.starts_with('+') {
        return None;
    }
    trimmed.parse::<u32>().ok()
}

/// Deserialize every data row, handing it to `f` with its 1-based line number.
fn for_each_row<R, T, F>(mut reader: R, source: &str, mut f: F) -> Result<()>
where
    R: Read,
    T: for<'de> Deserialize<'de>,
    F: FnMut(u64, T) -> Result<()>,
{
    let mut raw = String::new();
    reader.read_to_string(&mut raw)?;
    let text = raw.strip_prefix(BOM).unwrap_or(&raw);

    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::Headers)
        .from_reader(text.as_bytes());
    let headers = csv_reader
        .headers()
        .map_err(|e| Error::csv(format!("{}: {}", source, e)))?
        .clone();

    for record in csv_reader.records() {
        let record = record.map_err(|e| Error::csv(format!("{}: {}", source, e)))?;
        let line = record.position().map(|p| p.line()).unwrap_or(0);
        let row: T = record
            .deserialize(Some(&headers))
            .map_err(|e| Error::data(format!("{} line {}: {}", source, line, e)))?;
        f(line, row)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use std::io::Write;
    use tour_core::EventKind;

    const EVENTS: &str = "\u{feff}event_id,event_name,venue_id,event_dt\n\
        1,Neon Harbor - Super Awesome Tour,10,2024-01-01T20:00:00+00:00\n\
        2,VIP Lounge,10,2024-01-01T20:00:00+00:00\n\
        3,Parking Pass,20,2024-01-02T20:00:00+00:00\n";

    const SALES: &str = "event_id,sales_minute,tickets_sold_in_minute\n\
        1,2023-11-01 10:00:00+00:00,10\n\
        1,2023-11-01 10:01:00+00:00,20\n\
        2,2023-11-01 10:00:00+00:00,5\n";

    #[test]
    fn test_read_events_strips_bom() {
        let table = read_events(EVENTS.as_bytes(), "events.csv").unwrap();

        assert_eq!(table.len(), 3);
        let concert = table.get("1").unwrap();
        assert_eq!(concert.kind, EventKind::Concert);
        assert_eq!(concert.venue_id, "10");
        assert_eq!(concert.event_dt, Utc.with_ymd_and_hms(2024, 1, 1, 20, 0, 0).unwrap());
        assert_eq!(concert.event_dt_text, "2024-01-01T20:00:00+00:00");
        assert_eq!(table.get("2").unwrap().kind, EventKind::Upsell);
        assert_eq!(table.duplicate_ids(), 0);
    }

    #[test]
    fn test_read_events_duplicate_id_last_wins() {
        let csv = "event_id,event_name,venue_id,event_dt\n\
            1,First,10,2024-01-01T20:00:00Z\n\
            1,Second,10,2024-01-01T20:00:00Z\n";
        let table = read_events(csv.as_bytes(), "events.csv").unwrap();

        assert_eq!(table.len(), 1);
        assert_eq!(table.rows_read(), 2);
        assert_eq!(table.duplicate_ids(), 1);
        assert_eq!(table.get("1").unwrap().name, "Second");
    }

    #[test]
    fn test_read_events_bad_timestamp() {
        let csv = "event_id,event_name,venue_id,event_dt\n1,Show,10,someday\n";
        let err = read_events(csv.as_bytes(), "events.csv").unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("events.csv line 2"), "{}", msg);
    }

    #[test]
    fn test_read_events_missing_column() {
        let csv = "event_id,event_name,event_dt\n1,Show,2024-01-01T20:00:00Z\n";
        assert!(read_events(csv.as_bytes(), "events.csv").is_err());
    }

    #[test]
    fn test_read_sales() {
        let sales = read_sales(SALES.as_bytes(), "ticket_sales.csv").unwrap();

        assert_eq!(sales.len(), 3);
        assert_eq!(sales[0].event_id, "1");
        assert_eq!(sales[1].tickets, 20);
        assert_eq!(
            sales[2].sales_minute,
            Utc.with_ymd_and_hms(2023, 11, 1, 10, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_read_sales_rejects_bad_counts() {
        for bad in ["ten", "-3", "2.5", ""] {
            let csv = format!(
                "event_id,sales_minute,tickets_sold_in_minute\n1,2023-11-01T10:00:00Z,{}\n",
                bad
            );
            let err = read_sales(csv.as_bytes(), "ticket_sales.csv").unwrap_err();
            assert!(matches!(err, Error::Data(_)), "{} -> {:?}", bad, err);
        }
    }

    #[test]
    fn test_read_sales_ignores_extra_columns() {
        let csv = "event_id,sales_minute,tickets_sold_in_minute,channel\n\
            7,2023-11-01T10:00:00Z, 4 ,web\n";
        let sales = read_sales(csv.as_bytes(), "ticket_sales.csv").unwrap();
        assert_eq!(sales[0].tickets, 4);
    }

    #[test]
    fn test_load_from_files() {
        let dir = tempfile::tempdir().unwrap();
        let events_path = dir.path().join("events.csv");
        let sales_path = dir.path().join("ticket_sales.csv");
        File::create(&events_path).unwrap().write_all(EVENTS.as_bytes()).unwrap();
        File::create(&sales_path).unwrap().write_all(SALES.as_bytes()).unwrap();

        assert_eq!(load_events(&events_path).unwrap().len(), 3);
        assert_eq!(load_sales(&sales_path).unwrap().len(), 3);
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_events("/nonexistent/events.csv").unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}
