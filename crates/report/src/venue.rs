//! Upsell rate by venue.
//!
//! The linked events and sale rows are loaded into an in-memory SQLite
//! database and rolled up per venue with a single query.

use rusqlite::{params, Connection};
use serde::Serialize;
use std::io::Write;
use tour_analysis::ShowLinks;
use tour_core::{Error, Result, SaleRecord};
use tour_ingestion::Classified;
use tracing::debug;

const SCHEMA: &str = "
    CREATE TABLE events (
        event_id   TEXT PRIMARY KEY,
        event_name TEXT NOT NULL,
        venue_id   TEXT NOT NULL,
        is_concert INTEGER NOT NULL
    );
    CREATE TABLE show_links (
        event_id   TEXT PRIMARY KEY,
        concert_id TEXT NOT NULL
    );
    CREATE TABLE ticket_sales (
        event_id TEXT NOT NULL,
        tickets  INTEGER NOT NULL
    );
";

const VENUE_QUERY: &str = "
    WITH linked_sales AS (
        SELECT e.event_name, e.is_concert, c.venue_id, ts.tickets
        FROM ticket_sales ts
        INNER JOIN show_links l ON l.event_id = ts.event_id
        INNER JOIN events e ON e.event_id = ts.event_id
        INNER JOIN events c ON c.event_id = l.concert_id
    ),
    per_venue AS (
        SELECT
            venue_id,
            SUM(CASE WHEN is_concert = 1 THEN tickets ELSE 0 END) AS concert_tickets,
            SUM(CASE WHEN is_concert = 0 THEN tickets ELSE 0 END) AS upsell_tickets,
            COUNT(DISTINCT CASE WHEN is_concert = 0 THEN event_name END) AS upsell_options
        FROM linked_sales
        GROUP BY venue_id
    )
    SELECT
        venue_id,
        concert_tickets,
        upsell_tickets,
        upsell_options,
        ROUND(upsell_tickets * 100.0 / concert_tickets, 2) AS upsell_rate_pct
    FROM per_venue
    WHERE concert_tickets > 0
    ORDER BY upsell_options DESC, upsell_rate_pct DESC, venue_id ASC
";

/// Upsell uptake at one venue, across every show played there.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VenueUpsellRate {
    pub venue_id: String,
    /// Concert tickets sold at the venue.
    pub concert_tickets: u64,
    /// Tickets sold for upsells linked to those concerts.
    pub upsell_tickets: u64,
    /// Distinct upsell names that sold at least one ticket.
    pub upsell_options: u64,
    /// upsell_tickets / concert_tickets * 100, two decimals.
    pub upsell_rate_pct: f64,
}

fn db_err(e: rusqlite::Error) -> Error {
    Error::database(e.to_string())
}

/// Roll ticket sales up per venue.
///
/// Venues where no concert ticket sold are left out. Ordered by number of
/// upsell options, then rate, both descending.
pub fn venue_upsell_rates(
    classified: &Classified,
    sales: &[SaleRecord],
    links: &ShowLinks,
) -> Result<Vec<VenueUpsellRate>> {
    let mut conn = Connection::open_in_memory().map_err(db_err)?;
    conn.execute_batch(SCHEMA).map_err(db_err)?;

    let tx = conn.transaction().map_err(db_err)?;
    {
        let mut insert_event = tx
            .prepare("INSERT INTO events (event_id, event_name, venue_id, is_concert) VALUES (?1, ?2, ?3, ?4)")
            .map_err(db_err)?;
        for event in classified.concerts.values().chain(classified.upsells.values()) {
            insert_event
                .execute(params![event.id, event.name, event.venue_id, event.kind.is_concert()])
                .map_err(db_err)?;
        }

        let mut insert_link = tx
            .prepare("INSERT INTO show_links (event_id, concert_id) VALUES (?1, ?2)")
            .map_err(db_err)?;
        for (event_id, concert_id) in &links.event_to_concert {
            insert_link
                .execute(params![event_id, concert_id])
                .map_err(db_err)?;
        }

        let mut insert_sale = tx
            .prepare("INSERT INTO ticket_sales (event_id, tickets) VALUES (?1, ?2)")
            .map_err(db_err)?;
        for sale in sales {
            insert_sale
                .execute(params![sale.event_id, sale.tickets])
                .map_err(db_err)?;
        }
    }
    tx.commit().map_err(db_err)?;

    let mut stmt = conn.prepare(VENUE_QUERY).map_err(db_err)?;
    let rows = stmt
        .query_map([], |row| {
            Ok(VenueUpsellRate {
                venue_id: row.get(0)?,
                concert_tickets: row.get::<_, i64>(1)? as u64,
                upsell_tickets: row.get::<_, i64>(2)? as u64,
                upsell_options: row.get::<_, i64>(3)? as u64,
                upsell_rate_pct: row.get(4)?,
            })
        })
        .map_err(db_err)?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(db_err)?;

    debug!(venues = rows.len(), "computed upsell rate by venue");
    Ok(rows)
}

/// Write the venue table as CSV.
pub fn write_venue_rates<W: Write>(out: W, rates: &[VenueUpsellRate]) -> Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    for rate in rates {
        writer
            .serialize(rate)
            .map_err(|e| Error::csv(e.to_string()))?;
    }
    writer.flush()?;
    Ok(())
}
