//! Per-show ticket aggregation.
//!
//! Folds the sale rows into one [`Show`] per concert. Rows whose event is not
//! linked to any concert (unknown ids, orphaned upsells) are skipped and only
//! show up in [`AggregationStats`].

use crate::linker::ShowLinks;
use serde::Serialize;
use std::cmp::Reverse;
use std::collections::HashMap;
use tour_core::{EventId, SalePoint, SaleRecord, Show};
use tour_ingestion::Classified;
use tracing::{info, warn};

/// Row and ticket accounting for one aggregation pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AggregationStats {
    /// Sale rows seen.
    pub rows_total: u64,
    /// Rows attributed to a show.
    pub rows_matched: u64,
    /// Rows dropped (event not linked to any concert).
    pub rows_unmatched: u64,
    /// Tickets across all rows.
    pub tickets_total: u64,
    /// Tickets attributed to a show.
    pub tickets_matched: u64,
    /// Tickets on dropped rows.
    pub tickets_unmatched: u64,
}

/// Shows in ranking order plus accounting.
#[derive(Debug, Clone, Default)]
pub struct Aggregation {
    /// One show per concert, descending by total tickets, ties by concert id.
    pub shows: Vec<Show>,
    pub stats: AggregationStats,
}

#[derive(Default)]
struct ShowTally {
    concert_tickets: u64,
    upsell_tickets: u64,
    timeseries: Vec<SalePoint>,
}

/// Sum ticket sales per show.
pub fn aggregate_shows(
    sales: &[SaleRecord],
    links: &ShowLinks,
    classified: &Classified,
) -> Aggregation {
    let mut tallies: HashMap<&EventId, ShowTally> = HashMap::new();
    let mut stats = AggregationStats::default();

    for sale in sales {
        let tickets = sale.tickets as u64;
        stats.rows_total += 1;
        stats.tickets_total += tickets;

        let Some(concert_id) = links.concert_for(&sale.event_id) else {
            stats.rows_unmatched += 1;
            stats.tickets_unmatched += tickets;
            continue;
        };

        stats.rows_matched += 1;
        stats.tickets_matched += tickets;

        let tally = tallies.entry(concert_id).or_default();
        if sale.event_id == *concert_id {
            tally.concert_tickets += tickets;
        } else {
            tally.upsell_tickets += tickets;
        }
        tally.timeseries.push(SalePoint {
            ts: sale.sales_minute,
            tickets: sale.tickets,
        });
    }

    let mut shows: Vec<Show> = classified
        .concerts
        .iter()
        .map(|(concert_id, concert)| match tallies.remove(concert_id) {
            Some(tally) => Show::new(
                concert,
                tally.concert_tickets,
                tally.upsell_tickets,
                tally.timeseries,
            ),
            None => Show::new(concert, 0, 0, Vec::new()),
        })
        .collect();

    shows.sort_by(|a, b| {
        Reverse(a.total_tickets)
            .cmp(&Reverse(b.total_tickets))
            .then_with(|| a.concert_id.cmp(&b.concert_id))
    });

    if stats.rows_unmatched > 0 {
        warn!(
            rows = stats.rows_unmatched,
            tickets = stats.tickets_unmatched,
            "sale rows not attributable to any show were dropped"
        );
    }
    info!(
        shows = shows.len(),
        rows = stats.rows_total,
        tickets = stats.tickets_matched,
        "aggregated show sales"
    );

    Aggregation { shows, stats }
}
