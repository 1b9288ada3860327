//! JSON dump of the analysed tour.

use serde::Serialize;
use std::io::Write;
use tour_analysis::{AggregationStats, KeyConflict, Ranking, TourStats};
use tour_core::{EventId, Result, Show};

/// Everything a downstream consumer needs to redo the charts.
#[derive(Debug, Serialize)]
pub struct ShowsExport<'a> {
    pub stats: &'a TourStats,
    pub accounting: &'a AggregationStats,
    pub top: Vec<&'a EventId>,
    pub bottom: Vec<&'a EventId>,
    pub orphaned_upsells: &'a [EventId],
    pub key_conflicts: &'a [KeyConflict],
    pub shows: &'a [Show],
}

impl<'a> ShowsExport<'a> {
    pub fn new(
        shows: &'a [Show],
        ranking: &'a Ranking,
        stats: &'a TourStats,
        accounting: &'a AggregationStats,
        orphaned_upsells: &'a [EventId],
        key_conflicts: &'a [KeyConflict],
    ) -> Self {
        Self {
            stats,
            accounting,
            top: ranking.top.iter().map(|s| &s.concert_id).collect(),
            bottom: ranking.bottom.iter().map(|s| &s.concert_id).collect(),
            orphaned_upsells,
            key_conflicts,
            shows,
        }
    }

    /// Write as pretty-printed JSON.
    pub fn write<W: Write>(&self, mut out: W) -> Result<()> {
        serde_json::to_writer_pretty(&mut out, self)?;
        out.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use tour_analysis::rank_shows;
    use tour_core::Event;

    #[test]
    fn test_export_shape() {
        let event = Event::new(
            "c1",
            "Super Awesome Tour",
            "7",
            Utc.with_ymd_and_hms(2024, 1, 1, 20, 0, 0).unwrap(),
        );
        let shows = vec![Show::new(&event, 30, 5, Vec::new())];
        let ranking = rank_shows(&shows, 2);
        let stats = TourStats::from_shows(&shows);
        let accounting = AggregationStats::default();
        let orphans = vec!["u9".to_string()];

        let export = ShowsExport::new(&shows, &ranking, &stats, &accounting, &orphans, &[]);
        let mut buf = Vec::new();
        export.write(&mut buf).unwrap();

        let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(value["top"][0], "c1");
        assert_eq!(value["bottom"][0], "c1");
        assert_eq!(value["orphaned_upsells"][0], "u9");
        assert_eq!(value["shows"][0]["total_tickets"], 35);
        assert_eq!(value["shows"][0]["event_dt"], "2024-01-01T20:00:00Z");
        assert_eq!(value["stats"]["show_count"], 1);
    }
}
