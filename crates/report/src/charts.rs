//! Chart datasets.
//!
//! Each chart of the tour report is written as a flat CSV that a plotting
//! tool can draw directly.

use crate::format::{round2, show_label};
use serde::Serialize;
use std::io::Write;
use tour_analysis::Ranking;
use tour_core::{Error, Result, Show};

/// Which ranking list a show belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Highlight {
    Top,
    Bottom,
    Both,
    None,
}

impl Highlight {
    fn of(show: &Show, ranking: &Ranking) -> Self {
        let in_top = ranking.top.iter().any(|s| s.concert_id == show.concert_id);
        let in_bottom = ranking.bottom.iter().any(|s| s.concert_id == show.concert_id);
        match (in_top, in_bottom) {
            (true, true) => Highlight::Both,
            (true, false) => Highlight::Top,
            (false, true) => Highlight::Bottom,
            (false, false) => Highlight::None,
        }
    }
}

#[derive(Debug, Serialize)]
struct TopBottomRow<'a> {
    group: &'static str,
    rank: usize,
    label: String,
    concert_id: &'a str,
    concert_tickets: u64,
    upsell_tickets: u64,
    total_tickets: u64,
}

#[derive(Debug, Serialize)]
struct TimeseriesRow<'a> {
    group: &'static str,
    rank: usize,
    label: String,
    concert_id: &'a str,
    timestamp: String,
    tickets: u32,
    cumulative: u64,
}

#[derive(Debug, Serialize)]
struct OverviewRow<'a> {
    label: String,
    concert_id: &'a str,
    concert_tickets: u64,
    upsell_tickets: u64,
    total_tickets: u64,
    highlight: Highlight,
}

#[derive(Debug, Serialize)]
struct UpsellRow<'a> {
    label: String,
    concert_id: &'a str,
    venue_id: &'a str,
    total_tickets: u64,
    upsell_pct: f64,
    has_upsell: bool,
    notable: bool,
}

/// Thresholds for annotating points on the upsell chart.
#[derive(Debug, Clone, Copy)]
pub struct NotableThresholds {
    pub upsell_pct: f64,
    pub total_tickets: u64,
}

fn groups(ranking: &Ranking) -> [(&'static str, &[Show]); 2] {
    [("top", ranking.top.as_slice()), ("bottom", ranking.bottom.as_slice())]
}

fn csv_err(e: csv::Error) -> Error {
    Error::csv(e.to_string())
}

fn write_rows<W: Write, T: Serialize>(out: W, rows: impl IntoIterator<Item = T>) -> Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    for row in rows {
        writer.serialize(row).map_err(csv_err)?;
    }
    writer.flush()?;
    Ok(())
}

/// Concert vs upsell tickets for the top and bottom shows.
pub fn write_top_bottom<W: Write>(out: W, ranking: &Ranking) -> Result<()> {
    let rows = groups(ranking).into_iter().flat_map(|(group, shows)| {
        shows.iter().enumerate().map(move |(i, show)| TopBottomRow {
            group,
            rank: i + 1,
            label: show_label(show),
            concert_id: &show.concert_id,
            concert_tickets: show.concert_tickets,
            upsell_tickets: show.upsell_tickets,
            total_tickets: show.total_tickets,
        })
    });
    write_rows(out, rows)
}

/// Cumulative sales over time for the top and bottom shows.
pub fn write_timeseries<W: Write>(out: W, ranking: &Ranking) -> Result<()> {
    let rows = groups(ranking).into_iter().flat_map(|(group, shows)| {
        shows.iter().enumerate().flat_map(move |(i, show)| {
            let label = show_label(show);
            show.timeseries
                .iter()
                .zip(show.cumulative_series())
                .map(move |(point, (_, cumulative))| TimeseriesRow {
                    group,
                    rank: i + 1,
                    label: label.clone(),
                    concert_id: &show.concert_id,
                    timestamp: point.ts.to_rfc3339(),
                    tickets: point.tickets,
                    cumulative,
                })
        })
    });
    write_rows(out, rows)
}

/// Every show, ascending by total tickets, with ranking highlights.
pub fn write_overview<W: Write>(out: W, shows: &[Show], ranking: &Ranking) -> Result<()> {
    let mut ordered: Vec<&Show> = shows.iter().collect();
    ordered.sort_by(|a, b| {
        a.total_tickets
            .cmp(&b.total_tickets)
            .then_with(|| a.concert_id.cmp(&b.concert_id))
    });

    let rows = ordered.into_iter().map(|show| OverviewRow {
        label: show_label(show),
        concert_id: &show.concert_id,
        concert_tickets: show.concert_tickets,
        upsell_tickets: show.upsell_tickets,
        total_tickets: show.total_tickets,
        highlight: Highlight::of(show, ranking),
    });
    write_rows(out, rows)
}

/// Total tickets vs upsell rate for every selling show.
pub fn write_upsell_analysis<W: Write>(
    out: W,
    shows: &[Show],
    thresholds: NotableThresholds,
) -> Result<()> {
    let rows = shows.iter().filter(|s| s.has_sales()).map(|show| UpsellRow {
        label: show_label(show),
        concert_id: &show.concert_id,
        venue_id: &show.venue_id,
        total_tickets: show.total_tickets,
        upsell_pct: round2(show.upsell_pct),
        has_upsell: show.has_upsell_sales(),
        notable: show.upsell_pct > thresholds.upsell_pct
            || show.total_tickets > thresholds.total_tickets,
    });
    write_rows(out, rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use tour_analysis::rank_shows;
    use tour_core::{Event, SalePoint};

    fn make_show(id: &str, concert: u64, upsell: u64, series: &[u32]) -> Show {
        let event = Event::new(
            id,
            "Super Awesome Tour",
            id,
            Utc.with_ymd_and_hms(2024, 1, 1, 20, 0, 0).unwrap(),
        );
        let timeseries = series
            .iter()
            .enumerate()
            .map(|(m, &tickets)| SalePoint {
                ts: Utc.with_ymd_and_hms(2023, 11, 1, 10, m as u32, 0).unwrap(),
                tickets,
            })
            .collect();
        Show::new(&event, concert, upsell, timeseries)
    }

    fn tour() -> Vec<Show> {
        vec![
            make_show("a", 40_000, 0, &[30_000, 10_000]),
            make_show("b", 90, 10, &[60, 40]),
            make_show("c", 50, 0, &[50]),
            make_show("z", 0, 0, &[]),
        ]
    }

    fn render(f: impl FnOnce(&mut Vec<u8>) -> Result<()>) -> Vec<String> {
        let mut buf = Vec::new();
        f(&mut buf).unwrap();
        String::from_utf8(buf).unwrap().lines().map(str::to_string).collect()
    }

    #[test]
    fn test_top_bottom_dataset() {
        let ranking = rank_shows(&tour(), 1);
        let lines = render(|buf| write_top_bottom(buf, &ranking));

        assert_eq!(
            lines[0],
            "group,rank,label,concert_id,concert_tickets,upsell_tickets,total_tickets"
        );
        assert_eq!(lines[1], "top,1,Venue a | 2024-01-01T20:00:00+00:00,a,40000,0,40000");
        assert_eq!(lines[2], "bottom,1,Venue c | 2024-01-01T20:00:00+00:00,c,50,0,50");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn test_timeseries_dataset_is_cumulative() {
        let ranking = rank_shows(&tour(), 1);
        let lines = render(|buf| write_timeseries(buf, &ranking));

        assert_eq!(lines.len(), 4);
        assert!(lines[1].ends_with(",30000,30000"), "{}", lines[1]);
        assert!(lines[2].ends_with(",10000,40000"), "{}", lines[2]);
        assert!(lines[3].starts_with("bottom,1,"));
    }

    #[test]
    fn test_overview_dataset() {
        let shows = tour();
        let ranking = rank_shows(&shows, 1);
        let lines = render(|buf| write_overview(buf, &shows, &ranking));

        assert_eq!(lines.len(), 5);
        assert!(lines[1].starts_with("Venue z"));
        assert!(lines[1].ends_with(",none"));
        assert!(lines[2].ends_with(",bottom"));
        assert!(lines[4].ends_with(",top"));
    }

    #[test]
    fn test_overview_overlap_marked_both() {
        let shows = vec![make_show("a", 10, 0, &[10])];
        let ranking = rank_shows(&shows, 2);
        let lines = render(|buf| write_overview(buf, &shows, &ranking));
        assert!(lines[1].ends_with(",both"));
    }

    #[test]
    fn test_upsell_dataset() {
        let shows = tour();
        let thresholds = NotableThresholds { upsell_pct: 10.0, total_tickets: 35_000 };
        let lines = render(|buf| write_upsell_analysis(buf, &shows, thresholds));

        // Zero-sales show is left out
        assert_eq!(lines.len(), 4);
        assert!(lines[1].ends_with(",40000,0.0,false,true"), "{}", lines[1]);
        assert!(lines[2].ends_with(",100,10.0,true,false"), "{}", lines[2]);
    }
}
