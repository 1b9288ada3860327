//! Load -> classify -> link -> aggregate -> rank -> report.

use anyhow::{Context, Result};
use std::path::PathBuf;
use tour_analysis::{aggregate_shows, link_events, rank_shows, TourStats};
use tour_core::Config;
use tour_ingestion::{classify_events, load_events, load_sales};
use tour_report::{ReportContext, Reporter};
use tracing::info;

/// What a run produced.
#[derive(Debug)]
pub struct RunOutcome {
    /// Rendered summary text.
    pub summary: String,
    /// Files written.
    pub written: Vec<PathBuf>,
}

/// Run the whole analysis for a configuration.
pub fn run(config: &Config) -> Result<RunOutcome> {
    let events = load_events(&config.input.events_path).with_context(|| {
        format!("failed to load events from {}", config.input.events_path.display())
    })?;
    let sales = load_sales(&config.input.sales_path).with_context(|| {
        format!("failed to load sales from {}", config.input.sales_path.display())
    })?;

    let classified = classify_events(&events);
    let links = link_events(&classified);
    let aggregation = aggregate_shows(&sales, &links, &classified);
    let ranking = rank_shows(&aggregation.shows, config.ranking.top_n);
    let stats = TourStats::from_shows(&aggregation.shows);

    let ctx = ReportContext {
        classified: &classified,
        sales: &sales,
        links: &links,
        aggregation: &aggregation,
        ranking: &ranking,
        stats: &stats,
        top_n: config.ranking.top_n,
    };
    let report = Reporter::new(config.report.clone())
        .write_all(&ctx)
        .context("failed to write report")?;

    info!(
        shows = aggregation.shows.len(),
        with_sales = stats.shows_with_sales,
        tickets = stats.total_tickets,
        "analysis complete"
    );

    Ok(RunOutcome {
        summary: report.summary,
        written: report.files,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write_inputs(dir: &std::path::Path, sales: &str) -> Config {
        let events = "\u{feff}event_id,event_name,venue_id,event_dt\n\
            A,Neon Harbor - Super Awesome Tour,1,2024-01-01 20:00:00+00:00\n\
            B,VIP Lounge,1,2024-01-01 20:00:00+00:00\n\
            C,Meet & Greet,2,2024-01-02 20:00:00+00:00\n\
            D,Neon Harbor - Super Awesome Tour,3,2024-01-03 20:00:00+00:00\n";
        fs::write(dir.join("events.csv"), events).unwrap();
        fs::write(dir.join("ticket_sales.csv"), sales).unwrap();

        let mut config = Config::default();
        config.input.events_path = dir.join("events.csv");
        config.input.sales_path = dir.join("ticket_sales.csv");
        config.report.output_dir = dir.join("report");
        config
    }

    #[test]
    fn test_run_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let config = write_inputs(
            dir.path(),
            "event_id,sales_minute,tickets_sold_in_minute\n\
             A,2023-11-01 10:00:00+00:00,10\n\
             A,2023-11-01 10:01:00+00:00,20\n\
             B,2023-11-01 10:00:00+00:00,5\n\
             C,2023-11-01 10:00:00+00:00,40\n",
        );

        let outcome = run(&config).unwrap();

        assert_eq!(outcome.written.len(), 7);
        assert!(outcome.summary.contains("Total tickets sold (tour):     35"));
        assert!(outcome.summary.contains("Shows with no sales data:      1"));
        let on_disk =
            fs::read_to_string(config.report.output_dir.join("analysis_summary.txt")).unwrap();
        assert_eq!(on_disk, outcome.summary);
    }

    #[test]
    fn test_run_fails_on_bad_ticket_count() {
        let dir = tempfile::tempdir().unwrap();
        let config = write_inputs(
            dir.path(),
            "event_id,sales_minute,tickets_sold_in_minute\n\
             A,2023-11-01 10:00:00+00:00,lots\n",
        );

        let err = run(&config).unwrap_err();
        assert!(format!("{:#}", err).contains("tickets_sold_in_minute"));
        assert!(!config.report.output_dir.exists());
    }
}
