//! Writes every report artifact into the output directory.

use crate::charts::{self, NotableThresholds};
use crate::export::ShowsExport;
use crate::summary::render_summary;
use crate::venue::{venue_upsell_rates, write_venue_rates};
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use tour_analysis::{Aggregation, Ranking, ShowLinks, TourStats};
use tour_core::config::ReportConfig;
use tour_core::{Result, SaleRecord};
use tour_ingestion::Classified;
use tracing::info;

pub const SUMMARY_FILE: &str = "analysis_summary.txt";
pub const TOP_BOTTOM_FILE: &str = "fig1_top_bottom_shows.csv";
pub const TIMESERIES_FILE: &str = "fig2_sales_timeseries.csv";
pub const OVERVIEW_FILE: &str = "fig3_tour_overview.csv";
pub const UPSELL_FILE: &str = "fig4_upsell_analysis.csv";
pub const VENUE_FILE: &str = "upsell_rate_by_venue.csv";
pub const JSON_FILE: &str = "shows.json";

/// Read-only view of one analysed run.
#[derive(Debug, Clone, Copy)]
pub struct ReportContext<'a> {
    pub classified: &'a Classified,
    pub sales: &'a [SaleRecord],
    pub links: &'a ShowLinks,
    pub aggregation: &'a Aggregation,
    pub ranking: &'a Ranking,
    pub stats: &'a TourStats,
    /// N used for the ranking.
    pub top_n: usize,
}

/// What `Reporter::write_all` produced.
#[derive(Debug, Clone)]
pub struct WrittenReport {
    /// Summary text, as written to `SUMMARY_FILE`.
    pub summary: String,
    /// Paths written, in order.
    pub files: Vec<PathBuf>,
}

/// Report writer.
pub struct Reporter {
    config: ReportConfig,
}

impl Reporter {
    /// Create a reporter.
    pub fn new(config: ReportConfig) -> Self {
        Self { config }
    }

    /// Output directory.
    pub fn output_dir(&self) -> &Path {
        &self.config.output_dir
    }

    /// Write all enabled artifacts.
    pub fn write_all(&self, ctx: &ReportContext<'_>) -> Result<WrittenReport> {
        fs::create_dir_all(&self.config.output_dir)?;
        let mut written = Vec::new();

        let summary = render_summary(&self.config.title, ctx.ranking, ctx.stats, ctx.top_n);
        written.push(self.write_file(SUMMARY_FILE, |path| {
            fs::write(path, &summary)?;
            Ok(())
        })?);

        if self.config.write_chart_data {
            let shows = &ctx.aggregation.shows;
            let thresholds = NotableThresholds {
                upsell_pct: self.config.notable_upsell_pct,
                total_tickets: self.config.notable_total_tickets,
            };
            written.push(self.write_file(TOP_BOTTOM_FILE, |path| {
                charts::write_top_bottom(create(path)?, ctx.ranking)
            })?);
            written.push(self.write_file(TIMESERIES_FILE, |path| {
                charts::write_timeseries(create(path)?, ctx.ranking)
            })?);
            written.push(self.write_file(OVERVIEW_FILE, |path| {
                charts::write_overview(create(path)?, shows, ctx.ranking)
            })?);
            written.push(self.write_file(UPSELL_FILE, |path| {
                charts::write_upsell_analysis(create(path)?, shows, thresholds)
            })?);
        }

        let venue_rates = venue_upsell_rates(ctx.classified, ctx.sales, ctx.links)?;
        written.push(self.write_file(VENUE_FILE, |path| {
            write_venue_rates(create(path)?, &venue_rates)
        })?);

        if self.config.write_json {
            let export = ShowsExport::new(
                &ctx.aggregation.shows,
                ctx.ranking,
                ctx.stats,
                &ctx.aggregation.stats,
                &ctx.links.orphaned_upsells,
                &ctx.links.key_conflicts,
            );
            written.push(self.write_file(JSON_FILE, |path| export.write(create(path)?))?);
        }

        info!(
            dir = %self.config.output_dir.display(),
            files = written.len(),
            "report written"
        );
        Ok(WrittenReport {
            summary,
            files: written,
        })
    }

    fn write_file<F>(&self, name: &str, write: F) -> Result<PathBuf>
    where
        F: FnOnce(&Path) -> Result<()>,
    {
        let path = self.config.output_dir.join(name);
        write(&path)?;
        info!(path = %path.display(), "saved");
        Ok(path)
    }
}

fn create(path: &Path) -> Result<BufWriter<File>> {
    Ok(BufWriter::new(File::create(path)?))
}
