//! Configuration structures for the tour-sales system.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration for a report run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Input file configuration.
    pub input: InputConfig,
    /// Ranking configuration.
    pub ranking: RankingConfig,
    /// Report output configuration.
    pub report: ReportConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    ///
    /// Sections and fields missing from the file keep their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&raw)
            .map_err(|e| Error::config(format!("{}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Check that the configuration can drive a run.
    pub fn validate(&self) -> Result<()> {
        if self.input.events_path.as_os_str().is_empty() {
            return Err(Error::config("input.events_path must not be empty"));
        }
        if self.input.sales_path.as_os_str().is_empty() {
            return Err(Error::config("input.sales_path must not be empty"));
        }
        if self.report.title.trim().is_empty() {
            return Err(Error::config("report.title must not be empty"));
        }
        let pct = self.report.notable_upsell_pct;
        if pct.is_nan() || pct < 0.0 {
            return Err(Error::config("report.notable_upsell_pct must be a non-negative number"));
        }
        Ok(())
    }
}

/// Input file locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// Event metadata table.
    pub events_path: PathBuf,
    /// Per-minute ticket sales table.
    pub sales_path: PathBuf,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            events_path: PathBuf::from("events.csv"),
            sales_path: PathBuf::from("ticket_sales.csv"),
        }
    }
}

/// Top/bottom selection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RankingConfig {
    /// Number of shows in each of the top and bottom lists.
    pub top_n: usize,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self { top_n: 2 }
    }
}

/// Report output configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Directory that receives every report artifact.
    pub output_dir: PathBuf,
    /// Banner title for the written summary.
    pub title: String,
    /// Upsell rate (percent) above which a show is annotated in the upsell dataset.
    pub notable_upsell_pct: f64,
    /// Total tickets above which a show is annotated in the upsell dataset.
    pub notable_total_tickets: u64,
    /// Write the chart datasets (fig1..fig4 CSVs).
    pub write_chart_data: bool,
    /// Write shows.json.
    pub write_json: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            title: "Neon Harbor - Super Awesome Tour: Ticket Sales Analysis".to_string(),
            notable_upsell_pct: 10.0,
            notable_total_tickets: 35_000,
            write_chart_data: true,
            write_json: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.ranking.top_n, 2);
        assert_eq!(config.input.events_path, PathBuf::from("events.csv"));
        assert_eq!(config.report.notable_total_tickets, 35_000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_partial_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[ranking]\ntop_n = 5\n\n[report]\noutput_dir = \"out\"").unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.ranking.top_n, 5);
        assert_eq!(config.report.output_dir, PathBuf::from("out"));
        // Untouched fields keep defaults
        assert_eq!(config.input.sales_path, PathBuf::from("ticket_sales.csv"));
        assert!(config.report.write_chart_data);
    }

    #[test]
    fn test_load_rejects_bad_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[ranking]\ntop_n = \"two\"").unwrap();

        let err = Config::load(file.path()).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_validate_empty_title() {
        let mut config = Config::default();
        config.report.title = "   ".to_string();
        assert!(config.validate().is_err());
    }
}
