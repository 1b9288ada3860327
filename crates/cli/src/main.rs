//! tour-sales CLI entry point

mod pipeline;

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tour_core::Config;
use tracing::error;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "tour-sales")]
#[command(version, about = "Link upsells to concerts, aggregate ticket sales per show and write the tour report", long_about = None)]
struct Cli {
    /// Path to a TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Event metadata CSV
    #[arg(long)]
    events: Option<PathBuf>,

    /// Per-minute ticket sales CSV
    #[arg(long)]
    sales: Option<PathBuf>,

    /// Directory for report files
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Number of shows in the top and bottom lists
    #[arg(short = 'n', long)]
    top_n: Option<usize>,

    /// Summary banner title
    #[arg(long)]
    title: Option<String>,

    /// Skip the chart datasets
    #[arg(long)]
    no_charts: bool,

    /// Skip shows.json
    #[arg(long)]
    no_json: bool,

    /// Do not echo the summary to stdout
    #[arg(short, long)]
    quiet: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Log as JSON lines
    #[arg(long)]
    log_json: bool,
}

impl Cli {
    /// Load the config file (or defaults) and apply command-line overrides.
    fn resolve_config(&self) -> Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::load(path)
                .with_context(|| format!("failed to load config {}", path.display()))?,
            None => Config::default(),
        };

        if let Some(events) = &self.events {
            config.input.events_path = events.clone();
        }
        if let Some(sales) = &self.sales {
            config.input.sales_path = sales.clone();
        }
        if let Some(dir) = &self.output_dir {
            config.report.output_dir = dir.clone();
        }
        if let Some(n) = self.top_n {
            config.ranking.top_n = n;
        }
        if let Some(title) = &self.title {
            config.report.title = title.clone();
        }
        if self.no_charts {
            config.report.write_chart_data = false;
        }
        if self.no_json {
            config.report.write_json = false;
        }

        config.validate().context("invalid configuration")?;
        Ok(config)
    }
}

fn init_tracing(verbose: bool, json: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_env("TOUR_SALES_LOG")
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.log_json);

    if let Err(e) = run(&cli) {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<()> {
    let config = cli.resolve_config()?;
    let outcome = pipeline::run(&config)?;

    if !cli.quiet {
        println!("{}", outcome.summary);
    }
    Ok(())
}
