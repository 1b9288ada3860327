//! Show-level analysis for the tour-sales system.
//!
//! This crate handles:
//! - Linking upsells to their concert by venue and start time
//! - Aggregating ticket sales per show
//! - Ranking shows (top/bottom N)
//! - Tour-wide statistics

pub mod aggregator;
pub mod linker;
pub mod ranker;
pub mod stats;

pub use aggregator::{aggregate_shows, Aggregation, AggregationStats};
pub use linker::{link_events, KeyConflict, ShowLinks};
pub use ranker::{rank_shows, Ranking};
pub use stats::TourStats;
