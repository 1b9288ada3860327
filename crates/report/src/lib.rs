//! Report generation for the tour-sales system.
//!
//! This crate turns analysed shows into files:
//! - Written summary with key insights
//! - Chart datasets (CSV) for the top/bottom, time series, overview and upsell charts
//! - Upsell rate by venue
//! - JSON dump of every show

pub mod charts;
pub mod export;
pub mod format;
pub mod reporter;
pub mod summary;
pub mod venue;

pub use reporter::{ReportContext, Reporter, WrittenReport};
pub use summary::render_summary;
pub use venue::{venue_upsell_rates, VenueUpsellRate};
