//! Data ingestion for the tour-sales system.
//!
//! This crate handles:
//! - Reading the event and ticket-sale tables
//! - Timestamp and ticket-count validation
//! - Concert/upsell classification

pub mod classifier;
pub mod loader;

pub use classifier::{classify_events, Classified};
pub use loader::{load_events, load_sales, read_events, read_sales, EventTable};
