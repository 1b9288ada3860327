//! Core types and configuration for the tour-sales system.
//!
//! This crate provides shared types used across all other crates:
//! - Event, sale and show data types
//! - Timestamp parsing
//! - Configuration structures
//! - Common error types

pub mod config;
pub mod error;
pub mod types;

pub use config::Config;
pub use error::{Error, Result};
pub use types::*;
