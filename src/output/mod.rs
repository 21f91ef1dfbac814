//! Output module for reporting on scraped data
//!
//! This module handles:
//! - Loading row counts from the database
//! - Printing them for the `--stats` mode and after a run

pub mod stats;

pub use stats::{load_statistics, print_statistics, ScrapeStatistics};
