//! Output module for reporting on saved pages
//!
//! This module handles:
//! - Summarising the page store (page and tweet counts, tweet date range)
//! - Printing the summary for the `--stats` mode

pub mod stats;

pub use stats::{load_statistics, print_statistics, StoreStatistics};
