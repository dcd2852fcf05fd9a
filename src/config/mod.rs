//! Configuration module for Tweet-Harvest
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use tweet_harvest::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("harvest.toml")).unwrap();
//! println!("Pages will be written to: {}", config.output.directory);
//! ```

mod parser;
mod types;
pub(crate) mod validation;

// Re-export types
pub use types::{Config, CrawlConfig, OutputConfig, RequestConfig};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
