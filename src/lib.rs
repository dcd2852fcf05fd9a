//! Tweet-Harvest: a resumable timeline crawler
//!
//! This crate walks a cursor-paginated timeline API page by page, saving every
//! raw response to disk, honouring the API's rate-limit headers, and stopping
//! once the timeline content is older than a configured cutoff year.

pub mod config;
pub mod crawler;
pub mod output;
pub mod state;
pub mod storage;
pub mod timeline;

use thiserror::Error;

/// Main error type for Tweet-Harvest operations
#[derive(Debug, Error)]
pub enum TimelineError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Transport error for cursor {cursor}: {source}")]
    Transport {
        cursor: String,
        source: reqwest::Error,
    },

    #[error("Error response code {status} for cursor {cursor}")]
    UnexpectedStatus { cursor: String, status: u16 },

    #[error("Malformed page for cursor {cursor}: {source}")]
    Page {
        cursor: String,
        source: timeline::PageError,
    },

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Invalid state transition: {from:?} -> {to:?}")]
    InvalidTransition {
        from: state::CrawlPhase,
        to: state::CrawlPhase,
    },
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid JSON in `{field}`: {message}")]
    InvalidJson { field: String, message: String },

    #[error("Invalid header `{name}`: {message}")]
    InvalidHeader { name: String, message: String },
}

/// Result type alias for Tweet-Harvest operations
pub type Result<T> = std::result::Result<T, TimelineError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{Coordinator, CrawlSummary, RequestTemplate};
pub use state::{CrawlPhase, CrawlState, Cursor, StopReason};
pub use timeline::{Entry, Page, Tweet};
