use chrono::{Datelike, Local};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

/// Main configuration structure for Tweet-Harvest
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub request: RequestConfig,
    #[serde(default)]
    pub crawl: CrawlConfig,
    pub output: OutputConfig,
}

/// The pre-built request every page request is derived from
#[derive(Debug, Clone, Deserialize)]
pub struct RequestConfig {
    /// Endpoint URL; any query string is replaced on every request
    pub url: String,

    /// JSON object text for the `variables` query parameter
    pub variables: String,

    /// JSON object text for the `features` query parameter
    pub features: String,

    /// Headers sent verbatim with every request (authorization, cookie, ...)
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
}

/// Crawl behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlConfig {
    /// Stop once every tweet on a page was created before this year
    #[serde(rename = "cutoff-year", default)]
    pub cutoff_year: Option<i32>,

    /// Delay between fetches while quota remains (milliseconds)
    #[serde(rename = "politeness-interval-ms", default = "default_politeness_ms")]
    pub politeness_interval_ms: u64,

    /// Delays between retries after a transport failure (seconds)
    #[serde(rename = "retry-delays-secs", default = "default_retry_delays")]
    pub retry_delays_secs: Vec<u64>,

    /// Per-request timeout (seconds)
    #[serde(rename = "request-timeout-secs", default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl CrawlConfig {
    /// The configured cutoff year, or the current local year when unset
    pub fn effective_cutoff_year(&self) -> i32 {
        self.cutoff_year.unwrap_or_else(|| Local::now().year())
    }

    pub fn politeness_interval(&self) -> Duration {
        Duration::from_millis(self.politeness_interval_ms)
    }

    pub fn retry_delays(&self) -> Vec<Duration> {
        self.retry_delays_secs
            .iter()
            .map(|secs| Duration::from_secs(*secs))
            .collect()
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            cutoff_year: None,
            politeness_interval_ms: default_politeness_ms(),
            retry_delays_secs: default_retry_delays(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Directory the raw pages are written to
    pub directory: String,

    /// File name prefix for saved pages (`<prefix>-<cursor>.json`)
    #[serde(rename = "file-prefix", default = "default_file_prefix")]
    pub file_prefix: String,
}

impl OutputConfig {
    pub fn directory_path(&self) -> PathBuf {
        PathBuf::from(&self.directory)
    }
}

fn default_politeness_ms() -> u64 {
    1000
}

fn default_retry_delays() -> Vec<u64> {
    vec![2, 4, 8, 16]
}

fn default_request_timeout() -> u64 {
    30
}

fn default_file_prefix() -> String {
    "likes".to_string()
}
