//! Crawler module for walking the timeline
//!
//! This module contains the core crawling logic, including:
//! - Building each page's request from the template
//! - HTTP fetching with retry logic
//! - Rate limiting from response headers
//! - Overall crawl coordination

mod coordinator;
mod fetcher;
mod rate_limit;
mod request;

pub use coordinator::{Coordinator, CrawlSummary};
pub use fetcher::{build_http_client, FetchedResponse, Fetcher};
pub use rate_limit::{
    RateLimitReading, RateLimiter, WaitInstruction, DEFAULT_POLITENESS_INTERVAL, LIMIT_HEADER,
    REMAINING_HEADER, RESET_HEADER,
};
pub use request::{RequestTarget, RequestTemplate, CURSOR_KEY};

use crate::config::Config;
use crate::state::Cursor;
use crate::TimelineError;

/// Runs a complete crawl operation
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Build the request template and HTTP client
/// 2. Open the page store
/// 3. Walk the timeline from `start`, reusing saved pages
/// 4. Stop once the timeline ends or its content passes the cutoff year
///
/// # Arguments
///
/// * `config` - The crawler configuration
/// * `start` - Cursor to start from
///
/// # Returns
///
/// * `Ok(CrawlSummary)` - Crawl completed successfully
/// * `Err(TimelineError)` - Crawl failed
pub async fn crawl(config: &Config, start: Cursor) -> Result<CrawlSummary, TimelineError> {
    Coordinator::new(config, start)?.run().await
}
