//! HTTP fetcher implementation
//!
//! This module performs the network call for one page:
//! - Building the HTTP client with the configured timeout
//! - Sending the request with the template's headers
//! - Retrying transport failures on a fixed backoff schedule
//!
//! HTTP error statuses are returned to the caller untouched; only failures
//! to complete the exchange are retried.

use crate::config::CrawlConfig;
use crate::crawler::request::RequestTarget;
use crate::state::Cursor;
use crate::TimelineError;
use reqwest::header::HeaderMap;
use reqwest::Client;
use std::time::Duration;

/// A completed HTTP exchange
#[derive(Debug, Clone)]
pub struct FetchedResponse {
    /// HTTP status code
    pub status: u16,
    /// Response headers
    pub headers: HeaderMap,
    /// Response body exactly as received
    pub body: Vec<u8>,
}

impl FetchedResponse {
    pub fn is_ok(&self) -> bool {
        self.status == 200
    }
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The crawl configuration (request timeout)
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
pub fn build_http_client(config: &CrawlConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .timeout(config.request_timeout())
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetch executor with bounded retry on transport failure
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    retry_delays: Vec<Duration>,
}

impl Fetcher {
    /// Creates a fetcher that sleeps for each of `retry_delays` in turn
    /// between attempts, then makes one last attempt
    pub fn new(client: Client, retry_delays: Vec<Duration>) -> Self {
        Self {
            client,
            retry_delays,
        }
    }

    /// Fetches `target`, the request for the page at `cursor`
    ///
    /// # Retry Logic
    ///
    /// | Condition                    | Action                                   |
    /// |------------------------------|------------------------------------------|
    /// | Any HTTP status              | Returned as-is, never retried            |
    /// | Connect/timeout/body failure | Retry after the next backoff delay       |
    /// | Schedule exhausted           | One final attempt; failure is fatal      |
    pub async fn fetch(
        &self,
        target: &RequestTarget,
        cursor: &Cursor,
    ) -> Result<FetchedResponse, TimelineError> {
        for (attempt, delay) in self.retry_delays.iter().enumerate() {
            match self.attempt(target).await {
                Ok(response) => return Ok(response),
                Err(e) => {
                    tracing::warn!(
                        "Transport error for cursor {} (attempt {}): {}; retrying in {:?}",
                        cursor,
                        attempt + 1,
                        e,
                        delay
                    );
                    tokio::time::sleep(*delay).await;
                }
            }
        }

        self.attempt(target)
            .await
            .map_err(|source| TimelineError::Transport {
                cursor: cursor.to_string(),
                source,
            })
    }

    async fn attempt(&self, target: &RequestTarget) -> Result<FetchedResponse, reqwest::Error> {
        let response = self
            .client
            .get(target.url.clone())
            .headers(target.headers.clone())
            .send()
            .await?;

        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let body = response.bytes().await?.to_vec();

        Ok(FetchedResponse {
            status,
            headers,
            body,
        })
    }
}
