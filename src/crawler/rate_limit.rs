//! Rate limiter
//!
//! Reads the quota headers of every fetched response and turns them into
//! the wait required before the next fetch.

use chrono::{DateTime, TimeZone, Utc};
use reqwest::header::HeaderMap;
use std::fmt;
use std::time::Duration;

pub const LIMIT_HEADER: &str = "x-rate-limit-limit";
pub const REMAINING_HEADER: &str = "x-rate-limit-remaining";
pub const RESET_HEADER: &str = "x-rate-limit-reset";

/// Wait between fetches while quota remains
pub const DEFAULT_POLITENESS_INTERVAL: Duration = Duration::from_secs(1);

/// Quota state reported by one response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitReading {
    pub limit: u64,
    pub remaining: u64,
    pub reset_at: DateTime<Utc>,
}

impl RateLimitReading {
    /// Reads the quota headers
    ///
    /// Missing or unparsable counts read as zero and a missing reset reads
    /// as `now`, which yields at most a minimal wait.
    pub fn from_headers(headers: &HeaderMap, now: DateTime<Utc>) -> Self {
        let reset_at = header_number::<i64>(headers, RESET_HEADER)
            .and_then(|secs| Utc.timestamp_opt(secs, 0).single())
            .unwrap_or(now);

        Self {
            limit: header_number(headers, LIMIT_HEADER).unwrap_or(0),
            remaining: header_number(headers, REMAINING_HEADER).unwrap_or(0),
            reset_at,
        }
    }

    pub fn is_exhausted(&self) -> bool {
        self.remaining == 0
    }

    /// Time left until the window resets, zero if it already has
    pub fn until_reset(&self, now: DateTime<Utc>) -> Duration {
        (self.reset_at - now).to_std().unwrap_or(Duration::ZERO)
    }
}

impl fmt::Display for RateLimitReading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{} (reset at {})",
            self.remaining,
            self.limit,
            self.reset_at.to_rfc3339()
        )
    }
}

/// How long to pause before the next fetch, and why
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitInstruction {
    /// Quota remains; pause for the politeness interval
    Politeness(Duration),

    /// Quota exhausted; pause until the window resets
    UntilReset(Duration),
}

impl WaitInstruction {
    pub fn duration(&self) -> Duration {
        match self {
            Self::Politeness(d) | Self::UntilReset(d) => *d,
        }
    }
}

/// Turns rate-limit readings into wait instructions
#[derive(Debug, Clone)]
pub struct RateLimiter {
    politeness: Duration,
}

impl RateLimiter {
    pub fn new(politeness: Duration) -> Self {
        Self { politeness }
    }

    pub fn politeness(&self) -> Duration {
        self.politeness
    }

    /// Computes the wait before the next fetch
    pub fn wait_for(&self, reading: &RateLimitReading, now: DateTime<Utc>) -> WaitInstruction {
        if reading.is_exhausted() {
            WaitInstruction::UntilReset(reading.until_reset(now))
        } else {
            WaitInstruction::Politeness(self.politeness)
        }
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(DEFAULT_POLITENESS_INTERVAL)
    }
}

fn header_number<T: std::str::FromStr>(headers: &HeaderMap, name: &str) -> Option<T> {
    headers.get(name)?.to_str().ok()?.trim().parse().ok()
}
