//! State module for tracking crawl progress
//!
//! This module provides the explicit state threaded through the crawl loop.
//!
//! # Components
//!
//! - `Cursor`: Position in the timeline (the first page or an opaque token)
//! - `CrawlPhase`: The phase of the crawl state machine
//! - `CrawlState`: Cursor, cutoff year and counters owned by the crawl loop

mod crawl_state;
mod cursor;

// Re-export main types
pub use crawl_state::{CrawlPhase, CrawlState, StopReason, Verdict};
pub use cursor::Cursor;
