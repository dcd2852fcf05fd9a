//! Statistics generation from the page store
//!
//! This module provides functionality for summarising the pages a crawl
//! has saved so far.

use crate::storage::PageStore;
use crate::timeline::Page;
use crate::TimelineError;
use chrono::{DateTime, FixedOffset};

/// Summary of the saved pages
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreStatistics {
    /// Number of saved page files
    pub total_pages: u64,

    /// Normal tweets across all readable pages
    pub total_tweets: u64,

    /// Pages whose content could not be decoded
    pub unreadable_pages: u64,

    /// Pages that end the timeline (no Bottom cursor)
    pub pages_without_bottom_cursor: u64,

    /// Oldest tweet across all pages
    pub oldest_tweet: Option<DateTime<FixedOffset>>,

    /// Newest tweet across all pages
    pub newest_tweet: Option<DateTime<FixedOffset>>,
}

/// Loads statistics from a page store
///
/// Pages that no longer decode are counted as unreadable rather than
/// failing the whole summary.
///
/// # Arguments
///
/// * `store` - The page store to summarise
///
/// # Returns
///
/// * `Ok(StoreStatistics)` - Successfully loaded statistics
/// * `Err(TimelineError)` - The store could not be listed or read
pub fn load_statistics(store: &dyn PageStore) -> Result<StoreStatistics, TimelineError> {
    let mut stats = StoreStatistics::default();

    for path in store.list()? {
        stats.total_pages += 1;

        let Some(cursor) = store.cursor_at(&path) else {
            stats.unreadable_pages += 1;
            continue;
        };
        let body = store.load(&cursor)?;

        let page = match Page::parse(cursor, body) {
            Ok(page) => page,
            Err(e) => {
                tracing::warn!("Unreadable page {}: {}", path.display(), e);
                stats.unreadable_pages += 1;
                continue;
            }
        };

        stats.total_tweets += page.tweets().count() as u64;
        if page.bottom_cursor().is_none() {
            stats.pages_without_bottom_cursor += 1;
        }
        stats.oldest_tweet = min_option(stats.oldest_tweet, page.oldest_tweet_created_at());
        stats.newest_tweet = max_option(stats.newest_tweet, page.newest_tweet_created_at());
    }

    Ok(stats)
}

/// Prints statistics to stdout in a formatted manner
///
/// # Arguments
///
/// * `stats` - The statistics to display
pub fn print_statistics(stats: &StoreStatistics) {
    println!("=== Page Store Statistics ===\n");

    println!("Overview:");
    println!("  Saved pages: {}", stats.total_pages);
    println!("  Unreadable pages: {}", stats.unreadable_pages);
    println!("  Tweets: {}", stats.total_tweets);
    println!(
        "  Pages ending the timeline: {}",
        stats.pages_without_bottom_cursor
    );
    println!();

    println!("Tweet Range:");
    match (stats.oldest_tweet, stats.newest_tweet) {
        (Some(oldest), Some(newest)) => {
            println!("  Oldest: {}", oldest);
            println!("  Newest: {}", newest);
        }
        _ => println!("  No tweets saved yet"),
    }
}

fn min_option<T: Ord>(a: Option<T>, b: Option<T>) -> Option<T> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (a, b) => a.or(b),
    }
}

fn max_option<T: Ord>(a: Option<T>, b: Option<T>) -> Option<T> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a.max(b)),
        (a, b) => a.or(b),
    }
}
