//! Timeline pages
//!
//! A page is one raw response body together with its classified entries.

use crate::state::{Cursor, StopReason, Verdict};
use crate::timeline::entry::{CursorDirection, Entry};
use crate::timeline::fields;
use crate::timeline::tweet::Tweet;
use chrono::{DateTime, FixedOffset};
use serde_json::Value;
use thiserror::Error;

/// Errors that make a whole page unusable
#[derive(Debug, Error)]
pub enum PageError {
    #[error("response is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("response has no timeline entries array")]
    MissingEntries,
}

/// A decoded timeline page
#[derive(Debug, Clone)]
pub struct Page {
    cursor: Cursor,
    body: Vec<u8>,
    entries: Vec<Entry>,
}

impl Page {
    /// Decodes a raw response body requested with `cursor`
    ///
    /// Fails only when the body is not JSON or the entries array cannot be
    /// found; individual entries never fail the page.
    pub fn parse(cursor: Cursor, body: Vec<u8>) -> Result<Self, PageError> {
        let document: Value = serde_json::from_slice(&body)?;
        let raw_entries = find_entries(&document).ok_or(PageError::MissingEntries)?;
        let entries = raw_entries.iter().map(Entry::classify).collect();

        Ok(Self {
            cursor,
            body,
            entries,
        })
    }

    /// The cursor this page was requested with
    pub fn cursor(&self) -> &Cursor {
        &self.cursor
    }

    /// The response body exactly as received
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn tweets(&self) -> impl Iterator<Item = &Tweet> {
        self.entries.iter().filter_map(Entry::as_tweet)
    }

    /// The first Bottom cursor on the page, pointing further back in time
    pub fn bottom_cursor(&self) -> Option<&str> {
        self.cursor_value(CursorDirection::Bottom)
    }

    pub fn top_cursor(&self) -> Option<&str> {
        self.cursor_value(CursorDirection::Top)
    }

    fn cursor_value(&self, direction: CursorDirection) -> Option<&str> {
        self.entries
            .iter()
            .find_map(|entry| entry.cursor_value(direction))
    }

    pub fn oldest_tweet_created_at(&self) -> Option<DateTime<FixedOffset>> {
        self.tweets().map(|tweet| tweet.created_at).min()
    }

    pub fn newest_tweet_created_at(&self) -> Option<DateTime<FixedOffset>> {
        self.tweets().map(|tweet| tweet.created_at).max()
    }

    /// True when every tweet on the page predates `cutoff_year`
    ///
    /// A page without tweets counts as entirely old.
    pub fn all_tweets_older_than(&self, cutoff_year: i32) -> bool {
        self.tweets().all(|tweet| tweet.year() < cutoff_year)
    }

    /// Decides whether the crawl continues past this page
    ///
    /// Relies on the timeline being ordered newest first: once a whole page
    /// is older than the cutoff, later pages cannot be in range.
    pub fn verdict(&self, cutoff_year: i32) -> Verdict {
        let Some(next) = self.bottom_cursor() else {
            return Verdict::Stop(StopReason::TimelineExhausted);
        };

        if self.all_tweets_older_than(cutoff_year) {
            return Verdict::Stop(StopReason::ReachedCutoff { cutoff_year });
        }

        if self.cursor.token() == Some(next) {
            return Verdict::Stop(StopReason::CursorRepeated);
        }

        Verdict::Continue(Cursor::At(next.to_string()))
    }
}

/// Finds the entries array of the first instruction that has one
fn find_entries(document: &Value) -> Option<&Vec<Value>> {
    fields::INSTRUCTIONS.find(document, |instructions| {
        instructions
            .as_array()?
            .iter()
            .find_map(|instruction| instruction.get("entries")?.as_array())
    })
}
