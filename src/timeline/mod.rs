//! Timeline document decoding
//!
//! This module turns a raw timeline response into typed entries:
//! - Locating the entries array inside the response document
//! - Classifying each entry as a tweet, a cursor marker, or something else
//! - Extracting tweet fields across the API's schema versions
//! - Deciding whether the crawl should continue past a page

mod entry;
pub mod fields;
mod page;
mod tweet;

pub use entry::{CursorDirection, Entry};
pub use page::{Page, PageError};
pub use tweet::{parse_created_at, Author, Tweet, TweetError, CREATED_AT_FORMAT};
