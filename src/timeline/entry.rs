//! Timeline entry classification
//!
//! Entries carry no reliable discriminant of their own, so each one is
//! matched against a fixed, ordered list of structural rules. The first rule
//! that claims the entry decides its variant; unclaimed entries are `Other`.

use crate::timeline::fields;
use crate::timeline::tweet::{Tweet, TweetError};
use serde_json::Value;

const TIMELINE_ITEM: &str = "TimelineTimelineItem";
const TIMELINE_TWEET: &str = "TimelineTweet";
const TIMELINE_CURSOR: &str = "TimelineTimelineCursor";

/// Direction of a cursor marker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CursorDirection {
    Top,
    Bottom,
}

impl CursorDirection {
    fn parse(raw: &str) -> Option<Self> {
        match raw {
            "Top" => Some(Self::Top),
            "Bottom" => Some(Self::Bottom),
            _ => None,
        }
    }
}

/// One classified element of a page's entries array
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    /// A normal tweet with a usable creation timestamp
    Tweet(Tweet),

    /// A pagination marker
    Cursor {
        direction: CursorDirection,
        value: String,
    },

    /// Anything the crawler does not act on
    Other,
}

type Rule = fn(&Value) -> Option<Entry>;

/// Classification rules, tried in order
const RULES: &[Rule] = &[normal_tweet, cursor_marker];

impl Entry {
    /// Classifies a raw entry object
    pub fn classify(raw: &Value) -> Self {
        RULES
            .iter()
            .find_map(|rule| rule(raw))
            .unwrap_or(Entry::Other)
    }

    pub fn as_tweet(&self) -> Option<&Tweet> {
        match self {
            Self::Tweet(tweet) => Some(tweet),
            _ => None,
        }
    }

    /// Returns the cursor value if this is a marker in `direction`
    pub fn cursor_value(&self, direction: CursorDirection) -> Option<&str> {
        match self {
            Self::Cursor { direction: d, value } if *d == direction => Some(value.as_str()),
            _ => None,
        }
    }
}

/// Claims timeline items whose tweet result carries a legacy `created_at`
///
/// Results without that payload (visibility-filtered wrappers, tombstones,
/// empty `tweet_results`) are left for later rules. A timestamp that is
/// present but unparsable claims the entry as `Other` so it stays out of
/// termination and extraction.
fn normal_tweet(raw: &Value) -> Option<Entry> {
    if fields::ENTRY_TYPE.str(raw)? != TIMELINE_ITEM {
        return None;
    }
    if fields::ITEM_TYPE.str(raw)? != TIMELINE_TWEET {
        return None;
    }
    let result = fields::TWEET_RESULT.value(raw)?;

    match Tweet::from_result(result) {
        Ok(tweet) => Some(Entry::Tweet(tweet)),
        Err(TweetError::MissingCreatedAt) => None,
        Err(e) => {
            tracing::warn!(
                "Skipping entry {}: {}",
                fields::ENTRY_ID.str(raw).unwrap_or("<no entryId>"),
                e
            );
            Some(Entry::Other)
        }
    }
}

/// Claims Top and Bottom cursor markers with a non-empty value
fn cursor_marker(raw: &Value) -> Option<Entry> {
    if fields::ENTRY_TYPE.str(raw)? != TIMELINE_CURSOR {
        return None;
    }
    let direction = CursorDirection::parse(fields::CURSOR_TYPE.str(raw)?)?;
    let value = fields::CURSOR_VALUE.str(raw).filter(|v| !v.is_empty())?;

    Some(Entry::Cursor {
        direction,
        value: value.to_string(),
    })
}
