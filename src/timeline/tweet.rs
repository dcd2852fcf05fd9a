//! Tweet projection of a timeline entry

use crate::timeline::fields;
use chrono::{DateTime, Datelike, FixedOffset};
use serde_json::Value;
use thiserror::Error;

/// Timestamp layout used by `legacy.created_at`, e.g. `Sun Jan 19 09:52:29 +0000 2025`
pub const CREATED_AT_FORMAT: &str = "%a %b %d %H:%M:%S %z %Y";

/// Reasons a tweet result cannot be projected into a [`Tweet`]
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TweetError {
    #[error("tweet result has no legacy created_at")]
    MissingCreatedAt,

    #[error("unparsable created_at '{value}': {message}")]
    InvalidCreatedAt { value: String, message: String },
}

/// The author of a tweet
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Author {
    pub screen_name: Option<String>,
    pub name: Option<String>,
    /// Whether the author follows the viewer
    pub followed_by: Option<bool>,
    /// Whether the viewer follows the author
    pub following: Option<bool>,
    pub protected: Option<bool>,
}

impl Author {
    fn from_user_result(user: &Value) -> Self {
        Self {
            screen_name: fields::SCREEN_NAME.string(user),
            name: fields::USER_NAME.string(user),
            followed_by: fields::FOLLOWED_BY.bool(user),
            following: fields::FOLLOWING.bool(user),
            protected: fields::PROTECTED.bool(user),
        }
    }

    pub fn is_followed_by(&self) -> bool {
        self.followed_by.unwrap_or(false)
    }

    pub fn is_protected(&self) -> bool {
        self.protected.unwrap_or(false)
    }
}

/// A normal tweet found in a timeline page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tweet {
    pub id: Option<String>,
    pub full_text: Option<String>,
    pub created_at: DateTime<FixedOffset>,
    pub favorite_count: Option<u64>,
    pub is_quote_status: Option<bool>,
    pub in_reply_to_status_id: Option<String>,
    pub author: Author,
}

impl Tweet {
    /// Projects a `tweet_results.result` object into a tweet
    ///
    /// Only the creation timestamp is required; every other field is
    /// optional and left empty when neither schema layout carries it.
    pub fn from_result(result: &Value) -> Result<Self, TweetError> {
        let raw_created_at = fields::CREATED_AT
            .str(result)
            .ok_or(TweetError::MissingCreatedAt)?;
        let created_at =
            parse_created_at(raw_created_at).map_err(|e| TweetError::InvalidCreatedAt {
                value: raw_created_at.to_string(),
                message: e.to_string(),
            })?;

        let author = fields::USER_RESULT
            .value(result)
            .map(Author::from_user_result)
            .unwrap_or_default();

        Ok(Self {
            id: fields::TWEET_ID.string(result),
            full_text: fields::FULL_TEXT.string(result),
            created_at,
            favorite_count: fields::FAVORITE_COUNT.count(result),
            is_quote_status: fields::IS_QUOTE_STATUS.bool(result),
            in_reply_to_status_id: fields::IN_REPLY_TO_STATUS_ID.string(result),
            author,
        })
    }

    /// Year the tweet was created, in the offset it was reported with
    pub fn year(&self) -> i32 {
        self.created_at.year()
    }

    pub fn has_reply_target(&self) -> bool {
        self.in_reply_to_status_id.is_some()
    }

    pub fn is_quote(&self) -> bool {
        self.is_quote_status.unwrap_or(false)
    }

    /// Public URL of the tweet, when both author and id are known
    pub fn permalink(&self) -> Option<String> {
        match (&self.author.screen_name, &self.id) {
            (Some(screen_name), Some(id)) => {
                Some(format!("https://x.com/{}/status/{}", screen_name, id))
            }
            _ => None,
        }
    }
}

/// Parses a `created_at` timestamp
pub fn parse_created_at(raw: &str) -> Result<DateTime<FixedOffset>, chrono::ParseError> {
    DateTime::parse_from_str(raw, CREATED_AT_FORMAT)
}
