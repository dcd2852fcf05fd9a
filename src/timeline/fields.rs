//! Field extraction strategies
//!
//! The timeline API has moved fields between releases. Every field is
//! described by an ordered list of JSON pointers, newest layout first; the
//! first pointer that yields a usable value wins.

use serde_json::Value;

/// Ordered lookup strategies for a single field
#[derive(Debug, Clone, Copy)]
pub struct FieldPath {
    /// Field name, used in log messages
    pub name: &'static str,

    /// JSON pointers tried in order
    pub pointers: &'static [&'static str],
}

impl FieldPath {
    pub const fn new(name: &'static str, pointers: &'static [&'static str]) -> Self {
        Self { name, pointers }
    }

    /// Returns the first strategy result that `convert` accepts
    ///
    /// A null value or one of the wrong type falls through to the next
    /// strategy.
    pub fn find<'a, T>(&self, root: &'a Value, convert: impl Fn(&'a Value) -> Option<T>) -> Option<T> {
        self.pointers
            .iter()
            .filter_map(|pointer| root.pointer(pointer))
            .find_map(convert)
    }

    pub fn value<'a>(&self, root: &'a Value) -> Option<&'a Value> {
        self.find(root, |value| (!value.is_null()).then_some(value))
    }

    pub fn str<'a>(&self, root: &'a Value) -> Option<&'a str> {
        self.find(root, Value::as_str)
    }

    pub fn string(&self, root: &Value) -> Option<String> {
        self.str(root).map(str::to_string)
    }

    pub fn bool(&self, root: &Value) -> Option<bool> {
        self.find(root, Value::as_bool)
    }

    /// Reads an unsigned count stored either as a number or a numeric string
    pub fn count(&self, root: &Value) -> Option<u64> {
        self.find(root, |value| match value {
            Value::Number(n) => n.as_u64(),
            Value::String(s) => s.parse().ok(),
            _ => None,
        })
    }
}

// ===== Entry structure =====

pub const ENTRY_ID: FieldPath = FieldPath::new("entryId", &["/entryId"]);

pub const ENTRY_TYPE: FieldPath =
    FieldPath::new("entryType", &["/content/entryType", "/content/__typename"]);

pub const ITEM_TYPE: FieldPath = FieldPath::new(
    "itemType",
    &["/content/itemContent/itemType", "/content/itemContent/__typename"],
);

pub const TWEET_RESULT: FieldPath =
    FieldPath::new("tweet_results", &["/content/itemContent/tweet_results/result"]);

pub const CURSOR_TYPE: FieldPath = FieldPath::new("cursorType", &["/content/cursorType"]);

pub const CURSOR_VALUE: FieldPath = FieldPath::new("value", &["/content/value"]);

// ===== Tweet result =====

pub const TWEET_ID: FieldPath = FieldPath::new("id", &["/rest_id", "/legacy/id_str"]);

pub const FULL_TEXT: FieldPath = FieldPath::new(
    "full_text",
    &["/note_tweet/note_tweet_results/result/text", "/legacy/full_text"],
);

pub const CREATED_AT: FieldPath = FieldPath::new("created_at", &["/legacy/created_at"]);

pub const FAVORITE_COUNT: FieldPath =
    FieldPath::new("favorite_count", &["/legacy/favorite_count"]);

pub const IS_QUOTE_STATUS: FieldPath =
    FieldPath::new("is_quote_status", &["/legacy/is_quote_status"]);

pub const IN_REPLY_TO_STATUS_ID: FieldPath =
    FieldPath::new("in_reply_to_status_id", &["/legacy/in_reply_to_status_id_str"]);

pub const USER_RESULT: FieldPath =
    FieldPath::new("user_results", &["/core/user_results/result"]);

// ===== User result =====

pub const SCREEN_NAME: FieldPath =
    FieldPath::new("screen_name", &["/core/screen_name", "/legacy/screen_name"]);

pub const USER_NAME: FieldPath = FieldPath::new("name", &["/core/name", "/legacy/name"]);

pub const FOLLOWED_BY: FieldPath = FieldPath::new(
    "followed_by",
    &["/relationship_perspectives/followed_by", "/legacy/followed_by"],
);

pub const FOLLOWING: FieldPath = FieldPath::new(
    "following",
    &["/relationship_perspectives/following", "/legacy/following"],
);

pub const PROTECTED: FieldPath =
    FieldPath::new("protected", &["/privacy/protected", "/legacy/protected"]);

// ===== Page structure =====

pub const INSTRUCTIONS: FieldPath = FieldPath::new(
    "instructions",
    &[
        "/data/user/result/timeline_v2/timeline/instructions",
        "/data/user/result/timeline/timeline/instructions",
    ],
);
