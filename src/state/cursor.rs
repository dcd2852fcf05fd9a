/// Timeline cursor definitions
///
/// A cursor identifies the page boundary a request starts from.
use std::fmt;

/// Position of a page in the timeline
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Cursor {
    /// No cursor: the first page of the timeline
    Initial,

    /// An opaque pagination token returned by the API
    At(String),
}

impl Cursor {
    /// Storage key used for the first page
    pub const INITIAL_KEY: &'static str = "initial";

    /// Builds a cursor from an optional token, treating an empty token as the first page
    pub fn from_token(token: Option<String>) -> Self {
        match token {
            Some(token) if !token.is_empty() => Self::At(token),
            _ => Self::Initial,
        }
    }

    /// Returns the token to send with the request, if any
    pub fn token(&self) -> Option<&str> {
        match self {
            Self::Initial => None,
            Self::At(token) => Some(token),
        }
    }

    /// Returns the key this cursor's page is stored under
    pub fn storage_key(&self) -> &str {
        match self {
            Self::Initial => Self::INITIAL_KEY,
            Self::At(token) => token,
        }
    }

    pub fn is_initial(&self) -> bool {
        matches!(self, Self::Initial)
    }
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.storage_key())
    }
}
