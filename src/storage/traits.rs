//! Storage traits and error types
//!
//! This module defines the trait interface for page stores and
//! associated error types.

use crate::state::Cursor;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("No saved page for cursor {0}")]
    PageNotFound(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for cursor-addressed page stores
///
/// Pages are keyed by the cursor they were requested with, so a crawl that
/// is restarted from scratch finds every page it already fetched.
pub trait PageStore {
    /// Returns where the page for `cursor` lives (whether or not it exists)
    fn location(&self, cursor: &Cursor) -> PathBuf;

    /// Recovers the cursor a saved page belongs to from its location
    fn cursor_at(&self, location: &Path) -> Option<Cursor>;

    /// Returns true if a page for `cursor` has been saved
    fn exists(&self, cursor: &Cursor) -> bool;

    /// Loads the saved body for `cursor`
    fn load(&self, cursor: &Cursor) -> StorageResult<Vec<u8>>;

    /// Saves `body` verbatim for `cursor`, returning its location
    ///
    /// A page is either fully written or absent; an interrupted save never
    /// leaves a partial page behind.
    fn save(&self, cursor: &Cursor, body: &[u8]) -> StorageResult<PathBuf>;

    /// Lists every saved page, in a stable order
    fn list(&self) -> StorageResult<Vec<PathBuf>>;
}
