//! Storage module for persisting timeline pages
//!
//! This module is the resume store of the crawler:
//! - Mapping cursors to deterministic storage locations
//! - Saving raw response bodies byte for byte
//! - Loading previously saved pages so interrupted crawls resume without refetching

mod files;
mod traits;

pub use files::{decode_key, encode_key, FileStore};
pub use traits::{PageStore, StorageError, StorageResult};

use crate::config::OutputConfig;
use crate::TimelineError;

/// Opens the page store described by the output configuration
///
/// # Arguments
///
/// * `config` - The output configuration (directory and file prefix)
///
/// # Returns
///
/// * `Ok(FileStore)` - Store rooted at the configured directory, created if missing
/// * `Err(TimelineError)` - The directory could not be created
pub fn open_store(config: &OutputConfig) -> Result<FileStore, TimelineError> {
    Ok(FileStore::new(config.directory_path(), &config.file_prefix)?)
}
