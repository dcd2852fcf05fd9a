//! Directory-backed page store
//!
//! Each page is one file, `<prefix>-<key>.json`, holding the raw response body.

use crate::state::Cursor;
use crate::storage::traits::{PageStore, StorageError, StorageResult};
use std::fs;
use std::path::{Path, PathBuf};

const EXTENSION: &str = "json";

/// Page store writing one file per cursor into a directory
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
    prefix: String,
}

impl FileStore {
    /// Creates a store rooted at `root`, creating the directory if needed
    pub fn new(root: impl Into<PathBuf>, prefix: &str) -> StorageResult<Self> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|source| StorageError::Io {
            path: root.clone(),
            source,
        })?;

        tracing::debug!("Page store at {}", root.display());

        Ok(Self {
            root,
            prefix: prefix.to_string(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn file_name(&self, cursor: &Cursor) -> String {
        format!(
            "{}-{}.{}",
            self.prefix,
            encode_key(cursor.storage_key()),
            EXTENSION
        )
    }

    fn is_page_file(&self, path: &Path) -> bool {
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            return false;
        };
        name.starts_with(&format!("{}-", self.prefix))
            && path.extension().and_then(|e| e.to_str()) == Some(EXTENSION)
    }
}

impl PageStore for FileStore {
    fn location(&self, cursor: &Cursor) -> PathBuf {
        self.root.join(self.file_name(cursor))
    }

    fn cursor_at(&self, location: &Path) -> Option<Cursor> {
        if !self.is_page_file(location) {
            return None;
        }
        let stem = location.file_stem()?.to_str()?;
        let key = decode_key(stem.strip_prefix(&format!("{}-", self.prefix))?);
        if key == Cursor::INITIAL_KEY {
            Some(Cursor::Initial)
        } else {
            Some(Cursor::At(key))
        }
    }

    fn exists(&self, cursor: &Cursor) -> bool {
        self.location(cursor).is_file()
    }

    fn load(&self, cursor: &Cursor) -> StorageResult<Vec<u8>> {
        let path = self.location(cursor);
        fs::read(&path).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                StorageError::PageNotFound(cursor.to_string())
            } else {
                StorageError::Io { path, source }
            }
        })
    }

    fn save(&self, cursor: &Cursor, body: &[u8]) -> StorageResult<PathBuf> {
        let path = self.location(cursor);

        // Write to a temp file first so a crash never leaves a truncated page
        let tmp_path = path.with_extension("json.tmp");
        fs::write(&tmp_path, body).map_err(|source| StorageError::Io {
            path: tmp_path.clone(),
            source,
        })?;

        #[cfg(target_os = "windows")]
        if path.exists() {
            fs::remove_file(&path).map_err(|source| StorageError::Io {
                path: path.clone(),
                source,
            })?;
        }
        fs::rename(&tmp_path, &path).map_err(|source| StorageError::Io {
            path: path.clone(),
            source,
        })?;

        tracing::debug!("Saved {} bytes to {}", body.len(), path.display());
        Ok(path)
    }

    fn list(&self) -> StorageResult<Vec<PathBuf>> {
        let io_err = |source| StorageError::Io {
            path: self.root.clone(),
            source,
        };

        let mut pages = Vec::new();
        for entry in fs::read_dir(&self.root).map_err(io_err)? {
            let path = entry.map_err(io_err)?.path();
            if path.is_file() && self.is_page_file(&path) {
                pages.push(path);
            }
        }
        pages.sort();
        Ok(pages)
    }
}

/// Makes a storage key safe to use as a file name
///
/// Only `%` and path separators are escaped, so ordinary cursor tokens are
/// used as-is and distinct keys always map to distinct names.
pub fn encode_key(key: &str) -> String {
    let mut encoded = String::with_capacity(key.len());
    for c in key.chars() {
        match c {
            '%' => encoded.push_str("%25"),
            '/' => encoded.push_str("%2F"),
            '\\' => encoded.push_str("%5C"),
            _ => encoded.push(c),
        }
    }
    encoded
}

/// Reverses [`encode_key`]
pub fn decode_key(encoded: &str) -> String {
    let mut decoded = String::with_capacity(encoded.len());
    let mut rest = encoded;
    while let Some(pos) = rest.find('%') {
        decoded.push_str(&rest[..pos]);
        let escape = rest.get(pos..pos + 3);
        let c = match escape {
            Some("%25") => Some('%'),
            Some("%2F") => Some('/'),
            Some("%5C") => Some('\\'),
            _ => None,
        };
        match c {
            Some(c) => {
                decoded.push(c);
                rest = &rest[pos + 3..];
            }
            None => {
                decoded.push('%');
                rest = &rest[pos + 1..];
            }
        }
    }
    decoded.push_str(rest);
    decoded
}
