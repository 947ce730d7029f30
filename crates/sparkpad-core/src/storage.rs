// SPDX-License-Identifier: AGPL-3.0-or-later
//! Key-value stores backing the persistence adapter
//!
//! Provides:
//! - [`MemoryStore`]: in-process map with an optional byte quota
//! - [`FileStore`]: a JSON object of key to string kept in one file

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::snapshot::SnapshotError;
use crate::traits::KeyValueStore;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Store file {path} is not a key-value map: {source}")]
    CorruptStore {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Quota exceeded: writing {needed} bytes with a quota of {quota}")]
    QuotaExceeded { needed: usize, quota: usize },

    #[error("Snapshot error: {0}")]
    Snapshot(#[from] SnapshotError),
}

pub type Result<T> = std::result::Result<T, StorageError>;

/// In-memory store
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
    quota: Option<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store refusing writes once keys plus values exceed `quota` bytes
    pub fn with_quota(quota: usize) -> Self {
        Self {
            entries: HashMap::new(),
            quota: Some(quota),
        }
    }

    fn used_without(&self, key: &str) -> usize {
        self.entries
            .iter()
            .filter(|(k, _)| k.as_str() != key)
            .map(|(k, v)| k.len() + v.len())
            .sum()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        if let Some(quota) = self.quota {
            let needed = self.used_without(key) + key.len() + value.len();
            if needed > quota {
                return Err(StorageError::QuotaExceeded { needed, quota });
            }
        }
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// File-backed store; every write replaces the whole file
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl FileStore {
    /// Open `path`, starting empty when the file does not exist yet
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let entries = match fs::read_to_string(&path) {
            Ok(text) if text.trim().is_empty() => BTreeMap::new(),
            Ok(text) => serde_json::from_str(&text).map_err(|source| StorageError::CorruptStore {
                path: path.clone(),
                source,
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };
        tracing::debug!(path = %path.display(), keys = entries.len(), "opened file store");
        Ok(Self { path, entries })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> Result<()> {
        let text = serde_json::to_string_pretty(&self.entries).map_err(SnapshotError::from)?;
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, text)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let previous = self.entries.insert(key.to_string(), value.to_string());
        if let Err(e) = self.flush() {
            // keep memory in step with disk
            match previous {
                Some(old) => self.entries.insert(key.to_string(), old),
                None => self.entries.remove(key),
            };
            return Err(e);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store() {
        let mut store = MemoryStore::new();
        assert_eq!(store.get("k").unwrap(), None);
        store.set("k", "v1").unwrap();
        store.set("k", "v2").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("v2"));
    }

    #[test]
    fn test_memory_quota() {
        let mut store = MemoryStore::with_quota(10);
        store.set("k", "123456789").unwrap();
        // overwriting the same key only counts the new value
        store.set("k", "abcdefghi").unwrap();
        let err = store.set("k", "0123456789").unwrap_err();
        assert!(matches!(err, StorageError::QuotaExceeded { needed: 11, quota: 10 }));
        assert_eq!(store.get("k").unwrap().as_deref(), Some("abcdefghi"));
    }

    #[test]
    fn test_file_store_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");

        let mut store = FileStore::open(&path).unwrap();
        store.set("editorData", "{}").unwrap();
        store.set("other", "kept").unwrap();
        store.set("editorData", "{\"blocks\":[]}").unwrap();

        let reopened = FileStore::open(&path).unwrap();
        assert_eq!(reopened.get("editorData").unwrap().as_deref(), Some("{\"blocks\":[]}"));
        assert_eq!(reopened.get("other").unwrap().as_deref(), Some("kept"));
    }

    #[test]
    fn test_file_store_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        fs::write(&path, "[1, 2, 3]").unwrap();
        assert!(matches!(FileStore::open(&path), Err(StorageError::CorruptStore { .. })));
    }

    #[test]
    fn test_file_store_write_failure_rolls_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing-dir").join("store.json");
        let mut store = FileStore::open(&path).unwrap();
        assert!(matches!(store.set("k", "v"), Err(StorageError::Io(_))));
        assert_eq!(store.get("k").unwrap(), None);
    }
}
