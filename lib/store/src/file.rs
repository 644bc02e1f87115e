//! Flat JSON file store.
//!
//! The whole store is one JSON object mapping keys to JSON-encoded string
//! values. Several processes may share the file, so reads go to disk and a
//! `set` merges its key into whatever the file holds at that moment.

use crate::KeyValueStore;
use crate::error::StoreError;
use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, instrument, warn};

/// A key-value store persisted to a single JSON file.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    /// Last contents read or written; served when the file cannot be read.
    entries: BTreeMap<String, String>,
}

impl JsonFileStore {
    /// Opens the store at `path`.
    ///
    /// A missing file is an empty store; it is created on the first write.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or does not hold a JSON
    /// object of strings.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let entries = read_entries(&path)?;
        debug!(path = %path.display(), entries = entries.len(), "opened store");
        Ok(Self { path, entries })
    }

    fn current(&self) -> BTreeMap<String, String> {
        match read_entries(&self.path) {
            Ok(entries) => entries,
            Err(e) => {
                warn!(error = %e, "store file unreadable, serving last known contents");
                self.entries.clone()
            }
        }
    }

    fn persist(&self, entries: &BTreeMap<String, String>) -> Result<(), StoreError> {
        let io_error = |e: std::io::Error| StoreError::Io {
            path: self.path.clone(),
            reason: e.to_string(),
        };

        let contents = serde_json::to_string_pretty(entries).map_err(|e| StoreError::Encode {
            key: self.path.display().to_string(),
            reason: e.to_string(),
        })?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_error)?;
        }

        // Write then rename so a crash never leaves a truncated store.
        let staging = self.path.with_extension("json.tmp");
        fs::write(&staging, contents).map_err(io_error)?;
        fs::rename(&staging, &self.path).map_err(io_error)
    }
}

fn read_entries(path: &Path) -> Result<BTreeMap<String, String>, StoreError> {
    match fs::read_to_string(path) {
        Ok(contents) if contents.trim().is_empty() => Ok(BTreeMap::new()),
        Ok(contents) => serde_json::from_str(&contents).map_err(|e| StoreError::Corrupt {
            path: path.to_path_buf(),
            reason: e.to_string(),
        }),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(BTreeMap::new()),
        Err(e) => Err(StoreError::Io {
            path: path.to_path_buf(),
            reason: e.to_string(),
        }),
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.current().remove(key)
    }

    #[instrument(skip(self, value), fields(path = %self.path.display()))]
    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError> {
        let mut entries = read_entries(&self.path)?;
        entries.insert(key.to_string(), value);
        self.persist(&entries)?;
        self.entries = entries;
        Ok(())
    }

    fn keys(&self) -> Vec<String> {
        self.current().into_keys().collect()
    }
}
