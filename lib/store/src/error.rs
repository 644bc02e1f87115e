//! Error types for the store crate.

use std::fmt;
use std::path::PathBuf;

/// Errors from key-value store operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Reading or writing the backing file failed.
    Io { path: PathBuf, reason: String },
    /// The backing file exists but is not a JSON object of strings.
    Corrupt { path: PathBuf, reason: String },
    /// A value could not be encoded as JSON.
    Encode { key: String, reason: String },
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, reason } => {
                write!(f, "store i/o failed for {}: {reason}", path.display())
            }
            Self::Corrupt { path, reason } => {
                write!(f, "store file {} is corrupt: {reason}", path.display())
            }
            Self::Encode { key, reason } => {
                write!(f, "failed to encode value for '{key}': {reason}")
            }
        }
    }
}

impl std::error::Error for StoreError {}
