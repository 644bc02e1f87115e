//! Key-value persistence for waypost.
//!
//! This crate provides:
//!
//! - **`KeyValueStore`**: the string-to-string surface every component
//!   persists through, injected rather than reached for globally
//! - **Storage keys**: `node-<id>` for annotation records and
//!   `action-<id>` for schedule state
//! - **JSON helpers**: lenient typed reads and typed writes
//! - **Backends**: an in-memory store and a flat JSON file store

pub mod error;
pub mod file;
pub mod json;
pub mod key;
pub mod memory;

pub use error::StoreError;
pub use file::JsonFileStore;
pub use json::{load_json, save_json};
pub use key::StorageKey;
pub use memory::MemoryStore;

/// A persistent string key-value surface.
///
/// Values are JSON documents encoded as strings. Each component writes only
/// the keys of the nodes it owns.
pub trait KeyValueStore {
    /// Returns the value stored under `key`, if any.
    fn get(&self, key: &str) -> Option<String>;

    /// Stores `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails to persist the value.
    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError>;

    /// Returns every key currently stored, in sorted order.
    fn keys(&self) -> Vec<String>;
}
