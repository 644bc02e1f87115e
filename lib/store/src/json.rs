//! Typed JSON access on top of a [`KeyValueStore`].

use crate::KeyValueStore;
use crate::error::StoreError;
use crate::key::StorageKey;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::warn;

/// Reads and decodes the JSON value stored under `key`.
///
/// Absent and malformed values both read as `None`; a malformed value is
/// logged and otherwise ignored.
pub fn load_json<T, S>(store: &S, key: &StorageKey) -> Option<T>
where
    T: DeserializeOwned,
    S: KeyValueStore + ?Sized,
{
    let raw = store.get(key.as_str())?;
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(key = %key, error = %e, "ignoring malformed stored value");
            None
        }
    }
}

/// Encodes `value` as JSON and stores it under `key`.
///
/// # Errors
///
/// Returns an error if encoding fails or the backend cannot persist.
pub fn save_json<T, S>(store: &mut S, key: &StorageKey, value: &T) -> Result<(), StoreError>
where
    T: Serialize + ?Sized,
    S: KeyValueStore + ?Sized,
{
    let raw = serde_json::to_string(value).map_err(|e| StoreError::Encode {
        key: key.to_string(),
        reason: e.to_string(),
    })?;
    store.set(key.as_str(), raw)
}
