//! Storage keys for per-node records.

use std::fmt;
use waypost_core::NodeId;

/// A key in the persistent store, always derived from a node id.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StorageKey(String);

impl StorageKey {
    /// Key of the annotation record for `node_id` (`node-<id>`).
    #[must_use]
    pub fn annotation(node_id: &NodeId) -> Self {
        Self(format!("node-{node_id}"))
    }

    /// Key of the schedule state for `node_id` (`action-<id>`).
    #[must_use]
    pub fn schedule(node_id: &NodeId) -> Self {
        Self(format!("action-{node_id}"))
    }

    /// Returns the raw key string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
