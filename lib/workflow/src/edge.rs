//! Edge types for workflow graphs.

use serde::{Deserialize, Serialize};
use waypost_core::{EdgeId, NodeId};

/// A directed connection from a predecessor node to a successor node.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Edge {
    /// Unique identifier.
    pub id: EdgeId,
    /// The upstream node.
    pub source: NodeId,
    /// The downstream node.
    pub target: NodeId,
}

impl Edge {
    /// Creates an edge with a freshly minted id (`edge-<ULID>`).
    #[must_use]
    pub fn new(source: NodeId, target: NodeId) -> Self {
        Self::with_id(EdgeId::generate("edge"), source, target)
    }

    /// Creates an edge with an explicit id.
    #[must_use]
    pub fn with_id(id: EdgeId, source: NodeId, target: NodeId) -> Self {
        Self { id, source, target }
    }

    /// Returns whether this edge joins the same two nodes, in the same
    /// direction, as `other`.
    #[must_use]
    pub fn same_endpoints(&self, other: &Edge) -> bool {
        self.source == other.source && self.target == other.target
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minted_ids_are_unique() {
        let first = Edge::new(NodeId::new("a-b"), NodeId::new("c"));
        let second = Edge::new(NodeId::new("a"), NodeId::new("b-c"));

        assert!(first.id.as_str().starts_with("edge-"));
        assert_ne!(first.id, second.id);
    }

    #[test]
    fn same_endpoints_ignores_id() {
        let a = Edge::new(NodeId::new("a"), NodeId::new("b"));
        let b = Edge::with_id(EdgeId::new("custom"), NodeId::new("a"), NodeId::new("b"));
        let reversed = Edge::new(NodeId::new("b"), NodeId::new("a"));

        assert!(a.same_endpoints(&b));
        assert!(!a.same_endpoints(&reversed));
    }
}
