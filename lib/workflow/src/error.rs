//! Error types for the workflow crate.
//!
//! Graph operations return `GraphError` carrying only what the graph layer
//! knows. Callers add their own context when wrapping it in a report.

use waypost_core::{EdgeId, NodeId};
use std::fmt;

/// Errors from graph operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    /// Node with the given ID was not found in the graph.
    NodeNotFound { node_id: NodeId },
    /// A node with the given ID already exists.
    DuplicateNode { node_id: NodeId },
    /// Edge with the given ID was not found in the graph.
    EdgeNotFound { edge_id: EdgeId },
    /// The two nodes are already connected in this direction.
    DuplicateEdge { source: NodeId, target: NodeId },
    /// Another edge already uses this ID.
    DuplicateEdgeId { edge_id: EdgeId },
    /// The node has no output handle and cannot start an edge.
    NotASource { node_id: NodeId },
    /// The workflow is locked against placing new nodes.
    Locked,
}

impl fmt::Display for GraphError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NodeNotFound { node_id } => write!(f, "node not found: {node_id}"),
            Self::DuplicateNode { node_id } => write!(f, "node already exists: {node_id}"),
            Self::EdgeNotFound { edge_id } => write!(f, "edge not found: {edge_id}"),
            Self::DuplicateEdge { source, target } => {
                write!(f, "nodes already connected: {source} -> {target}")
            }
            Self::DuplicateEdgeId { edge_id } => write!(f, "edge id already in use: {edge_id}"),
            Self::NotASource { node_id } => {
                write!(f, "node {node_id} has no output and cannot be an edge source")
            }
            Self::Locked => write!(f, "workflow is locked"),
        }
    }
}

impl std::error::Error for GraphError {}
