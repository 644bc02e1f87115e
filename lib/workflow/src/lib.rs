//! Workflow model for waypost.
//!
//! This crate provides:
//!
//! - **Graph Model**: Directed graphs using petgraph with note and action nodes
//! - **Annotations**: Notes, file names and links persisted per node
//! - **Chain Resolution**: Walking single incoming edges back from a node
//! - **Summaries**: Rendering a chain's annotations as notification text

pub mod annotation;
pub mod chain;
pub mod edge;
pub mod error;
pub mod graph;
pub mod node;
pub mod summary;

pub use annotation::{AnnotationRecord, AnnotationStore, FileRef, extract_links};
pub use chain::resolve_chain;
pub use edge::Edge;
pub use error::GraphError;
pub use graph::{GraphDocument, WorkflowGraph};
pub use node::{Node, NodeKind, Position};
pub use summary::{NO_CONNECTED_NODES, compose_summary};
pub use waypost_core::{EdgeId, NodeId};
