//! Error type of the command line layer.
//!
//! Library errors are wrapped as they cross into the binary; commands
//! return them inside a `rootcause` report.

use std::fmt;
use std::path::PathBuf;
use waypost_core::NodeId;
use waypost_scheduler::{NotifierError, WorkbenchError};
use waypost_store::StoreError;
use waypost_workflow::GraphError;

#[derive(Debug)]
pub enum CliError {
    /// Configuration could not be loaded.
    Config { reason: String },
    /// The graph file could not be read or written.
    GraphFile { path: PathBuf, reason: String },
    /// The annotation and schedule store failed.
    Store(StoreError),
    /// A graph edit was rejected.
    Graph(GraphError),
    /// The date or time given to `schedule` is invalid.
    InvalidTime(NotifierError),
    /// A scheduling operation was rejected.
    Schedule(WorkbenchError),
    /// The command names a node that is not in the graph.
    UnknownNode { node_id: NodeId },
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config { reason } => write!(f, "invalid configuration: {reason}"),
            Self::GraphFile { path, reason } => {
                write!(f, "graph file {}: {reason}", path.display())
            }
            Self::Store(e) => write!(f, "{e}"),
            Self::Graph(e) => write!(f, "{e}"),
            Self::InvalidTime(e) => write!(f, "{e}"),
            Self::Schedule(e) => write!(f, "{e}"),
            Self::UnknownNode { node_id } => write!(f, "no node '{node_id}' in the workflow"),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Store(e) => Some(e),
            Self::Graph(e) => Some(e),
            Self::InvalidTime(e) => Some(e),
            Self::Schedule(e) => Some(e),
            _ => None,
        }
    }
}

impl From<StoreError> for CliError {
    fn from(e: StoreError) -> Self {
        Self::Store(e)
    }
}

impl From<GraphError> for CliError {
    fn from(e: GraphError) -> Self {
        Self::Graph(e)
    }
}

impl From<WorkbenchError> for CliError {
    fn from(e: WorkbenchError) -> Self {
        Self::Schedule(e)
    }
}
