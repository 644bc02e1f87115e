//! On-disk layout of a workflow.
//!
//! A data directory holds:
//! - `graph.json`: nodes, edges and the lock flag
//! - `store.json`: the key-value store with annotations and schedules
//! - `waypost.toml`: optional configuration

use crate::error::CliError;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;
use waypost_store::JsonFileStore;
use waypost_workflow::WorkflowGraph;

const GRAPH_FILE: &str = "graph.json";
const STORE_FILE: &str = "store.json";

/// A loaded workflow: its graph and its store.
#[derive(Debug)]
pub struct Workspace {
    dir: PathBuf,
    graph: WorkflowGraph,
    store: JsonFileStore,
}

impl Workspace {
    /// Loads the workflow in `dir`. Missing files give an empty workflow.
    ///
    /// # Errors
    ///
    /// Returns an error if either file exists but cannot be read or parsed.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, CliError> {
        let dir = dir.into();
        let graph = load_graph(&dir.join(GRAPH_FILE))?;
        let store = JsonFileStore::open(dir.join(STORE_FILE))?;
        debug!(dir = %dir.display(), nodes = graph.node_count(), "workspace loaded");
        Ok(Self { dir, graph, store })
    }

    /// Path of the graph file, re-read by waiting commands before each
    /// schedule fires.
    pub fn graph_path(&self) -> PathBuf {
        self.dir.join(GRAPH_FILE)
    }

    pub fn graph(&self) -> &WorkflowGraph {
        &self.graph
    }

    pub fn graph_mut(&mut self) -> &mut WorkflowGraph {
        &mut self.graph
    }

    pub fn store(&self) -> &JsonFileStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut JsonFileStore {
        &mut self.store
    }

    /// Writes the graph back to `graph.json`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save_graph(&self) -> Result<(), CliError> {
        let path = self.graph_path();
        let file_error = |reason: String| CliError::GraphFile {
            path: path.clone(),
            reason,
        };

        let json = serde_json::to_string_pretty(&self.graph).map_err(|e| file_error(e.to_string()))?;
        fs::create_dir_all(&self.dir).map_err(|e| file_error(e.to_string()))?;
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, json).map_err(|e| file_error(e.to_string()))?;
        fs::rename(&tmp, &path).map_err(|e| file_error(e.to_string()))?;
        debug!(path = %path.display(), "graph saved");
        Ok(())
    }

    pub fn into_parts(self) -> (WorkflowGraph, JsonFileStore) {
        (self.graph, self.store)
    }
}

/// Reads a graph file. A missing or blank file is an empty graph.
pub(crate) fn load_graph(path: &Path) -> Result<WorkflowGraph, CliError> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(WorkflowGraph::new()),
        Err(e) => {
            return Err(CliError::GraphFile {
                path: path.to_path_buf(),
                reason: e.to_string(),
            });
        }
    };
    if raw.trim().is_empty() {
        return Ok(WorkflowGraph::new());
    }
    serde_json::from_str(&raw).map_err(|e| CliError::GraphFile {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}
