//! Workflow graph implementation using petgraph.
//!
//! Workflows are directed graphs where:
//! - Nodes are notes or actions placed on the canvas
//! - Edges run from a predecessor to a successor
//!
//! Edges remember the order they were added in. That order is the edge
//! enumeration order seen by chain resolution, and it is preserved when
//! the graph is saved and loaded again.

use crate::chain;
use crate::edge::Edge;
use crate::error::GraphError;
use crate::node::Node;
use petgraph::Direction;
use petgraph::stable_graph::{EdgeIndex, NodeIndex, StableDiGraph};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, warn};
use waypost_core::{EdgeId, NodeId};

#[derive(Debug, Clone)]
struct EdgeEntry {
    seq: u64,
    edge: Edge,
}

/// A workflow graph using petgraph's stable directed graph.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(into = "GraphDocument", from = "GraphDocument")]
pub struct WorkflowGraph {
    graph: StableDiGraph<Node, EdgeEntry>,
    node_index_map: HashMap<NodeId, NodeIndex>,
    edge_index_map: HashMap<EdgeId, EdgeIndex>,
    next_seq: u64,
    locked: bool,
}

impl WorkflowGraph {
    /// Creates a new empty, unlocked workflow graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns whether new nodes are currently refused.
    #[must_use]
    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// Locks or unlocks node placement.
    pub fn set_locked(&mut self, locked: bool) {
        self.locked = locked;
    }

    /// Adds a node to the graph.
    ///
    /// # Errors
    ///
    /// Returns an error if the graph is locked or the id is taken.
    pub fn add_node(&mut self, node: Node) -> Result<NodeId, GraphError> {
        if self.locked {
            return Err(GraphError::Locked);
        }
        if self.node_index_map.contains_key(&node.id) {
            return Err(GraphError::DuplicateNode { node_id: node.id });
        }

        let node_id = node.id.clone();
        let index = self.graph.add_node(node);
        self.node_index_map.insert(node_id.clone(), index);
        debug!(node_id = %node_id, "added node");
        Ok(node_id)
    }

    /// Removes a node from the graph.
    ///
    /// Also removes all edges connected to this node.
    pub fn remove_node(&mut self, node_id: &NodeId) -> Option<Node> {
        let index = self.node_index_map.remove(node_id)?;

        let incident: Vec<EdgeId> = self
            .graph
            .edges_directed(index, Direction::Incoming)
            .chain(self.graph.edges_directed(index, Direction::Outgoing))
            .map(|e| e.weight().edge.id.clone())
            .collect();
        for edge_id in incident {
            self.edge_index_map.remove(&edge_id);
        }

        self.graph.remove_node(index)
    }

    /// Returns a reference to a node by its ID.
    #[must_use]
    pub fn node(&self, node_id: &NodeId) -> Option<&Node> {
        let index = self.node_index_map.get(node_id)?;
        self.graph.node_weight(*index)
    }

    /// Connects `source` to `target` with a freshly minted edge id.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Source or target node doesn't exist
    /// - The source node has no output (action nodes)
    /// - The two nodes are already connected in this direction
    pub fn connect(&mut self, source: &NodeId, target: &NodeId) -> Result<EdgeId, GraphError> {
        self.add_edge(Edge::new(source.clone(), target.clone()))
    }

    /// Adds a fully specified edge.
    ///
    /// # Errors
    ///
    /// Same conditions as [`WorkflowGraph::connect`], and fails if another
    /// edge already uses the id.
    pub fn add_edge(&mut self, edge: Edge) -> Result<EdgeId, GraphError> {
        let source_node = self
            .node(&edge.source)
            .ok_or_else(|| GraphError::NodeNotFound {
                node_id: edge.source.clone(),
            })?;
        if !source_node.kind.has_output() {
            return Err(GraphError::NotASource {
                node_id: edge.source.clone(),
            });
        }
        if self.node(&edge.target).is_none() {
            return Err(GraphError::NodeNotFound {
                node_id: edge.target.clone(),
            });
        }
        if self
            .graph
            .edge_indices()
            .filter_map(|i| self.graph.edge_weight(i))
            .any(|entry| entry.edge.same_endpoints(&edge))
        {
            return Err(GraphError::DuplicateEdge {
                source: edge.source,
                target: edge.target,
            });
        }
        if self.edge_index_map.contains_key(&edge.id) {
            return Err(GraphError::DuplicateEdgeId { edge_id: edge.id });
        }

        let edge_id = edge.id.clone();
        self.insert_edge(edge);
        debug!(edge_id = %edge_id, "connected nodes");
        Ok(edge_id)
    }

    /// Inserts an edge whose endpoints are known to exist.
    fn insert_edge(&mut self, edge: Edge) -> bool {
        let (Some(&source), Some(&target)) = (
            self.node_index_map.get(&edge.source),
            self.node_index_map.get(&edge.target),
        ) else {
            return false;
        };

        let seq = self.next_seq;
        self.next_seq += 1;
        let edge_id = edge.id.clone();
        let index = self.graph.add_edge(source, target, EdgeEntry { seq, edge });
        self.edge_index_map.insert(edge_id, index);
        true
    }

    /// Removes an edge by its ID.
    ///
    /// # Errors
    ///
    /// Returns an error if no such edge exists.
    pub fn disconnect(&mut self, edge_id: &EdgeId) -> Result<Edge, GraphError> {
        let index = self
            .edge_index_map
            .remove(edge_id)
            .ok_or_else(|| GraphError::EdgeNotFound {
                edge_id: edge_id.clone(),
            })?;
        self.graph
            .remove_edge(index)
            .map(|entry| entry.edge)
            .ok_or_else(|| GraphError::EdgeNotFound {
                edge_id: edge_id.clone(),
            })
    }

    /// Returns all nodes in the graph.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.graph
            .node_indices()
            .filter_map(|index| self.graph.node_weight(index))
    }

    /// Returns all edges in the order they were added.
    #[must_use]
    pub fn edges(&self) -> Vec<&Edge> {
        let mut entries: Vec<&EdgeEntry> = self
            .graph
            .edge_indices()
            .filter_map(|index| self.graph.edge_weight(index))
            .collect();
        entries.sort_by_key(|entry| entry.seq);
        entries.into_iter().map(|entry| &entry.edge).collect()
    }

    /// Returns every node keyed by its ID.
    #[must_use]
    pub fn nodes_by_id(&self) -> HashMap<&NodeId, &Node> {
        self.nodes().map(|node| (&node.id, node)).collect()
    }

    /// Returns the number of nodes in the graph.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Returns the number of edges in the graph.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Returns the action nodes of the graph.
    pub fn action_nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes().filter(|node| node.is_action())
    }

    /// Resolves the upstream chain of `node_id`, earliest node first.
    ///
    /// See [`chain::resolve_chain`].
    #[must_use]
    pub fn resolve_chain(&self, node_id: &NodeId) -> Vec<&Node> {
        let nodes = self.nodes_by_id();
        chain::resolve_chain(node_id, self.edges(), |id| nodes.get(id).copied())
    }
}

/// Serialized form of a workflow graph.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GraphDocument {
    #[serde(default)]
    pub nodes: Vec<Node>,
    /// Edges in insertion order.
    #[serde(default)]
    pub edges: Vec<Edge>,
    #[serde(default)]
    pub locked: bool,
}

impl From<WorkflowGraph> for GraphDocument {
    fn from(graph: WorkflowGraph) -> Self {
        Self {
            nodes: graph.nodes().cloned().collect(),
            edges: graph.edges().into_iter().cloned().collect(),
            locked: graph.locked,
        }
    }
}

impl From<GraphDocument> for WorkflowGraph {
    fn from(document: GraphDocument) -> Self {
        let mut graph = WorkflowGraph::new();

        for node in document.nodes {
            if let Err(e) = graph.add_node(node) {
                warn!(error = %e, "dropping node while loading graph");
            }
        }

        for edge in document.edges {
            if graph.edge_index_map.contains_key(&edge.id) {
                warn!(edge_id = %edge.id, "dropping duplicate edge while loading graph");
                continue;
            }
            let edge_id = edge.id.clone();
            if !graph.insert_edge(edge) {
                warn!(edge_id = %edge_id, "dropping edge with unknown endpoint while loading graph");
            }
        }

        graph.locked = document.locked;
        graph
    }
}
