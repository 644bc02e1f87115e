//! Upstream chain resolution.
//!
//! Starting from a node, the resolver repeatedly follows the first incoming
//! edge back to its source and collects the sources it passes, producing
//! the linear chain that feeds the node. Graphs with several predecessors
//! per node are treated as a single chain through the first edge found.

use crate::edge::Edge;
use crate::node::Node;
use std::collections::{HashMap, HashSet, VecDeque};
use tracing::debug;
use waypost_core::NodeId;

/// Resolves the chain of nodes feeding `start`, earliest first.
///
/// `edges` is taken in enumeration order: when several edges target the
/// same node, the first one wins. `lookup` maps node ids to nodes; a source
/// it cannot find ends the walk. A node already on the chain (or `start`
/// itself) is never added twice, so cycles terminate.
///
/// Returns an empty chain when `start` has no incoming edge.
pub fn resolve_chain<'a, E, F>(start: &NodeId, edges: E, lookup: F) -> Vec<&'a Node>
where
    E: IntoIterator<Item = &'a Edge>,
    F: Fn(&NodeId) -> Option<&'a Node>,
{
    let mut incoming: HashMap<&NodeId, &Edge> = HashMap::new();
    for edge in edges {
        incoming.entry(&edge.target).or_insert(edge);
    }

    let mut visited: HashSet<&NodeId> = HashSet::new();
    visited.insert(start);

    let mut chain = VecDeque::new();
    let mut current = start;
    while let Some(edge) = incoming.get(current) {
        let Some(source) = lookup(&edge.source) else {
            debug!(edge_id = %edge.id, source = %edge.source, "chain stops at unknown source");
            break;
        };
        if !visited.insert(&source.id) {
            debug!(node_id = %source.id, "chain stops at revisited node");
            break;
        }
        chain.push_front(source);
        current = &source.id;
    }

    chain.into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::WorkflowGraph;
    use crate::node::{NodeKind, Position};

    fn node(id: &str) -> Node {
        Node::with_id(NodeId::new(id), NodeKind::Note, Position::default())
    }

    fn edge(source: &str, target: &str) -> Edge {
        Edge::new(NodeId::new(source), NodeId::new(target))
    }

    fn index(nodes: &[&str]) -> HashMap<NodeId, Node> {
        nodes
            .iter()
            .map(|id| (NodeId::new(*id), node(id)))
            .collect()
    }

    fn ids(chain: &[&Node]) -> Vec<String> {
        chain.iter().map(|n| n.id.to_string()).collect()
    }

    fn resolve<'a>(
        start: &str,
        edges: &'a [Edge],
        nodes: &'a HashMap<NodeId, Node>,
    ) -> Vec<&'a Node> {
        resolve_chain(&NodeId::new(start), edges, |id| nodes.get(id))
    }

    #[test]
    fn linear_chain_earliest_first() {
        let nodes = index(&["A", "B", "C"]);
        let edges = vec![edge("A", "B"), edge("B", "C")];

        assert_eq!(ids(&resolve("C", &edges, &nodes)), vec!["A", "B"]);
        assert!(resolve("A", &edges, &nodes).is_empty());
    }

    #[test]
    fn edge_order_does_not_affect_linear_chain() {
        let nodes = index(&["A", "B", "C"]);
        let edges = vec![edge("B", "C"), edge("A", "B")];

        assert_eq!(ids(&resolve("C", &edges, &nodes)), vec!["A", "B"]);
    }

    #[test]
    fn isolated_node_has_empty_chain() {
        let nodes = index(&["A"]);
        assert!(resolve("A", &[], &nodes).is_empty());
    }

    #[test]
    fn self_loop_terminates() {
        let nodes = index(&["A"]);
        let edges = vec![edge("A", "A")];

        assert!(resolve("A", &edges, &nodes).is_empty());
    }

    #[test]
    fn two_node_cycle_terminates() {
        let nodes = index(&["A", "B"]);
        let edges = vec![edge("A", "B"), edge("B", "A")];

        assert_eq!(ids(&resolve("A", &edges, &nodes)), vec!["B"]);
        assert_eq!(ids(&resolve("B", &edges, &nodes)), vec!["A"]);
    }

    #[test]
    fn cycle_upstream_of_start_terminates() {
        let nodes = index(&["A", "B", "C", "D"]);
        let edges = vec![edge("A", "B"), edge("B", "C"), edge("C", "A"), edge("C", "D")];

        assert_eq!(ids(&resolve("D", &edges, &nodes)), vec!["A", "B", "C"]);
    }

    #[test]
    fn first_incoming_edge_wins() {
        let nodes = index(&["A", "B", "C"]);
        let edges = vec![edge("B", "C"), edge("A", "C")];

        assert_eq!(ids(&resolve("C", &edges, &nodes)), vec!["B"]);
    }

    #[test]
    fn dangling_source_stops_walk() {
        let nodes = index(&["B", "C"]);
        let edges = vec![edge("ghost", "B"), edge("B", "C")];

        assert_eq!(ids(&resolve("C", &edges, &nodes)), vec!["B"]);
    }

    #[test]
    fn graph_resolves_in_insertion_order() {
        let mut graph = WorkflowGraph::new();
        for id in ["A", "B", "C"] {
            graph.add_node(node(id)).unwrap();
        }
        let act = Node::with_id(NodeId::new("act"), NodeKind::Action, Position::default());
        graph.add_node(act).unwrap();
        graph.connect(&NodeId::new("B"), &NodeId::new("act")).unwrap();
        graph.connect(&NodeId::new("A"), &NodeId::new("act")).unwrap();
        graph.connect(&NodeId::new("C"), &NodeId::new("B")).unwrap();

        let chain = graph.resolve_chain(&NodeId::new("act"));
        assert_eq!(ids(&chain), vec!["C", "B"]);
    }

    #[test]
    fn graph_self_loop_terminates() {
        let mut graph = WorkflowGraph::new();
        graph.add_node(node("A")).unwrap();
        graph.connect(&NodeId::new("A"), &NodeId::new("A")).unwrap();

        assert!(graph.resolve_chain(&NodeId::new("A")).is_empty());
    }
}
