//! Graph construction from classified relations.
//!
//! # Overview
//!
//! [`TriggerGraph`] aggregates the classifier's relation stream into a
//! petgraph directed graph: one node per trigger and per local variable
//! (isolated ones included), and one edge per distinct
//! `(source, target, kind)` triple — duplicates of the same triple
//! collapse, while differently-typed edges between the same ordered pair
//! coexist.
//!
//! The builder is a pure function of its inputs: the same record set and
//! relation stream always yield the same node set, edge multiset, and
//! weights, in the same order. That is what makes rebuilt layouts
//! reproducible modulo the external renderer's own physics.
//!
//! # Content hash
//!
//! The graph carries a BLAKE3 hash of the sorted edge set. The external
//! layer can compare it against a stored value to invalidate cached
//! layouts only when the relationships actually change.

use std::collections::{HashMap, HashSet};

use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use tracing::debug;

use trigvis_core::model::MapScript;

use crate::relation::{NodeKind, NodeRef, Relation, RelationKind};

/// The built trigger-relationship graph.
#[derive(Debug)]
pub struct TriggerGraph {
    /// Node weights are endpoints; edge weights are relation types.
    pub graph: DiGraph<NodeRef, RelationKind>,
    /// Mapping from endpoint to petgraph `NodeIndex`.
    pub node_map: HashMap<NodeRef, NodeIndex>,
    /// BLAKE3 hash of the sorted edge set, for layout-cache invalidation.
    pub content_hash: String,
}

impl TriggerGraph {
    /// Build the graph for `script` from already-classified `relations`.
    ///
    /// Relations whose endpoints are not declared in `script` are dropped
    /// (the classifier never emits them; this is only a guard against
    /// hand-built relation streams).
    #[must_use]
    pub fn from_script(script: &MapScript, relations: &[Relation]) -> Self {
        let mut graph = DiGraph::new();
        let mut node_map: HashMap<NodeRef, NodeIndex> =
            HashMap::with_capacity(script.triggers.len() + script.locals.len());

        // Every declared trigger and variable gets a node, connected or
        // not. BTreeMap order keeps node indices deterministic.
        for id in script.triggers.keys() {
            let node = NodeRef::Trigger(id.clone());
            let idx = graph.add_node(node.clone());
            node_map.insert(node, idx);
        }
        for id in script.locals.keys() {
            let node = NodeRef::Local(*id);
            let idx = graph.add_node(node.clone());
            node_map.insert(node, idx);
        }

        let mut seen: HashSet<(NodeIndex, NodeIndex, RelationKind)> = HashSet::new();
        let mut dropped = 0_usize;
        for relation in relations {
            let (Some(&source), Some(&target)) = (
                node_map.get(&relation.source),
                node_map.get(&relation.target),
            ) else {
                dropped += 1;
                continue;
            };
            if seen.insert((source, target, relation.kind)) {
                graph.add_edge(source, target, relation.kind);
            }
        }
        if dropped > 0 {
            debug!(dropped, "dropped relations with undeclared endpoints");
        }

        let content_hash = compute_edge_hash(&graph);
        Self {
            graph,
            node_map,
            content_hash,
        }
    }

    #[must_use]
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Look up the `NodeIndex` for an endpoint.
    #[must_use]
    pub fn node_index(&self, node: &NodeRef) -> Option<NodeIndex> {
        self.node_map.get(node).copied()
    }

    /// Emphasis weight: the number of distinct edges touching the node.
    ///
    /// Drives node sizing in the renderer. A self-loop touches its node
    /// once, so it contributes one, not two.
    #[must_use]
    pub fn emphasis_weight(&self, node: NodeIndex) -> usize {
        let outgoing = self.graph.edges_directed(node, Direction::Outgoing).count();
        let incoming = self
            .graph
            .edges_directed(node, Direction::Incoming)
            .filter(|edge| edge.source() != edge.target())
            .count();
        outgoing + incoming
    }
}

/// Hash the sorted `(source, target, kind)` triples.
fn compute_edge_hash(graph: &DiGraph<NodeRef, RelationKind>) -> String {
    let mut edges: Vec<(String, String, &'static str)> = graph
        .edge_references()
        .filter_map(|edge| {
            let source = graph.node_weight(edge.source())?;
            let target = graph.node_weight(edge.target())?;
            Some((
                source.to_string(),
                target.to_string(),
                edge.weight().as_str(),
            ))
        })
        .collect();
    edges.sort_unstable();

    let mut hasher = blake3::Hasher::new();
    for (source, target, kind) in edges {
        hasher.update(source.as_bytes());
        hasher.update(b"\x00");
        hasher.update(target.as_bytes());
        hasher.update(b"\x00");
        hasher.update(kind.as_bytes());
        hasher.update(b"\x00");
    }
    format!("blake3:{}", hasher.finalize())
}

// ---------------------------------------------------------------------------
// GraphStats
// ---------------------------------------------------------------------------

/// Summary statistics for a built graph.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct GraphStats {
    pub node_count: usize,
    pub edge_count: usize,
    pub trigger_nodes: usize,
    pub variable_nodes: usize,
    /// Nodes with no edges at all.
    pub isolated_nodes: usize,
    /// Highest emphasis weight over all nodes.
    pub max_weight: usize,
    /// Edge counts per relation type, for the legend.
    pub edges_by_kind: std::collections::BTreeMap<RelationKind, usize>,
}

impl GraphStats {
    #[must_use]
    pub fn from_graph(graph: &TriggerGraph) -> Self {
        let mut trigger_nodes = 0;
        let mut variable_nodes = 0;
        let mut isolated_nodes = 0;
        let mut max_weight = 0;
        for idx in graph.graph.node_indices() {
            match graph.graph[idx].kind() {
                NodeKind::Trigger => trigger_nodes += 1,
                NodeKind::LocalVar => variable_nodes += 1,
            }
            let weight = graph.emphasis_weight(idx);
            if weight == 0 {
                isolated_nodes += 1;
            }
            max_weight = max_weight.max(weight);
        }

        let mut edges_by_kind = std::collections::BTreeMap::new();
        for edge in graph.graph.edge_references() {
            *edges_by_kind.entry(*edge.weight()).or_insert(0) += 1;
        }

        Self {
            node_count: graph.node_count(),
            edge_count: graph.edge_count(),
            trigger_nodes,
            variable_nodes,
            isolated_nodes,
            max_weight,
            edges_by_kind,
        }
    }
}
