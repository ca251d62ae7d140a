//! The graph document handed to the external renderer.
//!
//! Nodes carry everything the renderer needs for labels and click-to-show
//! tooltips (resolved condition/action descriptions, house, initial
//! value); edges carry the relation type and endpoint kind-pair so the
//! external color map can style them. Layout, physics, and theming stay
//! on the renderer's side of the contract.

use serde::Serialize;

use trigvis_core::describe::{describe_action, describe_condition};
use trigvis_core::diag::DiagnosticReport;
use trigvis_core::dict::OpcodeDict;
use trigvis_core::model::MapScript;

use crate::build::{GraphStats, TriggerGraph};
use crate::relation::{NodeKind, NodeRef, RelationKind};

/// Which kinds of node an edge connects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EdgePair {
    #[serde(rename = "trigger-trigger")]
    TriggerTrigger,
    #[serde(rename = "trigger-variable")]
    TriggerVariable,
}

impl EdgePair {
    const fn of(a: NodeKind, b: NodeKind) -> Self {
        match (a, b) {
            (NodeKind::Trigger, NodeKind::Trigger) => Self::TriggerTrigger,
            _ => Self::TriggerVariable,
        }
    }
}

/// One node in the export document, tagged by kind.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind")]
pub enum NodeDoc {
    #[serde(rename = "trigger")]
    Trigger {
        id: String,
        name: String,
        house: String,
        disabled: bool,
        conditions: Vec<String>,
        actions: Vec<String>,
        weight: usize,
    },
    #[serde(rename = "local_var")]
    LocalVar {
        id: String,
        name: String,
        initial: bool,
        weight: usize,
    },
}

/// One typed directed edge in the export document.
#[derive(Debug, Clone, Serialize)]
pub struct EdgeDoc {
    pub source: String,
    pub target: String,
    #[serde(rename = "type")]
    pub kind: RelationKind,
    pub pair: EdgePair,
}

/// The complete renderer input for one map.
#[derive(Debug, Clone, Serialize)]
pub struct GraphDoc {
    pub map: String,
    pub content_hash: String,
    pub stats: GraphStats,
    pub nodes: Vec<NodeDoc>,
    pub edges: Vec<EdgeDoc>,
    pub diagnostics: DiagnosticReport,
    /// Renderer theme, passed through verbatim when the caller loaded one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theme: Option<serde_json::Value>,
}

impl GraphDoc {
    /// Project a built graph into the renderer document.
    #[must_use]
    pub fn project(
        script: &MapScript,
        graph: &TriggerGraph,
        dict: &OpcodeDict,
        diagnostics: DiagnosticReport,
    ) -> Self {
        let mut nodes = Vec::with_capacity(graph.node_count());
        for idx in graph.graph.node_indices() {
            let weight = graph.emphasis_weight(idx);
            match &graph.graph[idx] {
                NodeRef::Trigger(id) => {
                    let Some(trigger) = script.trigger(id) else {
                        continue;
                    };
                    nodes.push(NodeDoc::Trigger {
                        id: id.as_str().to_string(),
                        name: trigger.name.clone(),
                        house: trigger.house.clone(),
                        disabled: trigger.disabled,
                        conditions: trigger
                            .conditions
                            .iter()
                            .map(|c| describe_condition(c, dict))
                            .collect(),
                        actions: trigger
                            .actions
                            .iter()
                            .map(|a| describe_action(a, dict))
                            .collect(),
                        weight,
                    });
                }
                NodeRef::Local(id) => {
                    let Some(local) = script.local(*id) else {
                        continue;
                    };
                    nodes.push(NodeDoc::LocalVar {
                        id: NodeRef::Local(*id).to_string(),
                        name: local.name.clone(),
                        initial: local.initial,
                        weight,
                    });
                }
            }
        }

        let edges = graph
            .graph
            .edge_indices()
            .filter_map(|edge| {
                let (a, b) = graph.graph.edge_endpoints(edge)?;
                let source = &graph.graph[a];
                let target = &graph.graph[b];
                Some(EdgeDoc {
                    source: source.to_string(),
                    target: target.to_string(),
                    kind: graph.graph[edge],
                    pair: EdgePair::of(source.kind(), target.kind()),
                })
            })
            .collect();

        Self {
            map: script.name.clone(),
            content_hash: graph.content_hash.clone(),
            stats: GraphStats::from_graph(graph),
            nodes,
            edges,
            diagnostics,
            theme: None,
        }
    }
}
