#![forbid(unsafe_code)]
//! trigvis-graph: relation classification and graph construction.
//!
//! # Pipeline
//!
//! ```text
//! MapScript + OpcodeDict
//!        ↓  classify::classify_map()
//! Vec<Relation> (typed, directed, possibly duplicated)
//!        ↓  build::TriggerGraph::from_script()
//! TriggerGraph (deduplicated petgraph DiGraph + content hash)
//!        ↓  export::GraphDoc::project()
//! GraphDoc (renderer input: nodes, edges, weights, diagnostics)
//! ```
//!
//! The whole pass is synchronous and deterministic; diagnostics accumulate
//! in a [`trigvis_core::DiagnosticReport`] instead of aborting.

pub mod build;
pub mod classify;
pub mod export;
pub mod relation;

// Re-export primary types at crate level for convenience.
pub use build::{GraphStats, TriggerGraph};
pub use classify::{classify_map, Classifier};
pub use export::{EdgeDoc, EdgePair, GraphDoc, NodeDoc};
pub use relation::{NodeKind, NodeRef, Relation, RelationKind};
