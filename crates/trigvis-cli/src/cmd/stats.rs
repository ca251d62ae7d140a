//! `trigvis stats` — graph summary without writing the document.

use std::fmt::Write as FmtWrite;

use anyhow::Result;
use clap::Args;
use serde_json::json;

use trigvis_core::diag::Severity;
use trigvis_graph::{classify_map, GraphStats, TriggerGraph};

use crate::cmd::{load_inputs, MapArgs};
use crate::output::{render, OutputMode};

/// Arguments for `trigvis stats`.
#[derive(Args, Debug)]
pub struct StatsArgs {
    #[command(flatten)]
    pub map: MapArgs,

    /// How many high-emphasis nodes to list.
    #[arg(long, default_value_t = 5)]
    pub top: usize,
}

pub fn run(args: &StatsArgs, output: OutputMode) -> Result<()> {
    let inputs = load_inputs(&args.map)?;
    let mut report = inputs.report;

    let relations = classify_map(&inputs.script, &inputs.dict, &mut report);
    let graph = TriggerGraph::from_script(&inputs.script, &relations);
    let stats = GraphStats::from_graph(&graph);

    // Highest-emphasis nodes: the renderer draws these biggest.
    let mut by_weight: Vec<(String, usize)> = graph
        .graph
        .node_indices()
        .map(|idx| (graph.graph[idx].to_string(), graph.emphasis_weight(idx)))
        .filter(|(_, weight)| *weight > 0)
        .collect();
    by_weight.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
    by_weight.truncate(args.top);

    let value = json!({
        "map": &inputs.script.name,
        "stats": &stats,
        "top_emphasis": by_weight
            .iter()
            .map(|(id, weight)| json!({"id": id, "weight": weight}))
            .collect::<Vec<_>>(),
        "content_hash": &graph.content_hash,
        "diagnostics": {
            "warnings": report.count(Severity::Warning),
            "infos": report.count(Severity::Info),
        },
    });

    render(output, &value, |_, w| {
        let mut out = String::new();
        let _ = writeln!(out, "Trigger graph for map '{}'", inputs.script.name);
        let _ = writeln!(out, "  trigger nodes:  {}", stats.trigger_nodes);
        let _ = writeln!(out, "  variable nodes: {}", stats.variable_nodes);
        let _ = writeln!(out, "  edges:          {}", stats.edge_count);
        let _ = writeln!(out, "  isolated nodes: {}", stats.isolated_nodes);

        if !stats.edges_by_kind.is_empty() {
            let _ = writeln!(out, "\n  edges by type:");
            for (kind, count) in &stats.edges_by_kind {
                let _ = writeln!(out, "    {kind:<16} {count}");
            }
        }

        if !by_weight.is_empty() {
            let _ = writeln!(out, "\n  highest emphasis:");
            for (id, weight) in &by_weight {
                let _ = writeln!(out, "    {id} ({weight} edge(s))");
            }
        }

        let warnings = report.count(Severity::Warning);
        if warnings > 0 {
            let _ = writeln!(out, "\n  ⚠ {warnings} diagnostic warning(s); run build --json for details");
        }

        if stats.edge_count == 0 {
            let _ = writeln!(out, "\n  (no relationships inferred)");
        }

        w.write_all(out.as_bytes())
    })
}
