//! `trigvis inspect` — one trigger's resolved entries and relations.

use std::fmt::Write as FmtWrite;

use anyhow::Result;
use clap::Args;
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use serde_json::json;

use trigvis_core::describe::{describe_action, describe_condition};
use trigvis_core::model::TriggerId;
use trigvis_graph::{classify_map, NodeRef, TriggerGraph};

use crate::cmd::{load_inputs, MapArgs};
use crate::output::{render, render_error, CliError, OutputMode};

/// Arguments for `trigvis inspect`.
#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Trigger id (padding optional: 1480000 and 01480000 both work).
    pub id: String,

    #[command(flatten)]
    pub map: MapArgs,
}

pub fn run(args: &InspectArgs, output: OutputMode) -> Result<()> {
    let inputs = load_inputs(&args.map)?;
    let mut report = inputs.report;

    let id = TriggerId::new(&args.id);
    let Some(trigger) = inputs.script.trigger(&id) else {
        let msg = format!("trigger not found: {id}");
        render_error(output, &CliError::new(&msg))?;
        anyhow::bail!("{msg}");
    };

    let relations = classify_map(&inputs.script, &inputs.dict, &mut report);
    let graph = TriggerGraph::from_script(&inputs.script, &relations);

    let conditions: Vec<String> = trigger
        .conditions
        .iter()
        .map(|c| describe_condition(c, &inputs.dict))
        .collect();
    let actions: Vec<String> = trigger
        .actions
        .iter()
        .map(|a| describe_action(a, &inputs.dict))
        .collect();

    // Relations touching this trigger, split by direction.
    let node = NodeRef::Trigger(id.clone());
    let (outgoing, incoming) = graph.node_index(&node).map_or_else(
        || (Vec::new(), Vec::new()),
        |idx| {
            let mut outgoing: Vec<(String, String)> = graph
                .graph
                .edges_directed(idx, Direction::Outgoing)
                .map(|e| {
                    (
                        e.weight().as_str().to_string(),
                        graph.graph[e.target()].to_string(),
                    )
                })
                .collect();
            outgoing.sort();
            let mut incoming: Vec<(String, String)> = graph
                .graph
                .edges_directed(idx, Direction::Incoming)
                .map(|e| {
                    (
                        e.weight().as_str().to_string(),
                        graph.graph[e.source()].to_string(),
                    )
                })
                .collect();
            incoming.sort();
            (outgoing, incoming)
        },
    );

    let value = json!({
        "id": id.as_str(),
        "name": &trigger.name,
        "house": &trigger.house,
        "disabled": trigger.disabled,
        "persistence": trigger.persistence.as_str(),
        "conditions": &conditions,
        "actions": &actions,
        "outgoing": outgoing
            .iter()
            .map(|(kind, to)| json!({"type": kind, "target": to}))
            .collect::<Vec<_>>(),
        "incoming": incoming
            .iter()
            .map(|(kind, from)| json!({"type": kind, "source": from}))
            .collect::<Vec<_>>(),
    });

    render(output, &value, |_, w| {
        let mut out = String::new();
        let title = if trigger.name.is_empty() {
            id.to_string()
        } else {
            format!("{id} — {}", trigger.name)
        };
        let _ = writeln!(out, "{title}");
        let _ = writeln!(out, "  house:       {}", trigger.house);
        let _ = writeln!(
            out,
            "  state:       {}",
            if trigger.disabled { "disabled" } else { "enabled" }
        );
        let _ = writeln!(out, "  persistence: {}", trigger.persistence.as_str());

        if !conditions.is_empty() {
            let _ = writeln!(out, "\nconditions:");
            for line in &conditions {
                let _ = writeln!(out, "  • {line}");
            }
        }
        if !actions.is_empty() {
            let _ = writeln!(out, "\nactions:");
            for line in &actions {
                let _ = writeln!(out, "  • {line}");
            }
        }

        let _ = writeln!(out, "\nthis trigger affects:");
        if outgoing.is_empty() {
            let _ = writeln!(out, "  (nothing)");
        }
        for (kind, to) in &outgoing {
            let _ = writeln!(out, "  {kind} → {to}");
        }

        let _ = writeln!(out, "\naffected by:");
        if incoming.is_empty() {
            let _ = writeln!(out, "  (nothing)");
        }
        for (kind, from) in &incoming {
            let _ = writeln!(out, "  {from} → {kind}");
        }

        w.write_all(out.as_bytes())
    })
}
