//! `trigvis build` — run the full pipeline and write the graph document.

use std::fmt::Write as FmtWrite;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;
use tracing::info;

use trigvis_core::diag::Severity;
use trigvis_graph::{classify_map, GraphDoc, TriggerGraph};

use crate::cmd::{load_inputs, MapArgs};
use crate::output::{render, OutputMode};
use crate::theme::Theme;

/// Arguments for `trigvis build`.
#[derive(Args, Debug)]
pub struct BuildArgs {
    #[command(flatten)]
    pub map: MapArgs,

    /// Output path for the graph document. Defaults to `<map>_graph.json`.
    #[arg(long)]
    pub out: Option<PathBuf>,

    /// Renderer theme TOML to embed in the document.
    #[arg(long)]
    pub theme: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct BuildSummary {
    map: String,
    out: String,
    nodes: usize,
    edges: usize,
    content_hash: String,
    warnings: usize,
    infos: usize,
}

pub fn run(args: &BuildArgs, output: OutputMode) -> Result<()> {
    let inputs = load_inputs(&args.map)?;
    let mut report = inputs.report;

    let relations = classify_map(&inputs.script, &inputs.dict, &mut report);
    let graph = TriggerGraph::from_script(&inputs.script, &relations);
    let mut doc = GraphDoc::project(&inputs.script, &graph, &inputs.dict, report);

    let theme = Theme::load(args.theme.as_deref())?;
    doc.theme = Some(theme.to_json()?);

    let out = args
        .out
        .clone()
        .unwrap_or_else(|| PathBuf::from(format!("{}_graph.json", doc.map)));
    let payload = serde_json::to_string_pretty(&doc)?;
    std::fs::write(&out, payload)
        .with_context(|| format!("failed to write {}", out.display()))?;
    info!(out = %out.display(), nodes = doc.nodes.len(), edges = doc.edges.len(), "graph written");

    let summary = BuildSummary {
        map: doc.map.clone(),
        out: out.display().to_string(),
        nodes: doc.nodes.len(),
        edges: doc.edges.len(),
        content_hash: doc.content_hash.clone(),
        warnings: doc.diagnostics.count(Severity::Warning),
        infos: doc.diagnostics.count(Severity::Info),
    };

    render(output, &summary, |s, w| {
        let mut text = String::new();
        let _ = writeln!(text, "Graph built: {}", s.out);
        let _ = writeln!(text, "  map:      {}", s.map);
        let _ = writeln!(text, "  nodes:    {}", s.nodes);
        let _ = writeln!(text, "  edges:    {}", s.edges);
        let _ = writeln!(text, "  hash:     {}", s.content_hash);
        if s.warnings + s.infos > 0 {
            let _ = writeln!(
                text,
                "  diagnostics: {} warning(s), {} info (see the document)",
                s.warnings, s.infos
            );
        }
        w.write_all(text.as_bytes())
    })
}
