//! Subcommand implementations.

pub mod build;
pub mod completions;
pub mod inspect;
pub mod stats;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use tracing::debug;

use trigvis_core::diag::DiagnosticReport;
use trigvis_core::dict::OpcodeDict;
use trigvis_core::model::MapScript;
use trigvis_core::records::load_map_dir;

/// Default dictionary locations, relative to the working directory
/// (matching the data layout the dictionary merge tooling writes).
const DEFAULT_ACTIONS_YML: &str = "data/dicts/merged/actions_all.yml";
const DEFAULT_CONDITIONS_YML: &str = "data/dicts/merged/conditions_all.yml";
const DEFAULT_OVERRIDES_DIR: &str = "data/dicts/overrides";

/// Map-loading options shared by every analysis subcommand.
#[derive(Args, Debug)]
pub struct MapArgs {
    /// Directory containing the normalized record documents
    /// (*_triggers.json, *_events.json, *_actions.json, *_locals.json).
    #[arg(long)]
    pub map_dir: PathBuf,

    /// Map name used to resolve document file names. Defaults to the
    /// directory name.
    #[arg(long)]
    pub map: Option<String>,

    /// Actions dictionary YAML.
    #[arg(long)]
    pub actions_yml: Option<PathBuf>,

    /// Conditions dictionary YAML.
    #[arg(long)]
    pub conditions_yml: Option<PathBuf>,

    /// Directory with dictionary override documents.
    #[arg(long)]
    pub overrides_dir: Option<PathBuf>,
}

impl MapArgs {
    /// The effective map name.
    #[must_use]
    pub fn map_name(&self) -> String {
        self.map.clone().unwrap_or_else(|| {
            self.map_dir
                .file_name()
                .map_or_else(|| "map".to_string(), |n| n.to_string_lossy().into_owned())
        })
    }
}

/// Everything a subcommand needs to run the pipeline.
pub struct LoadedInputs {
    pub script: MapScript,
    pub dict: OpcodeDict,
    pub report: DiagnosticReport,
}

/// Load the record set and dictionaries named by `args`.
///
/// Explicitly given dictionary paths must exist. When no flags are given
/// and the default documents are absent, the built-in fallback rules are
/// used so the tool still works on a bare record directory.
///
/// # Errors
///
/// Returns an error when record documents are missing/malformed or an
/// explicitly named dictionary cannot be loaded.
pub fn load_inputs(args: &MapArgs) -> Result<LoadedInputs> {
    let mut report = DiagnosticReport::new();
    let map_name = args.map_name();

    let script = load_map_dir(&args.map_dir, &map_name, &mut report)
        .with_context(|| format!("failed to load records for map '{map_name}'"))?;

    let dict = load_dict(args, &mut report)?;

    Ok(LoadedInputs {
        script,
        dict,
        report,
    })
}

fn load_dict(args: &MapArgs, report: &mut DiagnosticReport) -> Result<OpcodeDict> {
    let explicit = args.actions_yml.is_some() || args.conditions_yml.is_some();
    let actions = args
        .actions_yml
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_ACTIONS_YML));
    let conditions = args
        .conditions_yml
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONDITIONS_YML));

    if !explicit && (!actions.exists() || !conditions.exists()) {
        debug!("no dictionary documents found; using built-in rules only");
        return Ok(OpcodeDict::builtin());
    }

    let overrides = args
        .overrides_dir
        .clone()
        .or_else(|| {
            let default = Path::new(DEFAULT_OVERRIDES_DIR);
            default.is_dir().then(|| default.to_path_buf())
        });

    OpcodeDict::load(&actions, &conditions, overrides.as_deref(), report)
        .context("failed to load opcode dictionaries")
}
