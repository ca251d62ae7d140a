//! Ingestion of the external parser's normalized record set.
//!
//! The map parser emits four JSON documents per map:
//!
//! - `<map>_triggers.json` — id → trigger row (house, linked trigger,
//!   name, firing gates)
//! - `<map>_events.json`   — id → condition entries
//! - `<map>_actions.json`  — id → action entries
//! - `<map>_locals.json`   — index → local variable (optional)
//!
//! This module joins them into one [`MapScript`]. Rows that reference a
//! trigger id with no trigger row are dropped with a diagnostic rather
//! than materialized — the relationship engine never invents records.

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

use crate::diag::DiagnosticReport;
use crate::model::{
    Action, Condition, LocalId, LocalVariable, MapScript, ParamValue, Persistence, Trigger,
    TriggerId, ACTION_PARAMS,
};

/// Errors while locating or parsing a record document.
#[derive(Debug, Error)]
pub enum RecordError {
    #[error("missing {kind} document under {dir} (tried {tried})")]
    MissingDocument {
        kind: &'static str,
        dir: PathBuf,
        tried: String,
    },
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

// ---------------------------------------------------------------------------
// Wire rows
// ---------------------------------------------------------------------------

const fn one() -> i64 {
    1
}

#[derive(Debug, Deserialize)]
struct TriggerRow {
    #[serde(default)]
    house: String,
    #[serde(default)]
    linked_trigger: Option<String>,
    #[serde(default)]
    name: String,
    #[serde(default)]
    disabled: i64,
    #[serde(default = "one")]
    easy: i64,
    #[serde(default = "one")]
    normal: i64,
    #[serde(default = "one")]
    hard: i64,
    #[serde(default)]
    persistence: i64,
}

#[derive(Debug, Deserialize)]
struct EventsRow {
    #[serde(default)]
    conditions: Vec<ConditionRow>,
}

#[derive(Debug, Deserialize)]
struct ConditionRow {
    cond_id: i32,
    #[serde(default)]
    p1: Option<ParamValue>,
    #[serde(default)]
    p2: Option<ParamValue>,
    #[serde(default)]
    p3: Option<ParamValue>,
}

#[derive(Debug, Deserialize)]
struct ActionsRow {
    #[serde(default)]
    actions: Vec<ActionEntryRow>,
}

#[derive(Debug, Deserialize)]
struct ActionEntryRow {
    act_id: i32,
    #[serde(default)]
    p1: Option<ParamValue>,
    #[serde(default)]
    p2: Option<ParamValue>,
    #[serde(default)]
    p3: Option<ParamValue>,
    #[serde(default)]
    p4: Option<ParamValue>,
    #[serde(default)]
    p5: Option<ParamValue>,
    #[serde(default)]
    p6: Option<ParamValue>,
    #[serde(default)]
    p7: Option<ParamValue>,
}

#[derive(Debug, Deserialize)]
struct LocalRow {
    #[serde(default)]
    id: Option<u32>,
    #[serde(default)]
    name: String,
    #[serde(default)]
    initial: i64,
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// Load one map's record set from `map_dir`.
///
/// Documents are resolved as `<map_name>_<kind>.json`, falling back to
/// `<kind>.json`. Triggers, events, and actions are required; locals are
/// optional. Join problems (orphaned rows, bad local indexes, unknown
/// persistence codes) are recorded in `report` and never abort the load.
///
/// # Errors
///
/// Returns [`RecordError`] when a required document is missing, cannot be
/// read, or is not valid JSON.
pub fn load_map_dir(
    map_dir: &Path,
    map_name: &str,
    report: &mut DiagnosticReport,
) -> Result<MapScript, RecordError> {
    let triggers: BTreeMap<String, TriggerRow> =
        read_document(map_dir, map_name, "triggers")?;
    let events: BTreeMap<String, EventsRow> = read_document(map_dir, map_name, "events")?;
    let actions: BTreeMap<String, ActionsRow> = read_document(map_dir, map_name, "actions")?;
    let locals: BTreeMap<String, LocalRow> = match resolve_document(map_dir, map_name, "locals")
    {
        Ok(path) => read_json(&path)?,
        Err(_) => {
            debug!(dir = %map_dir.display(), "no locals document; map declares no variables");
            BTreeMap::new()
        }
    };

    Ok(assemble(map_name, triggers, events, actions, locals, report))
}

fn read_document<T>(map_dir: &Path, map_name: &str, kind: &'static str) -> Result<T, RecordError>
where
    T: for<'de> Deserialize<'de>,
{
    let path = resolve_document(map_dir, map_name, kind)?;
    read_json(&path)
}

/// Resolve `<map>_<kind>.json`, falling back to `<kind>.json`.
fn resolve_document(
    map_dir: &Path,
    map_name: &str,
    kind: &'static str,
) -> Result<PathBuf, RecordError> {
    let candidates = [
        map_dir.join(format!("{map_name}_{kind}.json")),
        map_dir.join(format!("{kind}.json")),
    ];
    for candidate in &candidates {
        if candidate.exists() {
            return Ok(candidate.clone());
        }
    }
    Err(RecordError::MissingDocument {
        kind,
        dir: map_dir.to_path_buf(),
        tried: candidates
            .iter()
            .map(|p| p.display().to_string())
            .collect::<Vec<_>>()
            .join(", "),
    })
}

fn read_json<T>(path: &Path) -> Result<T, RecordError>
where
    T: for<'de> Deserialize<'de>,
{
    let text = std::fs::read_to_string(path).map_err(|source| RecordError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| RecordError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

// ---------------------------------------------------------------------------
// Assembly
// ---------------------------------------------------------------------------

fn assemble(
    map_name: &str,
    trigger_rows: BTreeMap<String, TriggerRow>,
    event_rows: BTreeMap<String, EventsRow>,
    action_rows: BTreeMap<String, ActionsRow>,
    local_rows: BTreeMap<String, LocalRow>,
    report: &mut DiagnosticReport,
) -> MapScript {
    let mut script = MapScript {
        name: map_name.to_string(),
        ..MapScript::default()
    };

    for (raw_id, row) in trigger_rows {
        let id = TriggerId::new(&raw_id);
        let persistence = Persistence::from_code(row.persistence).unwrap_or_else(|| {
            report.warning(
                format!("trigger {id}"),
                format!("unknown persistence code {}", row.persistence),
            );
            Persistence::Volatile
        });
        let trigger = Trigger {
            id: id.clone(),
            name: row.name,
            house: row.house,
            linked: linked_id(row.linked_trigger.as_deref()).into_iter().collect(),
            disabled: row.disabled != 0,
            easy: row.easy != 0,
            normal: row.normal != 0,
            hard: row.hard != 0,
            persistence,
            conditions: Vec::new(),
            actions: Vec::new(),
        };
        script.triggers.insert(id, trigger);
    }

    for (raw_id, row) in event_rows {
        let id = TriggerId::new(&raw_id);
        if let Some(trigger) = script.triggers.get_mut(&id) {
            trigger.conditions = row.conditions.into_iter().map(into_condition).collect();
        } else {
            report.warning("records", format!("events row for unknown trigger {id}"));
        }
    }

    for (raw_id, row) in action_rows {
        let id = TriggerId::new(&raw_id);
        if let Some(trigger) = script.triggers.get_mut(&id) {
            trigger.actions = row.actions.into_iter().map(into_action).collect();
        } else {
            report.warning("records", format!("actions row for unknown trigger {id}"));
        }
    }

    for (key, row) in local_rows {
        let Some(index) = row.id.or_else(|| key.trim().parse().ok()) else {
            report.warning("records", format!("local variable with bad index '{key}'"));
            continue;
        };
        let id = LocalId(index);
        script.locals.insert(
            id,
            LocalVariable {
                id,
                name: row.name,
                initial: row.initial != 0,
            },
        );
    }

    script
}

/// Decode a linked-trigger field; the parser emits `null`, and older
/// record sets use `<none>` / `0` placeholders.
fn linked_id(raw: Option<&str>) -> Option<TriggerId> {
    let token = raw?.trim();
    if token.is_empty() {
        return None;
    }
    let lowered = token.to_ascii_lowercase();
    if matches!(lowered.as_str(), "<none>" | "none" | "null" | "0") {
        return None;
    }
    Some(TriggerId::new(token))
}

fn into_condition(row: ConditionRow) -> Condition {
    let mut params = vec![
        row.p1.unwrap_or(ParamValue::Int(0)),
        row.p2.unwrap_or(ParamValue::Int(0)),
    ];
    if let Some(p3) = row.p3 {
        params.push(p3);
    }
    Condition {
        opcode: row.cond_id,
        params,
    }
}

fn into_action(row: ActionEntryRow) -> Action {
    let mut params: Vec<ParamValue> = [
        row.p1, row.p2, row.p3, row.p4, row.p5, row.p6, row.p7,
    ]
    .into_iter()
    .map(|p| p.unwrap_or(ParamValue::Int(0)))
    .collect();

    // The format carries a trailing waypoint marker in the last slot for
    // actions that take no waypoint; it is not a real parameter.
    if let Some(ParamValue::Text(last)) = params.last() {
        if last.eq_ignore_ascii_case("a") {
            params[ACTION_PARAMS - 1] = ParamValue::Int(0);
        }
    }

    Action {
        opcode: row.act_id,
        params,
    }
}
