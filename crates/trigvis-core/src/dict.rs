//! Opcode dictionaries.
//!
//! # Overview
//!
//! The map format identifies condition and action semantics by integer
//! opcode. What those opcodes *mean* — display names, which parameter
//! holds a trigger or variable reference, which edges an action produces —
//! is external YAML configuration, not code. This module loads those
//! documents, layers optional override files on top, and installs built-in
//! fallback rules for the handful of opcodes the relationship engine cannot
//! work without.
//!
//! # Document shape
//!
//! ```yaml
//! actions:
//!   53:
//!     name: Enable trigger
//!     references:
//!       - { param: 2, type: trigger_id }
//!     produces_edges:
//!       - { to: trigger_id, from_param: 2, label: enable }
//! ```
//!
//! A bare opcode map without the `actions:` / `conditions:` top key is
//! accepted too. Opcodes absent from the merged dictionary produce no
//! relations and no errors.

#![allow(clippy::module_name_repetitions)]

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

use crate::diag::DiagnosticReport;

/// Errors while loading a dictionary document.
#[derive(Debug, Error)]
pub enum DictError {
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
        source: serde_yaml::Error,
    },
    #[error("{path} is not a YAML mapping")]
    NotAMapping { path: PathBuf },
}

/// What kind of entity a reference parameter points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetKind {
    Trigger,
    Local,
    Other,
}

/// Classify a dictionary `type` / `to` token.
#[must_use]
pub fn target_kind(token: &str) -> TargetKind {
    match token {
        "trigger_id" => TargetKind::Trigger,
        "local_id" | "local_var" => TargetKind::Local,
        _ => TargetKind::Other,
    }
}

/// Map legacy edge labels onto their canonical names.
#[must_use]
pub fn canon_label(label: &str) -> &str {
    match label {
        "set_local" => "enable_local",
        "clear_local" => "disable_local",
        other => other,
    }
}

/// A tooltip display field: show parameter `param` under `name`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueFieldSpec {
    #[serde(default)]
    pub param: Option<i64>,
    #[serde(default)]
    pub name: Option<String>,
}

/// A reference parameter: parameter `param` holds an id of kind `type`.
///
/// For conditions, `role: depends_on` marks references that produce
/// dependency edges; `polarity` selects the true/false flavor and is left
/// out when the condition's polarity is unknown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceSpec {
    #[serde(default)]
    pub param: Option<i64>,
    #[serde(rename = "type", default)]
    pub target: String,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub polarity: Option<bool>,
}

impl ReferenceSpec {
    #[must_use]
    pub fn is_dependency(&self) -> bool {
        self.role.as_deref() == Some("depends_on")
    }
}

/// An edge production rule: the action's parameter `from_param` names a
/// `to`-kind target, and the edge is labelled `label`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeSpec {
    pub to: String,
    #[serde(default)]
    pub from_param: Option<i64>,
    #[serde(default)]
    pub label: String,
}

/// Dictionary entry for one action opcode.
///
/// Every field is optional so override documents can touch a single key
/// without clobbering the rest (absent means "leave the merged value").
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionSpec {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub value_fields: Option<Vec<ValueFieldSpec>>,
    #[serde(default)]
    pub references: Option<Vec<ReferenceSpec>>,
    #[serde(default)]
    pub produces_edges: Option<Vec<EdgeSpec>>,
}

impl ActionSpec {
    /// Overlay `other` onto `self`, field by field.
    fn merge_from(&mut self, other: Self) {
        if other.name.is_some() {
            self.name = other.name;
        }
        if other.value_fields.is_some() {
            self.value_fields = other.value_fields;
        }
        if other.references.is_some() {
            self.references = other.references;
        }
        if other.produces_edges.is_some() {
            self.produces_edges = other.produces_edges;
        }
    }
}

/// Dictionary entry for one condition opcode.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConditionSpec {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub value_fields: Option<Vec<ValueFieldSpec>>,
    #[serde(default)]
    pub references: Option<Vec<ReferenceSpec>>,
}

impl ConditionSpec {
    fn merge_from(&mut self, other: Self) {
        if other.name.is_some() {
            self.name = other.name;
        }
        if other.value_fields.is_some() {
            self.value_fields = other.value_fields;
        }
        if other.references.is_some() {
            self.references = other.references;
        }
    }
}

// ---------------------------------------------------------------------------
// OpcodeDict
// ---------------------------------------------------------------------------

/// The merged action + condition dictionary handed to the classifier.
///
/// Immutable once built; constructed via [`OpcodeDict::load`] or, for the
/// built-in rules only, [`OpcodeDict::builtin`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OpcodeDict {
    pub actions: BTreeMap<i32, ActionSpec>,
    pub conditions: BTreeMap<i32, ConditionSpec>,
}

/// Built-in edge rules for the core trigger-control actions. Installed
/// only where the merged dictionary is silent.
const FALLBACK_ACTION_EDGES: &[(i32, &str, i64, &str)] = &[
    (12, "trigger_id", 2, "destroy"),
    (22, "trigger_id", 2, "force"),
    (53, "trigger_id", 2, "enable"),
    (54, "trigger_id", 2, "disable"),
    (56, "local_id", 2, "enable_local"),
    (57, "local_id", 2, "disable_local"),
];

/// Built-in dependency references: local-variable-is-true / -is-false.
const FALLBACK_CONDITION_REFS: &[(i32, i64, bool)] = &[(36, 2, true), (37, 2, false)];

impl OpcodeDict {
    /// Load and merge the full dictionary.
    ///
    /// `overrides_dir`, when given, is searched for `actions_edges.yml`
    /// and `conditions_refs.yml`; present files are shallow-merged per
    /// opcode on top of the base documents. Built-in fallback rules are
    /// installed last, only into gaps.
    ///
    /// # Errors
    ///
    /// Returns [`DictError`] when a base or override document cannot be
    /// read or is not valid YAML. Individually malformed opcode entries
    /// are skipped with a diagnostic instead.
    pub fn load(
        actions_path: &Path,
        conditions_path: &Path,
        overrides_dir: Option<&Path>,
        report: &mut DiagnosticReport,
    ) -> Result<Self, DictError> {
        let mut dict = Self {
            actions: load_table(actions_path, "actions", report)?,
            conditions: load_table(conditions_path, "conditions", report)?,
        };

        if let Some(dir) = overrides_dir {
            let actions_over = dir.join("actions_edges.yml");
            if actions_over.exists() {
                let table: BTreeMap<i32, ActionSpec> =
                    load_table(&actions_over, "actions", report)?;
                for (code, spec) in table {
                    dict.actions.entry(code).or_default().merge_from(spec);
                }
                debug!(path = %actions_over.display(), "applied action overrides");
            }

            let conditions_over = dir.join("conditions_refs.yml");
            if conditions_over.exists() {
                let table: BTreeMap<i32, ConditionSpec> =
                    load_table(&conditions_over, "conditions", report)?;
                for (code, spec) in table {
                    dict.conditions.entry(code).or_default().merge_from(spec);
                }
                debug!(path = %conditions_over.display(), "applied condition overrides");
            }
        }

        dict.install_fallback_rules();
        Ok(dict)
    }

    /// Dictionary containing only the built-in fallback rules.
    #[must_use]
    pub fn builtin() -> Self {
        let mut dict = Self::default();
        dict.install_fallback_rules();
        dict
    }

    #[must_use]
    pub fn action(&self, opcode: i32) -> Option<&ActionSpec> {
        self.actions.get(&opcode)
    }

    #[must_use]
    pub fn condition(&self, opcode: i32) -> Option<&ConditionSpec> {
        self.conditions.get(&opcode)
    }

    fn install_fallback_rules(&mut self) {
        for &(code, to, from_param, label) in FALLBACK_ACTION_EDGES {
            let entry = self.actions.entry(code).or_default();
            if entry.produces_edges.is_none() {
                entry.produces_edges = Some(vec![EdgeSpec {
                    to: to.to_string(),
                    from_param: Some(from_param),
                    label: label.to_string(),
                }]);
            }
        }

        for &(code, param, polarity) in FALLBACK_CONDITION_REFS {
            let entry = self.conditions.entry(code).or_default();
            if entry.references.is_none() {
                entry.references = Some(vec![ReferenceSpec {
                    param: Some(param),
                    target: "local_id".to_string(),
                    role: Some("depends_on".to_string()),
                    polarity: Some(polarity),
                }]);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// YAML plumbing
// ---------------------------------------------------------------------------

/// Load one opcode table from a YAML document.
///
/// Accepts either `{ <top_key>: { <code>: spec, … } }` or a bare
/// `{ <code>: spec, … }` mapping. Non-integer keys and entries that fail
/// to deserialize are skipped with a diagnostic.
fn load_table<T>(
    path: &Path,
    top_key: &str,
    report: &mut DiagnosticReport,
) -> Result<BTreeMap<i32, T>, DictError>
where
    T: for<'de> Deserialize<'de>,
{
    let text = std::fs::read_to_string(path).map_err(|source| DictError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let doc: serde_yaml::Value =
        serde_yaml::from_str(&text).map_err(|source| DictError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

    let table = match &doc {
        serde_yaml::Value::Mapping(map) => doc
            .get(top_key)
            .and_then(serde_yaml::Value::as_mapping)
            .cloned()
            .unwrap_or_else(|| map.clone()),
        _ => {
            return Err(DictError::NotAMapping {
                path: path.to_path_buf(),
            });
        }
    };

    let context = format!("dictionary {}", path.display());
    let mut out = BTreeMap::new();
    for (key, value) in table {
        let Some(code) = opcode_key(&key) else {
            debug!(?key, "skipping non-opcode dictionary key");
            continue;
        };
        match serde_yaml::from_value::<T>(value) {
            Ok(spec) => {
                out.insert(code, spec);
            }
            Err(err) => {
                report.warning(&context, format!("opcode {code}: {err}"));
            }
        }
    }
    Ok(out)
}

/// Interpret a YAML mapping key as an opcode.
fn opcode_key(key: &serde_yaml::Value) -> Option<i32> {
    match key {
        serde_yaml::Value::Number(n) => n.as_i64().and_then(|v| i32::try_from(v).ok()),
        serde_yaml::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
