//! Human-readable descriptions of condition/action entries.
//!
//! Node tooltips show each entry as `Name (field=value, …)`. The
//! dictionary's `value_fields` are rendered first (they carry curated
//! display names), then `references` fill in parameters not already
//! shown. Values render according to the reference type hint: id-like
//! types zero-pad to the canonical eight digits, waypoint letters decode
//! to their numeric index.

use crate::dict::{ActionSpec, ConditionSpec, OpcodeDict, ReferenceSpec, ValueFieldSpec};
use crate::model::{Action, Condition, ParamValue};

/// Shown when an entry has no displayable parameters at all.
const EMPTY_PARAMS: &str = "params=null";

/// Describe one action entry using the dictionary.
#[must_use]
pub fn describe_action(action: &Action, dict: &OpcodeDict) -> String {
    let spec = dict.action(action.opcode);
    let name = spec
        .and_then(|s| s.name.as_deref())
        .map_or_else(|| format!("Action {}", action.opcode), String::from);
    let (value_fields, references) = spec.map_or((None, None), |s: &ActionSpec| {
        (s.value_fields.as_deref(), s.references.as_deref())
    });
    format_entry(&name, &action.params, value_fields, references)
}

/// Describe one condition entry using the dictionary.
#[must_use]
pub fn describe_condition(condition: &Condition, dict: &OpcodeDict) -> String {
    let spec = dict.condition(condition.opcode);
    let name = spec
        .and_then(|s| s.name.as_deref())
        .map_or_else(|| format!("Condition {}", condition.opcode), String::from);
    let (value_fields, references) = spec.map_or((None, None), |s: &ConditionSpec| {
        (s.value_fields.as_deref(), s.references.as_deref())
    });
    format_entry(&name, &condition.params, value_fields, references)
}

fn format_entry(
    name: &str,
    params: &[ParamValue],
    value_fields: Option<&[ValueFieldSpec]>,
    references: Option<&[ReferenceSpec]>,
) -> String {
    let mut pieces: Vec<String> = Vec::new();
    let mut used: Vec<usize> = Vec::new();

    for vf in value_fields.unwrap_or_default() {
        let Some(index) = param_index(vf.param, params.len()) else {
            continue;
        };
        let label = vf
            .name
            .clone()
            .unwrap_or_else(|| format!("P{}", index + 1));
        pieces.push(format!(
            "{label}={}",
            format_value(&params[index], None, &label)
        ));
        used.push(index);
    }

    for reference in references.unwrap_or_default() {
        let Some(index) = param_index(reference.param, params.len()) else {
            continue;
        };
        if used.contains(&index) {
            continue;
        }
        let label = if reference.target.is_empty() {
            format!("P{}", index + 1)
        } else {
            reference.target.clone()
        };
        pieces.push(format!(
            "{label}={}",
            format_value(&params[index], Some(&reference.target), &label)
        ));
        used.push(index);
    }

    if pieces.is_empty() {
        format!("{name} ({EMPTY_PARAMS})")
    } else {
        format!("{name} ({})", pieces.join(", "))
    }
}

/// Convert a one-based dictionary parameter index into a slice index.
fn param_index(one_based: Option<i64>, len: usize) -> Option<usize> {
    let p = one_based?;
    if p < 1 {
        return None;
    }
    let index = usize::try_from(p).ok()? - 1;
    (index < len).then_some(index)
}

/// Render a value under a type hint, falling back to name heuristics.
fn format_value(value: &ParamValue, type_hint: Option<&str>, key: &str) -> String {
    match type_hint {
        Some("trigger_id" | "teamtype_id" | "taskforce_id" | "script_id") => pad8(value),
        Some("waypoint_id") => waypoint(value),
        Some("local_id") => value.as_int().map_or_else(|| value.to_string(), |n| n.to_string()),
        Some(_) => value.to_string(),
        None => {
            let k = key.to_ascii_lowercase();
            if k.contains("waypoint") || k.ends_with("_wp") {
                waypoint(value)
            } else if id_like_key(&k) {
                pad8(value)
            } else {
                value.to_string()
            }
        }
    }
}

/// Keys that conventionally carry zero-padded ids.
fn id_like_key(key: &str) -> bool {
    matches!(key, "trigger_id" | "trigger" | "team_id" | "team" | "taskforce_id" | "taskforce" | "script_id" | "script")
        || key.ends_with("_trigger")
}

fn pad8(value: &ParamValue) -> String {
    value.as_int().map_or_else(
        || value.to_string(),
        |n| {
            if (0..=99_999_999).contains(&n) {
                format!("{n:08}")
            } else {
                n.to_string()
            }
        },
    )
}

/// Decode a one- or two-letter waypoint label to its numeric index
/// (`A` → 0, `Z` → 25, `BA` → 26, `BZ` → 51), passing numeric values
/// straight through.
fn waypoint(value: &ParamValue) -> String {
    if let Some(n) = value.as_int() {
        return n.to_string();
    }
    let ParamValue::Text(s) = value else {
        return value.to_string();
    };
    let bytes = s.as_bytes();
    let all_upper = !s.is_empty() && bytes.iter().all(u8::is_ascii_uppercase);
    if !all_upper {
        return s.clone();
    }
    match bytes {
        [c] => u32::from(c - b'A').to_string(),
        [hi, lo] => (u32::from(hi - b'A') * 26 + u32::from(lo - b'A')).to_string(),
        _ => s.clone(),
    }
}
