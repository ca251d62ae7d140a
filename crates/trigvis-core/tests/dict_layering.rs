//! Dictionary layering tests: base documents, override files, and the
//! built-in fallback rules, in precedence order.

use std::fs;
use std::path::Path;

use tempfile::TempDir;

use trigvis_core::diag::DiagnosticReport;
use trigvis_core::dict::{DictError, OpcodeDict};

fn write(dir: &Path, name: &str, body: &str) {
    fs::write(dir.join(name), body).expect("write fixture");
}

const BASE_ACTIONS: &str = r"
actions:
  53:
    name: Enable trigger
    references:
      - { param: 2, type: trigger_id }
    produces_edges:
      - { to: trigger_id, from_param: 2, label: enable }
  80:
    name: Play speech
    value_fields:
      - { param: 1, name: speech }
";

const BASE_CONDITIONS: &str = r"
conditions:
  36:
    name: Local is set
    references:
      - { param: 2, type: local_id, role: depends_on, polarity: true }
";

#[test]
fn base_documents_load_under_their_top_key() {
    let dir = TempDir::new().expect("temp dir");
    write(dir.path(), "actions_all.yml", BASE_ACTIONS);
    write(dir.path(), "conditions_all.yml", BASE_CONDITIONS);

    let mut report = DiagnosticReport::new();
    let dict = OpcodeDict::load(
        &dir.path().join("actions_all.yml"),
        &dir.path().join("conditions_all.yml"),
        None,
        &mut report,
    )
    .expect("load");

    assert_eq!(
        dict.action(53).and_then(|s| s.name.as_deref()),
        Some("Enable trigger")
    );
    assert_eq!(
        dict.action(80).and_then(|s| s.name.as_deref()),
        Some("Play speech")
    );
    assert!(report.is_empty());
}

#[test]
fn bare_opcode_maps_are_accepted() {
    let dir = TempDir::new().expect("temp dir");
    write(dir.path(), "a.yml", "54:\n  name: Disable trigger\n");
    write(dir.path(), "c.yml", "37:\n  name: Local is clear\n");

    let mut report = DiagnosticReport::new();
    let dict = OpcodeDict::load(
        &dir.path().join("a.yml"),
        &dir.path().join("c.yml"),
        None,
        &mut report,
    )
    .expect("load");

    assert_eq!(
        dict.action(54).and_then(|s| s.name.as_deref()),
        Some("Disable trigger")
    );
}

#[test]
fn overrides_replace_named_fields_and_keep_the_rest() {
    let dir = TempDir::new().expect("temp dir");
    write(dir.path(), "actions_all.yml", BASE_ACTIONS);
    write(dir.path(), "conditions_all.yml", BASE_CONDITIONS);

    let overrides = dir.path().join("overrides");
    fs::create_dir(&overrides).expect("mkdir");
    write(
        &overrides,
        "actions_edges.yml",
        r"
actions:
  53:
    produces_edges:
      - { to: trigger_id, from_param: 3, label: enable }
",
    );

    let mut report = DiagnosticReport::new();
    let dict = OpcodeDict::load(
        &dir.path().join("actions_all.yml"),
        &dir.path().join("conditions_all.yml"),
        Some(&overrides),
        &mut report,
    )
    .expect("load");

    let spec = dict.action(53).expect("53");
    // overridden field
    let edges = spec.produces_edges.as_deref().expect("edges");
    assert_eq!(edges[0].from_param, Some(3));
    // untouched fields survive the merge
    assert_eq!(spec.name.as_deref(), Some("Enable trigger"));
    assert!(spec.references.is_some());
}

#[test]
fn fallback_rules_fill_gaps_but_never_override() {
    let dir = TempDir::new().expect("temp dir");
    // Base names opcode 53 but gives it no edges; 12 is absent entirely.
    write(dir.path(), "a.yml", "53:\n  name: Enable trigger\n");
    write(dir.path(), "c.yml", "{}");

    let mut report = DiagnosticReport::new();
    let dict = OpcodeDict::load(
        &dir.path().join("a.yml"),
        &dir.path().join("c.yml"),
        None,
        &mut report,
    )
    .expect("load");

    // Gap filled: 53 keeps its name and gains the fallback edge rule.
    let spec53 = dict.action(53).expect("53");
    assert_eq!(spec53.name.as_deref(), Some("Enable trigger"));
    assert_eq!(
        spec53.produces_edges.as_deref().expect("edges")[0].label,
        "enable"
    );

    // Absent opcode installed wholesale.
    let spec12 = dict.action(12).expect("12");
    assert_eq!(
        spec12.produces_edges.as_deref().expect("edges")[0].label,
        "destroy"
    );

    // Conditions 36/37 installed with polarity.
    assert_eq!(
        dict.condition(36).expect("36").references.as_deref().expect("refs")[0].polarity,
        Some(true)
    );
    assert_eq!(
        dict.condition(37).expect("37").references.as_deref().expect("refs")[0].polarity,
        Some(false)
    );
}

#[test]
fn explicit_dictionary_edges_beat_fallbacks() {
    let dir = TempDir::new().expect("temp dir");
    write(
        dir.path(),
        "a.yml",
        r"
53:
  produces_edges:
    - { to: trigger_id, from_param: 6, label: enable }
",
    );
    write(dir.path(), "c.yml", "{}");

    let mut report = DiagnosticReport::new();
    let dict = OpcodeDict::load(
        &dir.path().join("a.yml"),
        &dir.path().join("c.yml"),
        None,
        &mut report,
    )
    .expect("load");

    let edges = dict.action(53).expect("53").produces_edges.as_deref().expect("edges");
    assert_eq!(edges[0].from_param, Some(6), "dictionary wins over fallback");
}

#[test]
fn malformed_entries_are_skipped_with_a_diagnostic() {
    let dir = TempDir::new().expect("temp dir");
    write(
        dir.path(),
        "a.yml",
        "53:\n  produces_edges: 12\n54:\n  name: Disable trigger\n",
    );
    write(dir.path(), "c.yml", "{}");

    let mut report = DiagnosticReport::new();
    let dict = OpcodeDict::load(
        &dir.path().join("a.yml"),
        &dir.path().join("c.yml"),
        None,
        &mut report,
    )
    .expect("load");

    // The healthy sibling entry still loads.
    assert_eq!(
        dict.action(54).and_then(|s| s.name.as_deref()),
        Some("Disable trigger")
    );
    assert!(!report.is_empty(), "bad entry surfaced as a diagnostic");
    // The bad entry falls back to the built-in rule for 53.
    assert_eq!(
        dict.action(53).expect("53").produces_edges.as_deref().expect("edges")[0].label,
        "enable"
    );
}

#[test]
fn missing_base_document_is_an_error() {
    let dir = TempDir::new().expect("temp dir");
    write(dir.path(), "c.yml", "{}");

    let mut report = DiagnosticReport::new();
    let err = OpcodeDict::load(
        &dir.path().join("absent.yml"),
        &dir.path().join("c.yml"),
        None,
        &mut report,
    )
    .expect_err("must fail");
    assert!(matches!(err, DictError::Io { .. }));
}
