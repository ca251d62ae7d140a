//! Ingestion tests over on-disk record documents shaped like the external
//! parser's output.

use std::fs;
use std::path::Path;

use tempfile::TempDir;

use trigvis_core::diag::DiagnosticReport;
use trigvis_core::model::{LocalId, ParamValue, TriggerId};
use trigvis_core::records::{load_map_dir, RecordError};

fn write(dir: &Path, name: &str, body: &str) {
    fs::write(dir.join(name), body).expect("write fixture");
}

/// A small but representative record set: two triggers, a linked trigger,
/// conditions, actions, and one local variable.
fn write_fixture_map(dir: &Path) {
    write(
        dir,
        "skirmish_triggers.json",
        r#"{
            "01480000": {
                "id": "01480000", "house": "Soviets",
                "linked_trigger": null, "name": "Reinforce north",
                "disabled": 0, "easy": 1, "normal": 1, "hard": 1,
                "persistence": 0,
                "source": {"section": "Triggers", "line": 12}
            },
            "01480001": {
                "id": "01480001", "house": "Allies",
                "linked_trigger": "1480000", "name": "Base fallback",
                "disabled": 1, "easy": 1, "normal": 1, "hard": 0,
                "persistence": 2,
                "source": {"section": "Triggers", "line": 13}
            }
        }"#,
    );
    write(
        dir,
        "skirmish_events.json",
        r#"{
            "01480000": {
                "id": "01480000", "num": 1,
                "conditions": [{"cond_id": 36, "p1": 0, "p2": 3, "p3": null}]
            }
        }"#,
    );
    write(
        dir,
        "skirmish_actions.json",
        r#"{
            "01480000": {
                "id": "01480000", "num": 2,
                "actions": [
                    {"act_id": 53, "p1": 2, "p2": "1480001", "p3": 0,
                     "p4": 0, "p5": 0, "p6": 0, "p7": "A"},
                    {"act_id": 41, "p1": 0, "p2": 0, "p3": 0,
                     "p4": 0, "p5": 0, "p6": 0, "p7": 0}
                ]
            }
        }"#,
    );
    write(
        dir,
        "skirmish_locals.json",
        r#"{
            "3": {"id": 3, "name": "HCoreConditionB", "initial": 1,
                  "source": {"section": "VariableNames", "line": 80}}
        }"#,
    );
}

#[test]
fn loads_and_joins_the_four_documents() {
    let dir = TempDir::new().expect("temp dir");
    write_fixture_map(dir.path());

    let mut report = DiagnosticReport::new();
    let script = load_map_dir(dir.path(), "skirmish", &mut report).expect("load");

    assert_eq!(script.triggers.len(), 2);
    assert_eq!(script.locals.len(), 1);
    assert!(report.is_empty(), "clean map loads clean: {report:?}");

    let north = script
        .trigger(&TriggerId::new("01480000"))
        .expect("north trigger");
    assert_eq!(north.house, "Soviets");
    assert_eq!(north.conditions.len(), 1);
    assert_eq!(north.actions.len(), 2);
    assert_eq!(
        north.actions[0].param(2),
        Some(&ParamValue::Text("1480001".into()))
    );

    let fallback = script
        .trigger(&TriggerId::new("01480001"))
        .expect("fallback trigger");
    assert!(fallback.disabled);
    assert_eq!(fallback.linked, vec![TriggerId::new("01480000")]);

    let local = script.local(LocalId(3)).expect("local 3");
    assert_eq!(local.name, "HCoreConditionB");
    assert!(local.initial);
}

#[test]
fn unpadded_document_keys_join_with_padded_ones() {
    let dir = TempDir::new().expect("temp dir");
    write(
        dir.path(),
        "m_triggers.json",
        r#"{"1480000": {"house": "Soviets", "name": "T"}}"#,
    );
    write(
        dir.path(),
        "m_events.json",
        r#"{"01480000": {"conditions": [{"cond_id": 13, "p1": 0, "p2": 9}]}}"#,
    );
    write(dir.path(), "m_actions.json", "{}");

    let mut report = DiagnosticReport::new();
    let script = load_map_dir(dir.path(), "m", &mut report).expect("load");

    let trigger = script.trigger(&TriggerId::new("01480000")).expect("joined");
    assert_eq!(trigger.conditions.len(), 1);
    assert!(report.is_empty());
}

#[test]
fn orphaned_rows_are_reported_not_materialized() {
    let dir = TempDir::new().expect("temp dir");
    write(dir.path(), "m_triggers.json", "{}");
    write(
        dir.path(),
        "m_events.json",
        r#"{"99999999": {"conditions": [{"cond_id": 36, "p1": 0, "p2": 1}]}}"#,
    );
    write(
        dir.path(),
        "m_actions.json",
        r#"{"99999999": {"actions": [{"act_id": 53, "p1": 0, "p2": 1}]}}"#,
    );

    let mut report = DiagnosticReport::new();
    let script = load_map_dir(dir.path(), "m", &mut report).expect("load");

    assert!(script.is_empty(), "no records invented for orphaned rows");
    assert_eq!(report.len(), 2);
}

#[test]
fn locals_document_is_optional() {
    let dir = TempDir::new().expect("temp dir");
    write(dir.path(), "m_triggers.json", "{}");
    write(dir.path(), "m_events.json", "{}");
    write(dir.path(), "m_actions.json", "{}");

    let mut report = DiagnosticReport::new();
    let script = load_map_dir(dir.path(), "m", &mut report).expect("load");
    assert!(script.locals.is_empty());
}

#[test]
fn bare_document_names_are_accepted() {
    let dir = TempDir::new().expect("temp dir");
    write(dir.path(), "triggers.json", r#"{"7": {"name": "only"}}"#);
    write(dir.path(), "events.json", "{}");
    write(dir.path(), "actions.json", "{}");

    let mut report = DiagnosticReport::new();
    let script = load_map_dir(dir.path(), "anything", &mut report).expect("load");
    assert!(script.has_trigger(&TriggerId::new("00000007")));
}

#[test]
fn missing_required_document_is_an_error() {
    let dir = TempDir::new().expect("temp dir");
    write(dir.path(), "m_triggers.json", "{}");

    let mut report = DiagnosticReport::new();
    let err = load_map_dir(dir.path(), "m", &mut report).expect_err("must fail");
    assert!(matches!(err, RecordError::MissingDocument { kind: "events", .. }));
}

#[test]
fn malformed_json_is_an_error_with_the_offending_path() {
    let dir = TempDir::new().expect("temp dir");
    write(dir.path(), "m_triggers.json", "not json");
    write(dir.path(), "m_events.json", "{}");
    write(dir.path(), "m_actions.json", "{}");

    let mut report = DiagnosticReport::new();
    let err = load_map_dir(dir.path(), "m", &mut report).expect_err("must fail");
    assert!(err.to_string().contains("m_triggers.json"));
}
