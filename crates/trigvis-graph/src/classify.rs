//! Relation classification.
//!
//! # Overview
//!
//! The classifier walks one trigger at a time and derives typed relations
//! from three sources:
//!
//! - **action entries**, via the dictionary's `produces_edges` rules
//!   (edge runs trigger → target);
//! - **condition entries**, via `depends_on` references to local
//!   variables (edge runs variable → trigger, so forward traversal reads
//!   "what this enables");
//! - **linked-trigger declarations** (edge runs declarer → linked).
//!
//! There is no per-opcode control flow: everything is a lookup into the
//! [`OpcodeDict`] table, so adding support for a new modding-platform
//! opcode is a dictionary edit, not a code change.
//!
//! # Failure policy
//!
//! Nothing here aborts a build. References to ids absent from the record
//! set, rules with unusable parameter indexes, and labels outside the
//! relation taxonomy each skip one relation and record a diagnostic.
//! Opcodes the dictionary does not know produce no relation and at most
//! one informational diagnostic per distinct opcode.

#![allow(clippy::module_name_repetitions)]

use std::collections::BTreeSet;

use tracing::trace;

use trigvis_core::diag::DiagnosticReport;
use trigvis_core::dict::{canon_label, target_kind, OpcodeDict, TargetKind};
use trigvis_core::model::{
    Action, Condition, MapScript, Trigger, ACTION_PARAMS, CONDITION_PARAMS,
};

use crate::relation::{NodeRef, Relation, RelationKind};

/// Classify every trigger in `script` against `dict`.
///
/// Output order follows the script's (sorted) trigger order, but callers
/// must not depend on it: the builder identifies edges by
/// `(source, target, kind)`, so classification order never changes the
/// resulting edge set.
#[must_use]
pub fn classify_map(
    script: &MapScript,
    dict: &OpcodeDict,
    report: &mut DiagnosticReport,
) -> Vec<Relation> {
    let mut classifier = Classifier::new(script, dict);
    let mut relations = Vec::new();
    for trigger in script.triggers.values() {
        classifier.classify_into(trigger, report, &mut relations);
    }
    trace!(
        triggers = script.triggers.len(),
        relations = relations.len(),
        "classified map"
    );
    relations
}

/// Per-map classification state.
///
/// Holds the record set and dictionary plus the set of opcodes already
/// reported as unknown, so a map with two hundred uses of one exotic
/// opcode yields one diagnostic, not two hundred.
pub struct Classifier<'a> {
    script: &'a MapScript,
    dict: &'a OpcodeDict,
    unknown_actions: BTreeSet<i32>,
    unknown_conditions: BTreeSet<i32>,
}

impl<'a> Classifier<'a> {
    #[must_use]
    pub const fn new(script: &'a MapScript, dict: &'a OpcodeDict) -> Self {
        Self {
            script,
            dict,
            unknown_actions: BTreeSet::new(),
            unknown_conditions: BTreeSet::new(),
        }
    }

    /// Classify one trigger, appending its relations to `out`.
    pub fn classify_into(
        &mut self,
        trigger: &Trigger,
        report: &mut DiagnosticReport,
        out: &mut Vec<Relation>,
    ) {
        self.classify_linked(trigger, report, out);
        for (index, action) in trigger.actions.iter().enumerate() {
            self.classify_action(trigger, index, action, report, out);
        }
        for (index, condition) in trigger.conditions.iter().enumerate() {
            self.classify_condition(trigger, index, condition, report, out);
        }
    }

    fn classify_linked(
        &self,
        trigger: &Trigger,
        report: &mut DiagnosticReport,
        out: &mut Vec<Relation>,
    ) {
        for linked in &trigger.linked {
            if self.script.has_trigger(linked) {
                out.push(Relation {
                    source: NodeRef::Trigger(trigger.id.clone()),
                    target: NodeRef::Trigger(linked.clone()),
                    kind: RelationKind::Linked,
                });
            } else {
                report.warning(
                    format!("trigger {}", trigger.id),
                    format!("linked trigger {linked} does not exist"),
                );
            }
        }
    }

    fn classify_action(
        &mut self,
        trigger: &Trigger,
        index: usize,
        action: &Action,
        report: &mut DiagnosticReport,
        out: &mut Vec<Relation>,
    ) {
        let Some(spec) = self.dict.action(action.opcode) else {
            if self.unknown_actions.insert(action.opcode) {
                report.info(
                    "dictionary",
                    format!("unknown action opcode {}", action.opcode),
                );
            }
            return;
        };
        let Some(rules) = spec.produces_edges.as_deref() else {
            return;
        };

        let context = format!("trigger {} action {}", trigger.id, index + 1);
        for rule in rules {
            let Some(kind) = RelationKind::from_label(canon_label(&rule.label)) else {
                report.info(
                    &context,
                    format!("edge label '{}' is outside the relation taxonomy", rule.label),
                );
                continue;
            };
            let Some(param_no) = valid_param(rule.from_param, ACTION_PARAMS) else {
                report.warning(
                    &context,
                    format!(
                        "edge rule for opcode {} has no usable parameter index",
                        action.opcode
                    ),
                );
                continue;
            };
            let Some(value) = action.param(param_no) else {
                report.warning(&context, format!("parameter {param_no} is missing"));
                continue;
            };

            let target = match target_kind(&rule.to) {
                TargetKind::Trigger => {
                    let Some(id) = value.as_trigger_id() else {
                        report.warning(
                            &context,
                            format!("parameter {param_no} is not a trigger reference"),
                        );
                        continue;
                    };
                    if !self.script.has_trigger(&id) {
                        report.warning(&context, format!("references missing trigger {id}"));
                        continue;
                    }
                    NodeRef::Trigger(id)
                }
                TargetKind::Local => {
                    let Some(id) = value.as_local_id() else {
                        report.warning(
                            &context,
                            format!("parameter {param_no} is not a local-variable index"),
                        );
                        continue;
                    };
                    if !self.script.has_local(id) {
                        report.warning(
                            &context,
                            format!("references missing local variable {id}"),
                        );
                        continue;
                    }
                    NodeRef::Local(id)
                }
                TargetKind::Other => {
                    report.info(
                        &context,
                        format!("edge target kind '{}' is not representable", rule.to),
                    );
                    continue;
                }
            };

            out.push(Relation {
                source: NodeRef::Trigger(trigger.id.clone()),
                target,
                kind,
            });
        }
    }

    fn classify_condition(
        &mut self,
        trigger: &Trigger,
        index: usize,
        condition: &Condition,
        report: &mut DiagnosticReport,
        out: &mut Vec<Relation>,
    ) {
        let Some(spec) = self.dict.condition(condition.opcode) else {
            if self.unknown_conditions.insert(condition.opcode) {
                report.info(
                    "dictionary",
                    format!("unknown condition opcode {}", condition.opcode),
                );
            }
            return;
        };
        let Some(references) = spec.references.as_deref() else {
            return;
        };

        let context = format!("trigger {} condition {}", trigger.id, index + 1);
        for reference in references {
            // Only local-variable dependencies are representable as edges;
            // other reference kinds exist purely for tooltip display.
            if !reference.is_dependency() || target_kind(&reference.target) != TargetKind::Local
            {
                continue;
            }
            let Some(param_no) = valid_param(reference.param, CONDITION_PARAMS) else {
                report.warning(
                    &context,
                    format!(
                        "dependency rule for opcode {} has no usable parameter index",
                        condition.opcode
                    ),
                );
                continue;
            };
            let Some(value) = condition.param(param_no) else {
                report.warning(&context, format!("parameter {param_no} is missing"));
                continue;
            };
            let Some(id) = value.as_local_id() else {
                report.warning(
                    &context,
                    format!("parameter {param_no} is not a local-variable index"),
                );
                continue;
            };
            if !self.script.has_local(id) {
                report.warning(&context, format!("references missing local variable {id}"));
                continue;
            }

            let kind = match reference.polarity {
                Some(true) => RelationKind::DependsOnTrue,
                Some(false) => RelationKind::DependsOnFalse,
                None => RelationKind::DependsOn,
            };
            // Dependency edges point from the variable toward the trigger
            // that waits on it.
            out.push(Relation {
                source: NodeRef::Local(id),
                target: NodeRef::Trigger(trigger.id.clone()),
                kind,
            });
        }
    }
}

/// Validate a one-based dictionary parameter index against an arity.
fn valid_param(raw: Option<i64>, max: usize) -> Option<usize> {
    let p = raw?;
    let p = usize::try_from(p).ok()?;
    (1..=max).contains(&p).then_some(p)
}
