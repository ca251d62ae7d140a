//! Property tests: the classify-and-build pass is a pure function of the
//! record set, and relation order never changes the built edge set.

use proptest::prelude::*;

use trigvis_core::diag::DiagnosticReport;
use trigvis_core::dict::OpcodeDict;
use trigvis_core::model::{
    Action, Condition, LocalId, LocalVariable, MapScript, ParamValue, Persistence, Trigger,
    TriggerId,
};
use trigvis_graph::{classify_map, RelationKind, TriggerGraph};

const ACTION_OPCODES: &[i32] = &[12, 22, 53, 54, 56, 57, 99];
const CONDITION_OPCODES: &[i32] = &[36, 37, 13];

/// One generated action: an opcode from the interesting set and a target
/// index that may or may not resolve.
fn arb_action() -> impl Strategy<Value = (i32, u32)> {
    (prop::sample::select(ACTION_OPCODES.to_vec()), 0..12u32)
}

fn arb_condition() -> impl Strategy<Value = (i32, u32)> {
    (prop::sample::select(CONDITION_OPCODES.to_vec()), 0..8u32)
}

prop_compose! {
    /// A record set with up to eight triggers, four locals, and random
    /// action/condition/link wiring. Targets deliberately overshoot the
    /// declared ranges so missing-reference handling is exercised too.
    fn arb_script()(
        trigger_count in 1..8usize,
        local_count in 0..4u32,
        actions in prop::collection::vec(prop::collection::vec(arb_action(), 0..4), 8),
        conditions in prop::collection::vec(prop::collection::vec(arb_condition(), 0..3), 8),
        links in prop::collection::vec(prop::option::of(0..12u32), 8),
    ) -> MapScript {
        let mut script = MapScript { name: "gen".into(), ..MapScript::default() };
        for index in 0..local_count {
            let id = LocalId(index);
            script.locals.insert(id, LocalVariable {
                id,
                name: format!("flag{index}"),
                initial: index % 2 == 0,
            });
        }
        for i in 0..trigger_count {
            let id = TriggerId::new(&format!("{i}"));
            let trigger_actions = actions[i].iter().map(|&(opcode, target)| {
                let mut params = vec![ParamValue::Int(0); 7];
                params[1] = ParamValue::Int(i64::from(target));
                Action { opcode, params }
            }).collect();
            let trigger_conditions = conditions[i].iter().map(|&(opcode, target)| {
                Condition { opcode, params: vec![ParamValue::Int(0), ParamValue::Int(i64::from(target))] }
            }).collect();
            script.triggers.insert(id.clone(), Trigger {
                id,
                name: format!("trigger {i}"),
                house: "Soviets".into(),
                linked: links[i]
                    .map(|t| TriggerId::new(&t.to_string()))
                    .into_iter()
                    .collect(),
                disabled: false,
                easy: true,
                normal: true,
                hard: true,
                persistence: Persistence::Volatile,
                conditions: trigger_conditions,
                actions: trigger_actions,
            });
        }
        script
    }
}

fn edge_triples(graph: &TriggerGraph) -> Vec<(String, String, RelationKind)> {
    use petgraph::visit::EdgeRef;
    let mut triples: Vec<_> = graph
        .graph
        .edge_references()
        .map(|e| {
            (
                graph.graph[e.source()].to_string(),
                graph.graph[e.target()].to_string(),
                *e.weight(),
            )
        })
        .collect();
    triples.sort();
    triples
}

proptest! {
    #[test]
    fn identical_inputs_build_identical_graphs(script in arb_script()) {
        let dict = OpcodeDict::builtin();

        let mut report_a = DiagnosticReport::new();
        let relations_a = classify_map(&script, &dict, &mut report_a);
        let graph_a = TriggerGraph::from_script(&script, &relations_a);

        let mut report_b = DiagnosticReport::new();
        let relations_b = classify_map(&script, &dict, &mut report_b);
        let graph_b = TriggerGraph::from_script(&script, &relations_b);

        prop_assert_eq!(edge_triples(&graph_a), edge_triples(&graph_b));
        prop_assert_eq!(&graph_a.content_hash, &graph_b.content_hash);
        prop_assert_eq!(report_a, report_b);
    }

    #[test]
    fn relation_order_does_not_change_the_edge_set(script in arb_script()) {
        let dict = OpcodeDict::builtin();
        let mut report = DiagnosticReport::new();
        let relations = classify_map(&script, &dict, &mut report);

        let forward = TriggerGraph::from_script(&script, &relations);
        let reversed: Vec<_> = relations.iter().rev().cloned().collect();
        let backward = TriggerGraph::from_script(&script, &reversed);

        prop_assert_eq!(edge_triples(&forward), edge_triples(&backward));
        prop_assert_eq!(&forward.content_hash, &backward.content_hash);
    }

    #[test]
    fn edge_triples_are_unique(script in arb_script()) {
        let dict = OpcodeDict::builtin();
        let mut report = DiagnosticReport::new();
        let relations = classify_map(&script, &dict, &mut report);
        let graph = TriggerGraph::from_script(&script, &relations);

        let triples = edge_triples(&graph);
        let mut deduped = triples.clone();
        deduped.dedup();
        prop_assert_eq!(triples, deduped);
    }

    #[test]
    fn every_edge_endpoint_is_a_declared_record(script in arb_script()) {
        let dict = OpcodeDict::builtin();
        let mut report = DiagnosticReport::new();
        let relations = classify_map(&script, &dict, &mut report);
        let graph = TriggerGraph::from_script(&script, &relations);

        for node in graph.graph.node_weights() {
            match node {
                trigvis_graph::NodeRef::Trigger(id) => prop_assert!(script.has_trigger(id)),
                trigvis_graph::NodeRef::Local(id) => prop_assert!(script.has_local(*id)),
            }
        }
        prop_assert_eq!(
            graph.node_count(),
            script.triggers.len() + script.locals.len()
        );
    }
}
