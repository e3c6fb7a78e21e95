// crates/form-schema-core/tests/condition_graph.rs
// ============================================================================
// Module: Condition Graph Tests
// Description: Graph construction, structural rejection, and queries.
// Purpose: Ensure dangling, self-referencing, and cyclic conditions fail fast.
// Dependencies: form-schema-core, serde_json
// ============================================================================
//! ## Overview
//! Builds condition graphs from small field lists and checks both the
//! reported errors and the dependency queries on accepted graphs.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

use form_schema_core::CompileError;
use form_schema_core::Condition;
use form_schema_core::ConditionGraph;
use form_schema_core::FieldDefinition;
use form_schema_core::FieldId;
use form_schema_core::FieldType;
use form_schema_core::Operator;
use serde_json::json;

// ============================================================================
// SECTION: Helpers
// ============================================================================

fn field(id: &str) -> FieldDefinition {
    FieldDefinition::new(id, FieldType::Text)
}

fn gated(id: &str, depends_on: &str) -> FieldDefinition {
    field(id).with_condition(Condition::new(depends_on, Operator::NotEmpty, json!(null)))
}

fn ids(names: &[&str]) -> Vec<FieldId> {
    names.iter().copied().map(FieldId::from).collect()
}

// ============================================================================
// SECTION: Rejection
// ============================================================================

/// Verifies a two-field cycle is reported with both members.
#[test]
fn two_field_cycle_names_both_fields() {
    let errors = ConditionGraph::build(&[gated("a", "b"), gated("b", "a")]).unwrap_err();
    assert_eq!(errors, vec![CompileError::CircularCondition {
        cycle: ids(&["a", "b"]),
    }]);
}

/// Verifies a longer cycle is reported in traversal order from its first field.
#[test]
fn three_field_cycle_lists_full_path() {
    let fields = [field("root"), gated("x", "z"), gated("y", "x"), gated("z", "y")];
    let errors = ConditionGraph::build(&fields).unwrap_err();
    assert_eq!(errors, vec![CompileError::CircularCondition {
        cycle: ids(&["x", "z", "y"]),
    }]);
    assert_eq!(errors[0].to_string(), "circular condition: x -> z -> y -> x");
}

/// Verifies a chain feeding into a cycle reports only the cycle members.
#[test]
fn tail_into_cycle_reports_cycle_only() {
    let fields = [gated("tail", "a"), gated("a", "b"), gated("b", "a")];
    let errors = ConditionGraph::build(&fields).unwrap_err();
    assert_eq!(errors, vec![CompileError::CircularCondition {
        cycle: ids(&["a", "b"]),
    }]);
}

/// Verifies disjoint cycles are each reported.
#[test]
fn disjoint_cycles_are_all_reported() {
    let fields = [gated("a", "b"), gated("b", "a"), gated("c", "d"), gated("d", "c")];
    let errors = ConditionGraph::build(&fields).unwrap_err();
    assert_eq!(errors.len(), 2);
    assert!(errors.iter().all(|error| error.kind() == "circular_condition"));
}

/// Verifies a condition on an unknown field is dangling.
#[test]
fn missing_target_is_dangling() {
    let errors = ConditionGraph::build(&[field("a"), gated("b", "ghost")]).unwrap_err();
    assert_eq!(errors, vec![CompileError::DanglingCondition {
        field: "b".into(),
        target: "ghost".into(),
    }]);
}

/// Verifies a field conditioned on itself is a self reference, not a cycle.
#[test]
fn self_dependency_is_self_reference() {
    let errors = ConditionGraph::build(&[gated("loop", "loop")]).unwrap_err();
    assert_eq!(errors, vec![CompileError::SelfReference {
        field: "loop".into(),
    }]);
}

/// Verifies repeated ids are rejected and structural errors keep field order.
#[test]
fn duplicates_and_structural_errors_are_collected() {
    let fields = [field("a"), field("a"), gated("b", "nope"), gated("c", "c")];
    let errors = ConditionGraph::build(&fields).unwrap_err();
    let kinds: Vec<&str> = errors.iter().map(CompileError::kind).collect();
    assert_eq!(kinds, vec!["duplicate_field_id", "dangling_condition", "self_reference"]);
}

// ============================================================================
// SECTION: Queries
// ============================================================================

/// Verifies accepted graphs expose conditions, edges, and dependents.
#[test]
fn accepted_graph_exposes_edges_and_dependents() {
    let fields = [
        field("country").with_name("country_code"),
        gated("state", "country"),
        gated("postcode", "country"),
        field("notes"),
    ];
    let graph = ConditionGraph::build(&fields).unwrap();

    assert_eq!(graph.field_ids(), ids(&["country", "state", "postcode", "notes"]).as_slice());
    let edge = graph.condition("state").unwrap();
    assert_eq!(edge.depends_on.as_str(), "country");
    assert_eq!(edge.depends_on_key, "country_code");
    assert_eq!(edge.operator, Operator::NotEmpty);
    assert!(graph.condition("notes").is_none());

    let conditional: Vec<&str> = graph.edges().map(|edge| edge.field_id.as_str()).collect();
    assert_eq!(conditional, vec!["state", "postcode"]);
    assert_eq!(graph.dependents("country"), ids(&["state", "postcode"]).as_slice());
    assert!(graph.dependents("notes").is_empty());
    assert!(graph.dependents("unknown").is_empty());
}

/// Verifies acyclic chains are accepted.
#[test]
fn acyclic_chain_is_accepted() {
    let graph = ConditionGraph::build(&[field("a"), gated("b", "a"), gated("c", "b")]).unwrap();
    assert_eq!(graph.edges().count(), 2);
}
