// crates/form-schema-core/tests/compiler.rs
// ============================================================================
// Module: Form Compiler Tests
// Description: End-to-end compile, validate, and visibility behavior.
// Purpose: Ensure compiled forms enforce rules and hidden-field exemption.
// Dependencies: form-schema-core, serde_json
// ============================================================================
//! ## Overview
//! Drives [`FormCompiler`] with realistic definitions and checks
//! validation results, partial validation, error collection, and the audit
//! events emitted per compile.

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

use std::collections::BTreeSet;
use std::sync::Arc;
use std::sync::Mutex;

use form_schema_core::CompileAuditEvent;
use form_schema_core::CompileAuditSink;
use form_schema_core::CompileError;
use form_schema_core::CompileOutcome;
use form_schema_core::CompilerConfig;
use form_schema_core::Condition;
use form_schema_core::Constraints;
use form_schema_core::FieldDefinition;
use form_schema_core::FieldId;
use form_schema_core::FieldType;
use form_schema_core::FormCompiler;
use form_schema_core::FormDefinition;
use form_schema_core::FormValues;
use form_schema_core::Operator;
use form_schema_core::ValidationErrorKind;
use serde_json::Value;
use serde_json::json;

// ============================================================================
// SECTION: Helpers
// ============================================================================

fn values(data: Value) -> FormValues {
    match data {
        Value::Object(map) => map,
        other => panic!("expected object, got {other}"),
    }
}

fn profile_form() -> FormDefinition {
    FormDefinition::new("1", vec![
        FieldDefinition::new("hasBio", FieldType::Checkbox),
        FieldDefinition::new("bio", FieldType::Textarea)
            .required()
            .with_condition(Condition::new("hasBio", Operator::Equals, json!(true))),
        FieldDefinition::new("plan", FieldType::Select)
            .with_options([("Free", "free"), ("Pro", "pro")]),
        FieldDefinition::new("age", FieldType::Number).with_constraints(Constraints {
            min_value: Some(0.0),
            max_value: Some(10.0),
            ..Constraints::default()
        }),
    ])
}

#[derive(Default)]
struct RecordingAudit {
    events: Mutex<Vec<CompileAuditEvent>>,
}

impl CompileAuditSink for RecordingAudit {
    fn record(&self, event: &CompileAuditEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}

// ============================================================================
// SECTION: Validation
// ============================================================================

/// Verifies hidden required fields never produce errors.
#[test]
fn hidden_required_field_is_exempt() {
    let form = FormCompiler::default().compile_form(&profile_form()).unwrap();

    let hidden = form.validate(&values(json!({"hasBio": false})));
    assert!(hidden.is_valid(), "{:?}", hidden.errors);

    let shown = form.validate(&values(json!({"hasBio": true})));
    assert_eq!(shown.errors.len(), 1);
    assert!(shown.has_error("bio", ValidationErrorKind::Required));
}

/// Verifies hidden fields skip every constraint, not just required.
#[test]
fn hidden_field_skips_type_checks() {
    let form = FormCompiler::default().compile_form(&profile_form()).unwrap();
    let result = form.validate(&values(json!({"hasBio": false, "bio": 42})));
    assert!(result.is_valid());
}

/// Verifies select membership is enforced.
#[test]
fn select_values_are_enumerated() {
    let form = FormCompiler::default().compile_form(&profile_form()).unwrap();
    let result = form.validate(&values(json!({"plan": "enterprise"})));
    assert!(result.has_error("plan", ValidationErrorKind::InvalidOption));
    assert!(form.validate(&values(json!({"plan": "pro"}))).is_valid());
}

/// Verifies numeric ranges reject values outside the inclusive bounds.
#[test]
fn numeric_range_is_enforced() {
    let form = FormCompiler::default().compile_form(&profile_form()).unwrap();
    let cases = [(json!(-1), false), (json!(0), true), (json!(10), true), (json!(11), false)];
    for (age, valid) in cases {
        let result = form.validate(&values(json!({ "age": age })));
        assert_eq!(result.is_valid(), valid, "age {age}");
    }
}

/// Verifies every failing field is reported in one pass.
#[test]
fn validation_collects_errors_across_fields() {
    let form = FormCompiler::default().compile_form(&profile_form()).unwrap();
    let result = form.validate(&values(json!({
        "hasBio": true,
        "plan": "gold",
        "age": "ten",
    })));
    let fields: Vec<&str> = result.errors.iter().map(|error| error.field_id.as_str()).collect();
    assert_eq!(fields, vec!["bio", "plan", "age"]);
    assert_eq!(result.errors_for("age").count(), 1);
    assert!(result.has_error("age", ValidationErrorKind::InvalidType));
}

/// Verifies partial validation reports only selected fields.
#[test]
fn partial_validation_filters_fields() {
    let form = FormCompiler::default().compile_form(&profile_form()).unwrap();
    let data = values(json!({"hasBio": true, "plan": "gold"}));

    let only_plan: BTreeSet<FieldId> = [FieldId::from("plan")].into_iter().collect();
    let result = form.validate_partial(&data, &only_plan);
    assert_eq!(result.errors.len(), 1);
    assert!(result.has_error("plan", ValidationErrorKind::InvalidOption));

    let with_unknown: BTreeSet<FieldId> =
        [FieldId::from("bio"), FieldId::from("ghost")].into_iter().collect();
    let result = form.validate_partial(&data, &with_unknown);
    assert_eq!(result.errors.len(), 1);
    assert!(result.has_error("bio", ValidationErrorKind::Required));

    assert!(form.validate_partial(&data, &BTreeSet::new()).is_valid());
}

/// Verifies partial validation still uses the full snapshot for visibility.
#[test]
fn partial_validation_uses_full_snapshot_for_visibility() {
    let form = FormCompiler::default().compile_form(&profile_form()).unwrap();
    let bio: BTreeSet<FieldId> = [FieldId::from("bio")].into_iter().collect();
    assert!(form.validate_partial(&values(json!({"hasBio": false})), &bio).is_valid());
    assert!(!form.validate_partial(&values(json!({"hasBio": true})), &bio).is_valid());
}

/// Verifies fields are read by name while errors report ids.
#[test]
fn values_are_keyed_by_field_name() {
    let definition = FormDefinition::new("2", vec![
        FieldDefinition::new("f-email", FieldType::Text).with_name("email").required(),
    ]);
    let form = FormCompiler::default().compile_form(&definition).unwrap();
    assert!(form.validate(&values(json!({"email": "a@b.c"}))).is_valid());
    let result = form.validate(&values(json!({"f-email": "a@b.c"})));
    assert!(result.has_error("f-email", ValidationErrorKind::Required));
}

/// Verifies compiled forms expose their visibility map and metadata.
#[test]
fn compiled_form_exposes_visibility_and_metadata() {
    let form = FormCompiler::default().compile_form(&profile_form()).unwrap();
    assert_eq!(form.version().as_str(), "1");
    assert_eq!(form.field_count(), 4);
    assert_eq!(form.field_ids()[1].as_str(), "bio");
    assert_eq!(form.rule("age").unwrap().field_type(), &FieldType::Number);
    assert!(form.rule("bio").unwrap().is_required());
    assert!(form.rule("missing").is_none());

    let map = form.compute_visibility(&values(json!({"hasBio": true})));
    assert!(map["bio"]);
    assert!(map["plan"]);
    assert!(!form.compute_visibility(&FormValues::new())["bio"]);

    let graph = form.graph();
    assert_eq!(graph.dependents("hasBio"), [FieldId::from("bio")]);
    assert_eq!(graph.condition("bio").unwrap().depends_on_key, "hasBio");
    assert_eq!(graph.edges().count(), 1);
    assert_eq!(form.cache_key().fingerprint(), form.fingerprint());
}

// ============================================================================
// SECTION: Compile Errors
// ============================================================================

/// Verifies graph and rule errors are reported together.
#[test]
fn compile_collects_all_errors() {
    let definition = FormDefinition::new("3", vec![
        FieldDefinition::new("a", FieldType::Text)
            .with_condition(Condition::new("b", Operator::NotEmpty, json!(null))),
        FieldDefinition::new("b", FieldType::Text)
            .with_condition(Condition::new("a", Operator::NotEmpty, json!(null))),
        FieldDefinition::new("c", FieldType::Text)
            .with_condition(Condition::new("zzz", Operator::Equals, json!(1))),
        FieldDefinition::new("d", FieldType::Text).with_constraints(Constraints {
            min_length: Some(9),
            max_length: Some(3),
            ..Constraints::default()
        }),
        FieldDefinition::new("e", FieldType::Unsupported("rating".to_string())),
    ]);
    let errors = FormCompiler::default().compile_form(&definition).unwrap_err();
    let kinds: Vec<&str> = errors.iter().map(CompileError::kind).collect();
    assert_eq!(kinds, vec![
        "dangling_condition",
        "circular_condition",
        "invalid_constraint",
        "unknown_field_type"
    ]);
    assert!(errors.to_string().starts_with("4 compile error(s): "));
}

/// Verifies the field limit is reported on its own.
#[test]
fn too_many_fields_short_circuits() {
    let compiler = FormCompiler::new(CompilerConfig {
        max_fields: 2,
        ..CompilerConfig::default()
    });
    let definition = FormDefinition::new("4", vec![
        FieldDefinition::new("a", FieldType::Text),
        FieldDefinition::new("a", FieldType::Text),
        FieldDefinition::new("b", FieldType::Unsupported("x".to_string())),
    ]);
    let errors = compiler.compile_form(&definition).unwrap_err();
    assert_eq!(errors.into_inner(), vec![CompileError::TooManyFields {
        limit: 2,
        actual: 3,
    }]);
}

/// Verifies the configured pattern limit reaches rule compilation.
#[test]
fn pattern_limit_comes_from_config() {
    let compiler = FormCompiler::new(CompilerConfig {
        max_pattern_length: 4,
        ..CompilerConfig::default()
    });
    let definition = FormDefinition::new("5", vec![
        FieldDefinition::new("code", FieldType::Text).with_constraints(Constraints {
            pattern: Some("^[A-Z]{3}$".to_string()),
            ..Constraints::default()
        }),
    ]);
    let errors = compiler.compile_form(&definition).unwrap_err();
    assert_eq!(errors[0].kind(), "invalid_constraint");
}

/// Verifies an empty definition compiles and accepts anything.
#[test]
fn empty_definition_compiles() {
    let form = FormCompiler::default().compile_form(&FormDefinition::new("0", vec![])).unwrap();
    assert_eq!(form.field_count(), 0);
    assert!(form.validate(&values(json!({"extra": 1}))).is_valid());
    assert!(form.compute_visibility(&FormValues::new()).is_empty());
}

// ============================================================================
// SECTION: Audit
// ============================================================================

/// Verifies each real compile emits one audit event and cache hits emit none.
#[test]
fn audit_events_record_outcomes() {
    let audit = Arc::new(RecordingAudit::default());
    let compiler = FormCompiler::default().with_audit_sink(audit.clone());

    let form = compiler.compile_form(&profile_form()).unwrap();
    compiler.compile_form(&profile_form()).unwrap();
    let broken = FormDefinition::new("9", vec![FieldDefinition::new(
        "x",
        FieldType::Unsupported("color".to_string()),
    )]);
    compiler.compile_form(&broken).unwrap_err();

    let events = audit.events.lock().unwrap();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].event, "form_compile");
    assert_eq!(events[0].outcome, CompileOutcome::Compiled);
    assert_eq!(events[0].version, "1");
    assert_eq!(events[0].fingerprint, form.fingerprint().to_string());
    assert_eq!(events[0].field_count, 4);
    assert!(events[0].error_kinds.is_empty());
    assert_eq!(events[1].outcome, CompileOutcome::Rejected);
    assert_eq!(events[1].error_kinds, vec!["unknown_field_type"]);
}
