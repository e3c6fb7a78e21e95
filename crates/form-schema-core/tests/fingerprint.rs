// crates/form-schema-core/tests/fingerprint.rs
// ============================================================================
// Module: Fingerprint Tests
// Description: Structural definition fingerprints.
// Purpose: Ensure cosmetic edits share a fingerprint and behavioral edits do not.
// Dependencies: form-schema-core, serde_json
// ============================================================================
//! ## Overview
//! Fingerprints key the compilation cache, so they must be deterministic,
//! insensitive to display-only fields, and sensitive to anything that
//! changes validation or visibility.

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

use form_schema_core::Condition;
use form_schema_core::Constraints;
use form_schema_core::FieldDefinition;
use form_schema_core::FieldType;
use form_schema_core::Fingerprint;
use form_schema_core::FormDefinition;
use form_schema_core::HashAlgorithm;
use form_schema_core::Operator;
use serde_json::json;

// ============================================================================
// SECTION: Helpers
// ============================================================================

fn base() -> FormDefinition {
    FormDefinition::new("7", vec![
        FieldDefinition::new("topic", FieldType::Select).with_options([("Sales", "sales")]),
        FieldDefinition::new("details", FieldType::Textarea)
            .required()
            .with_condition(Condition::new("topic", Operator::Equals, json!("sales"))),
    ])
}

fn fingerprint(definition: &FormDefinition) -> Fingerprint {
    Fingerprint::of(definition).unwrap()
}

// ============================================================================
// SECTION: Stability
// ============================================================================

/// Verifies fingerprints are deterministic and render as tagged hex.
#[test]
fn fingerprint_is_deterministic() {
    let first = fingerprint(&base());
    assert_eq!(first, fingerprint(&base()));
    let rendered = first.to_string();
    let hex = rendered.strip_prefix("sha256:").unwrap();
    assert_eq!(hex.len(), 64);
    assert!(hex.bytes().all(|byte| byte.is_ascii_hexdigit()));

    let digest = first.digest();
    assert_eq!(digest.algorithm, HashAlgorithm::Sha256);
    assert_eq!(digest.value, hex);
}

/// Verifies wire key order does not affect the fingerprint.
#[test]
fn wire_key_order_is_irrelevant() {
    let left: FormDefinition = serde_json::from_value(json!({
        "version": "1",
        "fields": [{"id": "a", "name": "a", "type": "text", "required": true}]
    }))
    .unwrap();
    let right: FormDefinition = serde_json::from_value(json!({
        "fields": [{"required": true, "type": "text", "name": "a", "id": "a"}],
        "version": "1"
    }))
    .unwrap();
    assert_eq!(fingerprint(&left), fingerprint(&right));
}

/// Verifies display-only attributes are excluded.
#[test]
fn cosmetic_edits_keep_fingerprint() {
    let mut edited = base();
    edited.fields[0].label = "Pick a topic".to_string();
    edited.fields[0].options[0].label = "Sales team".to_string();
    edited.fields[1].placeholder = Some("Tell us more".to_string());
    edited.fields[1].default_value = Some(json!("n/a"));
    assert_eq!(fingerprint(&base()), fingerprint(&edited));
}

// ============================================================================
// SECTION: Sensitivity
// ============================================================================

/// Verifies behavioral edits change the fingerprint.
#[test]
fn behavioral_edits_change_fingerprint() {
    let original = fingerprint(&base());

    let mut version = base();
    version.version = "8".into();

    let mut required = base();
    required.fields[1].required = false;

    let mut option = base();
    option.fields[0].options[0].value = "support".to_string();

    let mut condition = base();
    condition.fields[1].condition =
        Some(Condition::new("topic", Operator::NotEquals, json!("sales")));

    let mut constraint = base();
    constraint.fields[1].constraints = Constraints {
        max_length: Some(100),
        ..Constraints::default()
    };

    let mut renamed = base();
    renamed.fields[0].name = "subject".to_string();

    let mut reordered = base();
    reordered.fields.reverse();

    for edited in [version, required, option, condition, constraint, renamed, reordered] {
        assert_ne!(fingerprint(&edited), original);
    }
}
