// crates/form-schema-core/tests/proptest_fingerprint.rs
// ============================================================================
// Module: Fingerprint Property-Based Tests
// Description: Property tests for fingerprint determinism and cosmetics.
// Purpose: Ensure cache keys are stable for arbitrary definitions.
// Dependencies: form-schema-core, proptest
// ============================================================================

//! Property-based tests for fingerprint invariants.

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

use form_schema_core::Constraints;
use form_schema_core::FieldDefinition;
use form_schema_core::FieldType;
use form_schema_core::Fingerprint;
use form_schema_core::FormDefinition;
use proptest::prelude::*;

fn field_type_strategy() -> impl Strategy<Value = FieldType> {
    prop_oneof![
        Just(FieldType::Text),
        Just(FieldType::Textarea),
        Just(FieldType::Number),
        Just(FieldType::Select),
        Just(FieldType::Checkbox),
        Just(FieldType::Date),
        "[a-z]{1,8}".prop_map(FieldType::from),
    ]
}

fn field_strategy() -> impl Strategy<Value = FieldDefinition> {
    (
        "[a-z]{1,6}",
        field_type_strategy(),
        any::<bool>(),
        prop::option::of(0usize .. 50),
        prop::option::of(-1_000.0f64 .. 1_000.0),
        prop::collection::vec("[a-z]{1,4}", 0 .. 3),
    )
        .prop_map(|(id, field_type, required, min_length, min_value, options)| {
            let mut field = FieldDefinition::new(id, field_type)
                .with_constraints(Constraints {
                    min_length,
                    min_value,
                    ..Constraints::default()
                })
                .with_options(options.iter().map(|value| (value.as_str(), value.as_str())));
            field.required = required;
            field
        })
}

fn definition_strategy() -> impl Strategy<Value = FormDefinition> {
    ("[0-9]{1,3}", prop::collection::vec(field_strategy(), 0 .. 6))
        .prop_map(|(version, fields)| FormDefinition::new(version, fields))
}

proptest! {
    #[test]
    fn fingerprint_is_deterministic(definition in definition_strategy()) {
        let first = Fingerprint::of(&definition).unwrap();
        let second = Fingerprint::of(&definition.clone()).unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn labels_do_not_affect_fingerprint(
        definition in definition_strategy(),
        label in ".{0,12}",
        placeholder in prop::option::of(".{0,12}"),
    ) {
        let mut relabeled = definition.clone();
        for field in &mut relabeled.fields {
            field.label.clone_from(&label);
            field.placeholder.clone_from(&placeholder);
            for option in &mut field.options {
                option.label = format!("{label}!");
            }
        }
        prop_assert_eq!(
            Fingerprint::of(&definition).unwrap(),
            Fingerprint::of(&relabeled).unwrap()
        );
    }
}
