// crates/form-schema-config/src/examples.rs
// ============================================================================
// Module: Config Examples
// Description: Canonical example configuration payload.
// Purpose: Deterministic example for docs and the CLI.
// Dependencies: std
// ============================================================================

//! ## Overview
//! Canonical example `form-schema.toml`. The example is parsed and validated
//! by the config tests so it cannot drift from the model.

/// Returns a canonical example `form-schema.toml` configuration.
#[must_use]
pub fn config_toml_example() -> String {
    String::from(
        r#"[cache]
capacity = 256

[limits]
max_fields = 512
max_pattern_length = 1024
max_definition_bytes = 1048576

[audit]
sink = "file"
path = "form-schema-audit.jsonl"
"#,
    )
}
