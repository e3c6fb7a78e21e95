// crates/form-schema-cli/src/lib.rs
// ============================================================================
// Module: Form Schema CLI Library
// Description: Shared helpers for the form-schema binary.
// Purpose: Expose the message catalog and audit sinks to the entry point.
// Dependencies: form-schema-config, form-schema-core, serde_json
// ============================================================================

//! ## Overview
//! Support code for the `form-schema` binary: the localized message catalog
//! behind the [`t!`] macro and the JSON-lines compile audit sinks selected by
//! configuration.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod audit;
pub mod i18n;

#[cfg(test)]
mod tests;
