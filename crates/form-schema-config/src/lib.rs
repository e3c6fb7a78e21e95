// crates/form-schema-config/src/lib.rs
// ============================================================================
// Module: Form Schema Config Library
// Description: Canonical config model and validation.
// Purpose: Single source of truth for form-schema.toml semantics.
// Dependencies: form-schema-core, serde, toml
// ============================================================================

//! ## Overview
//! `form-schema-config` defines the configuration model for the form schema
//! compiler: cache sizing, input limits, and audit output. Loading is strict
//! and fail-closed; unknown keys and out-of-range values are rejected.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;
pub mod examples;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::*;
pub use examples::config_toml_example;
