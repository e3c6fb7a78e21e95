// crates/form-schema-core/src/lib.rs
// ============================================================================
// Module: Form Schema Core Library
// Description: Public API surface for the form schema compiler.
// Purpose: Expose definition types, the compiler, and observability hooks.
// Dependencies: crate::{core, interfaces, runtime}
// ============================================================================

//! ## Overview
//! Form schema core compiles declarative form definitions into cached,
//! immutable validators with conditional field visibility. Compilation is
//! pure and synchronous; the only shared mutable state is the bounded
//! compilation cache, which deduplicates concurrent compiles of the same
//! definition fingerprint.
//!
//! ```
//! use form_schema_core::FieldDefinition;
//! use form_schema_core::FieldType;
//! use form_schema_core::FormCompiler;
//! use form_schema_core::FormDefinition;
//!
//! let compiler = FormCompiler::default();
//! let definition =
//!     FormDefinition::new("1", vec![FieldDefinition::new("email", FieldType::Text).required()]);
//! let form = compiler.compile_form(&definition).map_err(|errors| errors.to_string())?;
//! let result = form.validate(&serde_json::Map::new());
//! assert!(!result.is_valid());
//! # Ok::<(), String>(())
//! ```

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod core;
pub mod interfaces;
pub mod runtime;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use crate::core::*;

pub use interfaces::CacheEvent;
pub use interfaces::CompileAuditEvent;
pub use interfaces::CompileAuditSink;
pub use interfaces::CompileMetricEvent;
pub use interfaces::CompileOutcome;
pub use interfaces::CompilerMetrics;
pub use interfaces::NoopAuditSink;
pub use interfaces::NoopMetrics;
pub use runtime::CacheKey;
pub use runtime::CacheStats;
pub use runtime::CompilationCache;
pub use runtime::CompiledForm;
pub use runtime::CompilerConfig;
pub use runtime::ConditionEdge;
pub use runtime::ConditionGraph;
pub use runtime::FieldRule;
pub use runtime::FormCompiler;
