// crates/form-schema-core/src/runtime/mod.rs
// ============================================================================
// Module: Form Schema Runtime
// Description: Rule compilation, condition graphs, visibility, and caching.
// Purpose: Turn form definitions into cached validators and visibility maps.
// Dependencies: crate::{core, interfaces}
// ============================================================================

//! ## Overview
//! Runtime modules are layered leaves first: field rules and the condition
//! graph are compiled independently, the visibility evaluator reads the
//! graph, and the compiler assembles both behind the compilation cache.
//! Every caller goes through [`FormCompiler`] so all surfaces share one set
//! of semantics.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod cache;
pub mod compiler;
pub mod graph;
pub mod rules;
pub mod visibility;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use cache::CacheKey;
pub use cache::CacheStats;
pub use cache::CompilationCache;
pub use cache::DEFAULT_CACHE_CAPACITY;
pub use compiler::CompiledForm;
pub use compiler::CompilerConfig;
pub use compiler::DEFAULT_MAX_FIELDS;
pub use compiler::FormCompiler;
pub use graph::ConditionEdge;
pub use graph::ConditionGraph;
pub use rules::DEFAULT_MAX_PATTERN_LENGTH;
pub use rules::FieldRule;
pub use rules::RuleLimits;
pub use visibility::compute_visibility;
pub use visibility::evaluate_operator;
