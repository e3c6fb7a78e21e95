// crates/form-schema-core/src/runtime/compiler.rs
// ============================================================================
// Module: Form Schema Compiler
// Description: Public entry point turning definitions into compiled forms.
// Purpose: Fingerprint, cache, and compile definitions; validate submissions.
// Dependencies: crate::{core, interfaces, runtime}
// ============================================================================

//! ## Overview
//! [`FormCompiler::compile_form`] fingerprints a definition and consults the
//! injected [`CompilationCache`] under a [`CacheKey`] that also carries the
//! compiler's limits. On a miss it builds the condition graph and
//! compiles every field rule, collecting all errors from both phases before
//! deciding; a definition with any defect yields no [`CompiledForm`].
//!
//! A [`CompiledForm`] is immutable and shared behind an [`Arc`], so
//! validation and visibility queries need no locking. Hidden fields are
//! exempt from every check, including `required`.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Instant;

use crate::core::CompileError;
use crate::core::CompileErrors;
use crate::core::FieldId;
use crate::core::Fingerprint;
use crate::core::FormDefinition;
use crate::core::FormValues;
use crate::core::FormVersion;
use crate::core::ValidationResult;
use crate::core::VisibilityMap;
use crate::interfaces::CacheEvent;
use crate::interfaces::CompileAuditEvent;
use crate::interfaces::CompileAuditEventParams;
use crate::interfaces::CompileAuditSink;
use crate::interfaces::CompileMetricEvent;
use crate::interfaces::CompileOutcome;
use crate::interfaces::CompilerMetrics;
use crate::interfaces::NoopAuditSink;
use crate::interfaces::NoopMetrics;
use crate::runtime::cache::CacheKey;
use crate::runtime::cache::CacheStats;
use crate::runtime::cache::CompilationCache;
use crate::runtime::cache::DEFAULT_CACHE_CAPACITY;
use crate::runtime::graph::ConditionGraph;
use crate::runtime::rules::DEFAULT_MAX_PATTERN_LENGTH;
use crate::runtime::rules::FieldRule;
use crate::runtime::rules::RuleLimits;
use crate::runtime::rules::compile_field;
use crate::runtime::visibility;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default maximum number of fields per definition.
pub const DEFAULT_MAX_FIELDS: usize = 512;

// ============================================================================
// SECTION: Configuration
// ============================================================================

/// Compiler configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompilerConfig {
    /// Maximum number of compiled forms cached.
    pub cache_capacity: usize,
    /// Maximum number of fields per definition.
    pub max_fields: usize,
    /// Maximum pattern source length in bytes.
    pub max_pattern_length: usize,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            max_fields: DEFAULT_MAX_FIELDS,
            max_pattern_length: DEFAULT_MAX_PATTERN_LENGTH,
        }
    }
}

// ============================================================================
// SECTION: Compiled Form
// ============================================================================

/// Compiled, immutable validator and visibility graph for one cache key.
#[derive(Debug)]
pub struct CompiledForm {
    /// Fingerprint and limits the form was compiled under.
    key: CacheKey,
    /// Version of the source definition.
    version: FormVersion,
    /// Field rules in definition order.
    rules: Vec<FieldRule>,
    /// Visibility dependency graph.
    graph: ConditionGraph,
}

impl CompiledForm {
    /// Returns the definition fingerprint.
    #[must_use]
    pub const fn fingerprint(&self) -> &Fingerprint {
        self.key.fingerprint()
    }

    /// Returns the cache key the form was published under.
    #[must_use]
    pub const fn cache_key(&self) -> &CacheKey {
        &self.key
    }

    /// Returns the definition version.
    #[must_use]
    pub const fn version(&self) -> &FormVersion {
        &self.version
    }

    /// Returns the field ids in definition order.
    #[must_use]
    pub fn field_ids(&self) -> &[FieldId] {
        self.graph.field_ids()
    }

    /// Returns the number of fields.
    #[must_use]
    pub fn field_count(&self) -> usize {
        self.rules.len()
    }

    /// Returns the rule for a field.
    #[must_use]
    pub fn rule(&self, field_id: &str) -> Option<&FieldRule> {
        self.rules.iter().find(|rule| rule.field_id().as_str() == field_id)
    }

    /// Returns the condition graph.
    #[must_use]
    pub const fn graph(&self) -> &ConditionGraph {
        &self.graph
    }

    /// Validates a submission.
    ///
    /// Hidden fields are skipped entirely; visible fields report every
    /// failing check.
    #[must_use]
    pub fn validate(&self, data: &FormValues) -> ValidationResult {
        self.validate_rules(data, |_| true)
    }

    /// Validates only the listed fields.
    ///
    /// Visibility is still computed from the full `data` snapshot. Unknown
    /// ids are ignored.
    #[must_use]
    pub fn validate_partial(
        &self,
        data: &FormValues,
        changed_field_ids: &BTreeSet<FieldId>,
    ) -> ValidationResult {
        self.validate_rules(data, |field_id| changed_field_ids.contains(field_id))
    }

    /// Computes the visibility of every field.
    #[must_use]
    pub fn compute_visibility(&self, values: &FormValues) -> VisibilityMap {
        visibility::compute_visibility(&self.graph, values)
    }

    /// Runs the selected visible rules against `data`.
    fn validate_rules(
        &self,
        data: &FormValues,
        selected: impl Fn(&FieldId) -> bool,
    ) -> ValidationResult {
        let mut errors = Vec::new();
        for rule in &self.rules {
            let field_id = rule.field_id();
            if !selected(field_id) {
                continue;
            }
            if !visibility::is_visible(&self.graph, field_id.as_str(), data) {
                continue;
            }
            rule.check(data.get(rule.key()), &mut errors);
        }
        ValidationResult {
            errors,
        }
    }
}

// ============================================================================
// SECTION: Compiler
// ============================================================================

/// Form schema compiler with an owned (optionally shared) cache.
pub struct FormCompiler {
    /// Compiler configuration.
    config: CompilerConfig,
    /// Compiled form cache.
    cache: Arc<CompilationCache>,
    /// Metrics sink.
    metrics: Arc<dyn CompilerMetrics>,
    /// Audit sink.
    audit: Arc<dyn CompileAuditSink>,
}

impl Default for FormCompiler {
    fn default() -> Self {
        Self::new(CompilerConfig::default())
    }
}

impl FormCompiler {
    /// Creates a compiler with a fresh cache sized from `config`.
    #[must_use]
    pub fn new(config: CompilerConfig) -> Self {
        let cache = Arc::new(CompilationCache::with_capacity(config.cache_capacity));
        Self::with_cache(config, cache)
    }

    /// Creates a compiler around an existing cache.
    ///
    /// The cache's own capacity wins over `config.cache_capacity`.
    #[must_use]
    pub fn with_cache(config: CompilerConfig, cache: Arc<CompilationCache>) -> Self {
        Self {
            config,
            cache,
            metrics: Arc::new(NoopMetrics),
            audit: Arc::new(NoopAuditSink),
        }
    }

    /// Replaces the metrics sink.
    #[must_use]
    pub fn with_metrics(mut self, metrics: Arc<dyn CompilerMetrics>) -> Self {
        self.metrics = metrics;
        self
    }

    /// Replaces the audit sink.
    #[must_use]
    pub fn with_audit_sink(mut self, audit: Arc<dyn CompileAuditSink>) -> Self {
        self.audit = audit;
        self
    }

    /// Returns the compiler configuration.
    #[must_use]
    pub const fn config(&self) -> &CompilerConfig {
        &self.config
    }

    /// Returns the compilation cache.
    #[must_use]
    pub fn cache(&self) -> &Arc<CompilationCache> {
        &self.cache
    }

    /// Compiles a definition, returning the cached form when one exists.
    ///
    /// # Errors
    ///
    /// Returns every [`CompileError`] found across the graph and rule phases.
    pub fn compile_form(
        &self,
        definition: &FormDefinition,
    ) -> Result<Arc<CompiledForm>, CompileErrors> {
        let fingerprint = Fingerprint::of(definition).map_err(|err| {
            CompileErrors::from(CompileError::Canonicalization {
                reason: err.to_string(),
            })
        })?;
        let key = CacheKey::new(fingerprint, &self.config);
        self.cache.get_or_compile(&key, self.metrics.as_ref(), || {
            self.compile_uncached(definition, &key)
        })
    }

    /// Drops every cached compiled form.
    pub fn clear_cache(&self) {
        self.cache.clear();
        self.metrics.record_cache(CacheEvent::Cleared);
    }

    /// Returns cache size and capacity.
    #[must_use]
    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Compiles a definition and reports the outcome to the sinks.
    fn compile_uncached(
        &self,
        definition: &FormDefinition,
        key: &CacheKey,
    ) -> Result<CompiledForm, CompileErrors> {
        let started = Instant::now();
        let result = self.build(definition, key);
        let fingerprint = key.fingerprint();
        let errors: &[CompileError] = match &result {
            Ok(_) => &[],
            Err(errors) => errors,
        };
        let outcome =
            if errors.is_empty() { CompileOutcome::Compiled } else { CompileOutcome::Rejected };
        self.metrics.record_compile(&CompileMetricEvent {
            fingerprint: fingerprint.clone(),
            outcome,
            field_count: definition.fields.len(),
            error_count: errors.len(),
            duration: started.elapsed(),
        });
        self.audit.record(&CompileAuditEvent::new(CompileAuditEventParams {
            version: definition.version.to_string(),
            fingerprint: fingerprint.to_string(),
            outcome,
            field_count: definition.fields.len(),
            error_kinds: errors.iter().map(CompileError::kind).collect(),
        }));
        result
    }

    /// Runs the graph and rule phases, collecting every error.
    fn build(
        &self,
        definition: &FormDefinition,
        key: &CacheKey,
    ) -> Result<CompiledForm, CompileErrors> {
        let field_count = definition.fields.len();
        if field_count > self.config.max_fields {
            return Err(CompileErrors::from(CompileError::TooManyFields {
                limit: self.config.max_fields,
                actual: field_count,
            }));
        }

        let mut errors = Vec::new();
        let graph = match ConditionGraph::build(&definition.fields) {
            Ok(graph) => Some(graph),
            Err(graph_errors) => {
                errors.extend(graph_errors);
                None
            }
        };

        let limits = RuleLimits {
            max_pattern_length: self.config.max_pattern_length,
        };
        let mut rules = Vec::with_capacity(field_count);
        for field in &definition.fields {
            match compile_field(field, &limits) {
                Ok(rule) => rules.push(rule),
                Err(error) => errors.push(error),
            }
        }

        match graph {
            Some(graph) if errors.is_empty() => Ok(CompiledForm {
                key: key.clone(),
                version: definition.version.clone(),
                rules,
                graph,
            }),
            _ => Err(CompileErrors::new(errors)),
        }
    }
}
