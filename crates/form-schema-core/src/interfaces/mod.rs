// crates/form-schema-core/src/interfaces/mod.rs
// ============================================================================
// Module: Form Schema Interfaces
// Description: Observability hooks for compilation and caching.
// Purpose: Let hosts plug in metrics and audit logging without hard deps.
// Dependencies: crate::core, serde
// ============================================================================

//! ## Overview
//! The compiler reports cache activity and compile outcomes through two
//! injected sinks. [`CompilerMetrics`] receives counters and latencies;
//! [`CompileAuditSink`] receives one structured record per actual compile.
//! Both default to no-op implementations so the core stays I/O free.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Duration;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use serde::Serialize;

use crate::core::Fingerprint;

// ============================================================================
// SECTION: Metric Labels
// ============================================================================

/// Compilation cache activity.
///
/// # Invariants
/// - Variants are stable for telemetry labeling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheEvent {
    /// Lookup returned a published compiled form.
    Hit,
    /// Lookup missed and this caller compiles.
    Miss,
    /// Lookup missed and this caller waited on another caller's compile.
    Coalesced,
    /// Least-recently-used entry was dropped to make room.
    Evicted,
    /// All entries were dropped administratively.
    Cleared,
}

impl CacheEvent {
    /// Returns a stable label for the event.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Hit => "hit",
            Self::Miss => "miss",
            Self::Coalesced => "coalesced",
            Self::Evicted => "evicted",
            Self::Cleared => "cleared",
        }
    }
}

/// Outcome of one compile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CompileOutcome {
    /// Definition compiled successfully.
    Compiled,
    /// Definition was rejected with compile errors.
    Rejected,
}

impl CompileOutcome {
    /// Returns a stable label for the outcome.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Compiled => "compiled",
            Self::Rejected => "rejected",
        }
    }
}

/// Metric payload for one compile.
#[derive(Debug, Clone)]
pub struct CompileMetricEvent {
    /// Fingerprint of the compiled definition.
    pub fingerprint: Fingerprint,
    /// Compile outcome.
    pub outcome: CompileOutcome,
    /// Number of fields in the definition.
    pub field_count: usize,
    /// Number of compile errors (zero on success).
    pub error_count: usize,
    /// Time spent compiling outside the cache lock.
    pub duration: Duration,
}

// ============================================================================
// SECTION: Metrics Trait
// ============================================================================

/// Metrics sink for compilation activity.
pub trait CompilerMetrics: Send + Sync {
    /// Records a cache event.
    fn record_cache(&self, event: CacheEvent);

    /// Records a completed compile.
    fn record_compile(&self, event: &CompileMetricEvent);
}

/// No-op metrics sink.
///
/// # Invariants
/// - Metrics are intentionally discarded.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopMetrics;

impl CompilerMetrics for NoopMetrics {
    fn record_cache(&self, _event: CacheEvent) {}

    fn record_compile(&self, _event: &CompileMetricEvent) {}
}

// ============================================================================
// SECTION: Audit Events
// ============================================================================

/// Structured record of one compile.
#[derive(Debug, Clone, Serialize)]
pub struct CompileAuditEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Definition version.
    pub version: String,
    /// Definition fingerprint.
    pub fingerprint: String,
    /// Compile outcome.
    pub outcome: CompileOutcome,
    /// Number of fields in the definition.
    pub field_count: usize,
    /// Kinds of compile errors, in report order.
    pub error_kinds: Vec<&'static str>,
}

/// Inputs required to construct a compile audit event.
pub struct CompileAuditEventParams {
    /// Definition version.
    pub version: String,
    /// Definition fingerprint.
    pub fingerprint: String,
    /// Compile outcome.
    pub outcome: CompileOutcome,
    /// Number of fields in the definition.
    pub field_count: usize,
    /// Kinds of compile errors, in report order.
    pub error_kinds: Vec<&'static str>,
}

impl CompileAuditEvent {
    /// Creates a new audit event stamped with the current time.
    #[must_use]
    pub fn new(params: CompileAuditEventParams) -> Self {
        let timestamp_ms =
            SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis();
        Self {
            event: "form_compile",
            timestamp_ms,
            version: params.version,
            fingerprint: params.fingerprint,
            outcome: params.outcome,
            field_count: params.field_count,
            error_kinds: params.error_kinds,
        }
    }
}

/// Audit sink for compile events.
pub trait CompileAuditSink: Send + Sync {
    /// Records a compile event.
    fn record(&self, event: &CompileAuditEvent);
}

/// No-op audit sink.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopAuditSink;

impl CompileAuditSink for NoopAuditSink {
    fn record(&self, _event: &CompileAuditEvent) {}
}
