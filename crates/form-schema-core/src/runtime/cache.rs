// crates/form-schema-core/src/runtime/cache.rs
// ============================================================================
// Module: Compilation Cache
// Description: Bounded LRU of compiled forms with single-flight compilation.
// Purpose: Compile each distinct definition once per limit set, even under concurrent callers.
// Dependencies: crate::{core, interfaces, runtime::compiler}, lru
// ============================================================================

//! ## Overview
//! Entries are keyed by [`CacheKey`]: the definition fingerprint plus the
//! limits it was compiled under, so compilers with different limits can share
//! one cache without seeing each other's verdicts.
//!
//! Lookups, inserts, evictions, and single-flight registration all happen
//! under one mutex. Compilation itself runs outside the lock: the first
//! caller to miss a key registers a flight and compiles; concurrent
//! callers for the same key wait on that flight and receive the
//! leader's result, success or failure. Only successful compiles are stored.
//!
//! ## Invariants
//! - At most one compiled form exists per cache key.
//! - [`CompilationCache::clear`] drops published entries only; a compile
//!   already registered as a flight still publishes its result afterwards.
//! - Evicting an entry never affects forms or results already handed out.
//! - If a leader unwinds without publishing, its waiters retry the lookup.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::sync::Condvar;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::sync::PoisonError;

use lru::LruCache;
use serde::Serialize;

use crate::core::CompileErrors;
use crate::core::Fingerprint;
use crate::interfaces::CacheEvent;
use crate::interfaces::CompilerMetrics;
use crate::runtime::compiler::CompiledForm;
use crate::runtime::compiler::CompilerConfig;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default number of compiled forms retained.
pub const DEFAULT_CACHE_CAPACITY: usize = 256;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Result of compiling (or looking up) one definition.
pub type CompileOutcomeResult = Result<Arc<CompiledForm>, CompileErrors>;

/// Identity of one compile: what was compiled and under which limits.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    /// Structural fingerprint of the definition.
    fingerprint: Fingerprint,
    /// Field-count limit in force.
    max_fields: usize,
    /// Pattern length limit in force.
    max_pattern_length: usize,
}

impl CacheKey {
    /// Builds the key for compiling `fingerprint` under `config`.
    #[must_use]
    pub const fn new(fingerprint: Fingerprint, config: &CompilerConfig) -> Self {
        Self {
            fingerprint,
            max_fields: config.max_fields,
            max_pattern_length: config.max_pattern_length,
        }
    }

    /// Returns the definition fingerprint.
    #[must_use]
    pub const fn fingerprint(&self) -> &Fingerprint {
        &self.fingerprint
    }
}

/// Cache occupancy snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Number of compiled forms currently stored.
    pub size: usize,
    /// Maximum number of compiled forms stored.
    pub capacity: usize,
}

/// Bounded, thread-safe memo of compiled forms keyed by [`CacheKey`].
pub struct CompilationCache {
    /// Entries and in-flight compiles, guarded together.
    state: Mutex<CacheState>,
}

/// Lock-protected cache state.
struct CacheState {
    /// Published compiled forms in recency order.
    entries: LruCache<CacheKey, Arc<CompiledForm>>,
    /// Compiles currently running outside the lock.
    inflight: HashMap<CacheKey, Arc<Flight>>,
}

/// Rendezvous between a compiling leader and its waiters.
struct Flight {
    /// Completed outcome, once available.
    outcome: Mutex<Option<FlightOutcome>>,
    /// Signalled when `outcome` is set.
    ready: Condvar,
}

/// Terminal state of a flight.
#[derive(Clone)]
enum FlightOutcome {
    /// Leader finished and published this result.
    Done(CompileOutcomeResult),
    /// Leader unwound without a result.
    Abandoned,
}

/// Caller's role for one lookup.
enum Role {
    /// Cache hit.
    Hit(Arc<CompiledForm>),
    /// This caller compiles.
    Leader(Arc<Flight>),
    /// Another caller is compiling.
    Follower(Arc<Flight>),
}

// ============================================================================
// SECTION: Cache
// ============================================================================

impl Default for CompilationCache {
    fn default() -> Self {
        Self::new(NonZeroUsize::new(DEFAULT_CACHE_CAPACITY).unwrap_or(NonZeroUsize::MIN))
    }
}

impl CompilationCache {
    /// Creates an empty cache holding at most `capacity` compiled forms.
    #[must_use]
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            state: Mutex::new(CacheState {
                entries: LruCache::new(capacity),
                inflight: HashMap::new(),
            }),
        }
    }

    /// Creates a cache from a plain capacity, treating zero as one.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self::new(NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN))
    }

    /// Returns the cached form for `key`, compiling it at most once.
    ///
    /// `compile` runs outside the cache lock and only on the leader. Waiters
    /// receive the leader's outcome, including compile errors.
    ///
    /// # Errors
    ///
    /// Returns the [`CompileErrors`] produced by `compile`.
    pub fn get_or_compile<F>(
        &self,
        key: &CacheKey,
        metrics: &dyn CompilerMetrics,
        compile: F,
    ) -> CompileOutcomeResult
    where
        F: FnOnce() -> Result<CompiledForm, CompileErrors>,
    {
        let mut compile = Some(compile);
        loop {
            match self.acquire(key) {
                Role::Hit(form) => {
                    metrics.record_cache(CacheEvent::Hit);
                    return Ok(form);
                }
                Role::Follower(flight) => {
                    metrics.record_cache(CacheEvent::Coalesced);
                    if let FlightOutcome::Done(outcome) = flight.wait() {
                        return outcome;
                    }
                }
                Role::Leader(flight) => {
                    metrics.record_cache(CacheEvent::Miss);
                    let mut lease = FlightLease {
                        cache: self,
                        key,
                        flight,
                        published: false,
                    };
                    let Some(compile) = compile.take() else {
                        continue;
                    };
                    let outcome = compile().map(Arc::new);
                    lease.publish(&outcome, metrics);
                    return outcome;
                }
            }
        }
    }

    /// Drops every published entry.
    ///
    /// In-flight compiles are unaffected and still publish when they finish.
    pub fn clear(&self) {
        self.lock().entries.clear();
    }

    /// Returns the current size and capacity.
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        let state = self.lock();
        CacheStats {
            size: state.entries.len(),
            capacity: state.entries.cap().get(),
        }
    }

    /// Returns whether a compiled form is published for `key`.
    ///
    /// Does not update recency.
    #[must_use]
    pub fn contains(&self, key: &CacheKey) -> bool {
        self.lock().entries.contains(key)
    }

    /// Classifies the caller under the lock, registering a flight on miss.
    fn acquire(&self, key: &CacheKey) -> Role {
        let mut state = self.lock();
        if let Some(form) = state.entries.get(key) {
            return Role::Hit(Arc::clone(form));
        }
        if let Some(flight) = state.inflight.get(key) {
            return Role::Follower(Arc::clone(flight));
        }
        let flight = Arc::new(Flight::new());
        state.inflight.insert(key.clone(), Arc::clone(&flight));
        Role::Leader(flight)
    }

    /// Locks the cache state, recovering from poisoning.
    ///
    /// State is consistent at every unlock point, so a poisoned guard is safe
    /// to reuse.
    fn lock(&self) -> MutexGuard<'_, CacheState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

// ============================================================================
// SECTION: Flights
// ============================================================================

impl Flight {
    /// Creates a pending flight.
    const fn new() -> Self {
        Self {
            outcome: Mutex::new(None),
            ready: Condvar::new(),
        }
    }

    /// Blocks until the leader completes the flight.
    fn wait(&self) -> FlightOutcome {
        let mut outcome = self.outcome.lock().unwrap_or_else(PoisonError::into_inner);
        loop {
            if let Some(done) = outcome.as_ref() {
                return done.clone();
            }
            outcome = self.ready.wait(outcome).unwrap_or_else(PoisonError::into_inner);
        }
    }

    /// Completes the flight and wakes every waiter.
    fn complete(&self, result: FlightOutcome) {
        let mut outcome = self.outcome.lock().unwrap_or_else(PoisonError::into_inner);
        *outcome = Some(result);
        drop(outcome);
        self.ready.notify_all();
    }
}

/// Leader's registration of an in-flight compile.
///
/// Dropping an unpublished lease abandons the flight so waiters retry.
struct FlightLease<'a> {
    /// Owning cache.
    cache: &'a CompilationCache,
    /// Key being compiled.
    key: &'a CacheKey,
    /// Registered flight.
    flight: Arc<Flight>,
    /// Whether the outcome was published.
    published: bool,
}

impl FlightLease<'_> {
    /// Publishes the outcome: stores successes, retires the flight, wakes waiters.
    fn publish(&mut self, outcome: &CompileOutcomeResult, metrics: &dyn CompilerMetrics) {
        let evicted = {
            let mut state = self.cache.lock();
            self.retire(&mut state);
            match outcome {
                Ok(form) => state
                    .entries
                    .push(self.key.clone(), Arc::clone(form))
                    .is_some_and(|(key, _)| &key != self.key),
                Err(_) => false,
            }
        };
        if evicted {
            metrics.record_cache(CacheEvent::Evicted);
        }
        self.published = true;
        self.flight.complete(FlightOutcome::Done(outcome.clone()));
    }

    /// Removes this lease's flight from the in-flight table.
    fn retire(&self, state: &mut CacheState) {
        let registered = state
            .inflight
            .get(self.key)
            .is_some_and(|flight| Arc::ptr_eq(flight, &self.flight));
        if registered {
            state.inflight.remove(self.key);
        }
    }
}

impl Drop for FlightLease<'_> {
    fn drop(&mut self) {
        if self.published {
            return;
        }
        {
            let mut state = self.cache.lock();
            self.retire(&mut state);
        }
        self.flight.complete(FlightOutcome::Abandoned);
    }
}
