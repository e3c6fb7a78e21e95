// crates/form-schema-cli/src/audit.rs
// ============================================================================
// Module: Compile Audit Sinks
// Description: JSON-lines sinks for compile audit events.
// Purpose: Route compile audit records to stderr or an append-only file.
// Dependencies: form-schema-config, form-schema-core, serde_json
// ============================================================================

//! ## Overview
//! Each compile that actually runs produces one
//! [`CompileAuditEvent`]; these sinks serialize it as a single JSON line.
//! Write failures are dropped so auditing never fails a compile.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::File;
use std::fs::OpenOptions;
use std::io;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::PoisonError;

use form_schema_config::AuditConfig;
use form_schema_config::AuditSinkKind;
use form_schema_core::CompileAuditEvent;
use form_schema_core::CompileAuditSink;
use form_schema_core::NoopAuditSink;
use thiserror::Error;

// ============================================================================
// SECTION: Sinks
// ============================================================================

/// Audit sink that logs JSON lines to stderr.
pub struct StderrAuditSink;

impl CompileAuditSink for StderrAuditSink {
    fn record(&self, event: &CompileAuditEvent) {
        if let Ok(payload) = serde_json::to_string(event) {
            let _ = writeln!(std::io::stderr(), "{payload}");
        }
    }
}

/// Audit sink that logs JSON lines to a file.
pub struct FileAuditSink {
    /// File handle used for append-only logging.
    pub(crate) file: Mutex<File>,
}

impl FileAuditSink {
    /// Opens the audit log file in append mode.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened.
    pub fn new(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }
}

impl CompileAuditSink for FileAuditSink {
    fn record(&self, event: &CompileAuditEvent) {
        if let Ok(payload) = serde_json::to_string(event) {
            let mut file = self.file.lock().unwrap_or_else(PoisonError::into_inner);
            let _ = writeln!(file, "{payload}");
            let _ = file.flush();
        }
    }
}

// ============================================================================
// SECTION: Selection
// ============================================================================

/// Errors raised while constructing the configured audit sink.
#[derive(Debug, Error)]
pub enum AuditSinkError {
    /// The file sink was selected without a path.
    #[error("audit.path is required for the file audit sink")]
    MissingPath,
    /// The audit log could not be opened.
    #[error("failed to open audit log {}: {source}", path.display())]
    Open {
        /// Audit log path.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },
}

/// Builds the audit sink selected by `config`.
///
/// # Errors
///
/// Returns [`AuditSinkError`] when the file sink cannot be opened.
pub fn audit_sink_for(config: &AuditConfig) -> Result<Arc<dyn CompileAuditSink>, AuditSinkError> {
    match config.sink {
        AuditSinkKind::None => Ok(Arc::new(NoopAuditSink)),
        AuditSinkKind::Stderr => Ok(Arc::new(StderrAuditSink)),
        AuditSinkKind::File => {
            let path = config.path.as_deref().map(str::trim).ok_or(AuditSinkError::MissingPath)?;
            let path = PathBuf::from(path);
            let sink = FileAuditSink::new(&path).map_err(|source| AuditSinkError::Open {
                path,
                source,
            })?;
            Ok(Arc::new(sink))
        }
    }
}
