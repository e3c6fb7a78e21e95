// crates/form-schema-cli/src/tests/audit.rs
// ============================================================================
// Module: CLI Audit Sink Tests
// Description: Unit tests for JSON-lines audit sinks and sink selection.
// Purpose: Ensure each compile is recorded as one parseable JSON line.
// Dependencies: form-schema-cli audit module, tempfile
// ============================================================================

//! ## Overview
//! Drives a real compiler through the file sink and reads the log back.

use std::fs;
use std::sync::Arc;
use std::thread;

use form_schema_config::AuditConfig;
use form_schema_config::AuditSinkKind;
use form_schema_core::FieldDefinition;
use form_schema_core::FieldType;
use form_schema_core::FormCompiler;
use form_schema_core::FormDefinition;
use serde_json::Value;
use tempfile::TempDir;

use crate::audit::AuditSinkError;
use crate::audit::FileAuditSink;
use crate::audit::audit_sink_for;

#[test]
fn file_sink_appends_one_line_per_compile() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("audit.jsonl");
    let sink = Arc::new(FileAuditSink::new(&path).unwrap());
    let compiler = FormCompiler::default().with_audit_sink(sink);

    let good = FormDefinition::new("1", vec![FieldDefinition::new("a", FieldType::Text)]);
    let bad = FormDefinition::new("2", vec![FieldDefinition::new(
        "b",
        FieldType::Unsupported("stars".to_string()),
    )]);
    compiler.compile_form(&good).unwrap();
    compiler.compile_form(&good).unwrap();
    compiler.compile_form(&bad).unwrap_err();

    let content = fs::read_to_string(&path).unwrap();
    let lines: Vec<Value> =
        content.lines().map(|line| serde_json::from_str(line).unwrap()).collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0]["event"], "form_compile");
    assert_eq!(lines[0]["outcome"], "compiled");
    assert_eq!(lines[0]["version"], "1");
    assert!(lines[0]["fingerprint"].as_str().unwrap().starts_with("sha256:"));
    assert_eq!(lines[1]["outcome"], "rejected");
    assert_eq!(lines[1]["error_kinds"], serde_json::json!(["unknown_field_type"]));
}

#[test]
fn file_sink_keeps_writing_after_poisoned_lock() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("audit.jsonl");
    let sink = Arc::new(FileAuditSink::new(&path).unwrap());

    let holder = Arc::clone(&sink);
    let crashed = thread::spawn(move || {
        let _guard = holder.file.lock().unwrap();
        panic!("writer crashed while holding the audit log");
    })
    .join();
    assert!(crashed.is_err());
    assert!(sink.file.is_poisoned());

    let compiler = FormCompiler::default().with_audit_sink(sink);
    let form = FormDefinition::new("1", vec![FieldDefinition::new("a", FieldType::Text)]);
    compiler.compile_form(&form).unwrap();

    let content = fs::read_to_string(&path).unwrap();
    assert_eq!(content.lines().count(), 1);
    let event: Value = serde_json::from_str(content.trim_end()).unwrap();
    assert_eq!(event["outcome"], "compiled");
}

#[test]
fn sink_selection_follows_config() {
    let dir = TempDir::new().unwrap();
    assert!(audit_sink_for(&AuditConfig::default()).is_ok());
    assert!(
        audit_sink_for(&AuditConfig {
            sink: AuditSinkKind::Stderr,
            path: None,
        })
        .is_ok()
    );

    let missing = audit_sink_for(&AuditConfig {
        sink: AuditSinkKind::File,
        path: None,
    });
    assert!(matches!(missing, Err(AuditSinkError::MissingPath)));

    let unopenable = audit_sink_for(&AuditConfig {
        sink: AuditSinkKind::File,
        path: Some(dir.path().join("missing-dir").join("audit.jsonl").display().to_string()),
    });
    assert!(matches!(unopenable, Err(AuditSinkError::Open { .. })));

    let path = dir.path().join("audit.jsonl");
    let opened = audit_sink_for(&AuditConfig {
        sink: AuditSinkKind::File,
        path: Some(path.display().to_string()),
    });
    assert!(opened.is_ok());
    assert!(path.exists());
}
