// crates/form-schema-core/src/core/validation.rs
// ============================================================================
// Module: Validation Results
// Description: Per-field validation errors and visibility maps.
// Purpose: Provide the caller-owned outputs of validate and compute_visibility.
// Dependencies: crate::core::identifiers, serde
// ============================================================================

//! ## Overview
//! Validation errors are the normal output for bad submissions, not
//! exceptional control flow. A field may produce zero, one, or several
//! errors. Results are plain data and stay valid after the compiled form
//! that produced them is evicted.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value;

use crate::core::identifiers::FieldId;

// ============================================================================
// SECTION: Snapshots
// ============================================================================

/// Submitted values keyed by field submission name.
pub type FormValues = Map<String, Value>;

/// Field visibility keyed by field identifier.
pub type VisibilityMap = BTreeMap<FieldId, bool>;

// ============================================================================
// SECTION: Validation Errors
// ============================================================================

/// Category of a failed field check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationErrorKind {
    /// Required value missing (or an unchecked required checkbox).
    Required,
    /// Text shorter than the minimum length.
    TooShort,
    /// Text longer than the maximum length.
    TooLong,
    /// Number outside the allowed range.
    OutOfRange,
    /// Text does not match the pattern.
    PatternMismatch,
    /// Select value is not one of the declared options.
    InvalidOption,
    /// Value has the wrong type or format.
    InvalidType,
}

impl ValidationErrorKind {
    /// Returns a stable label for the kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Required => "required",
            Self::TooShort => "too_short",
            Self::TooLong => "too_long",
            Self::OutOfRange => "out_of_range",
            Self::PatternMismatch => "pattern_mismatch",
            Self::InvalidOption => "invalid_option",
            Self::InvalidType => "invalid_type",
        }
    }
}

/// One failed check on one field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationError {
    /// Field that failed.
    pub field_id: FieldId,
    /// Failure category.
    pub kind: ValidationErrorKind,
    /// Human-readable message.
    pub message: String,
}

impl ValidationError {
    /// Creates a validation error.
    #[must_use]
    pub fn new(field_id: FieldId, kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            field_id,
            kind,
            message: message.into(),
        }
    }
}

// ============================================================================
// SECTION: Validation Result
// ============================================================================

/// Outcome of validating one submission.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    /// Errors in field order, then check order.
    pub errors: Vec<ValidationError>,
}

impl ValidationResult {
    /// Returns true when no field failed.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Returns the errors reported for one field.
    pub fn errors_for<'a>(
        &'a self,
        field_id: &'a str,
    ) -> impl Iterator<Item = &'a ValidationError> + 'a {
        self.errors.iter().filter(move |error| error.field_id.as_str() == field_id)
    }

    /// Returns true when the field has an error of the given kind.
    #[must_use]
    pub fn has_error(&self, field_id: &str, kind: ValidationErrorKind) -> bool {
        self.errors_for(field_id).any(|error| error.kind == kind)
    }
}
