// crates/form-schema-core/src/core/errors.rs
// ============================================================================
// Module: Form Compile Errors
// Description: Structural defects detected while compiling a form definition.
// Purpose: Report every definition defect, with the offending field, in one pass.
// Dependencies: crate::core::identifiers, serde, thiserror
// ============================================================================

//! ## Overview
//! Compile errors describe defects in a definition, never in submitted data.
//! They are deterministic: the same definition always yields the same errors
//! in the same order. [`CompileErrors`] is the non-empty list returned when
//! compilation fails; no partially usable compiled form is ever produced.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::ops::Deref;

use serde::Serialize;
use thiserror::Error;

use crate::core::identifiers::FieldId;

// ============================================================================
// SECTION: Compile Errors
// ============================================================================

/// Structural defect in a form definition.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CompileError {
    /// Field declares a type outside the supported set.
    #[error("field {field}: unknown field type '{field_type}'")]
    UnknownFieldType {
        /// Offending field.
        field: FieldId,
        /// Declared type name.
        field_type: String,
    },
    /// Field constraints are contradictory or malformed.
    #[error("field {field}: invalid constraint: {reason}")]
    InvalidConstraint {
        /// Offending field.
        field: FieldId,
        /// Description of the defect.
        reason: String,
    },
    /// Condition references a field that does not exist.
    #[error("field {field}: condition references unknown field '{target}'")]
    DanglingCondition {
        /// Field declaring the condition.
        field: FieldId,
        /// Missing target.
        target: FieldId,
    },
    /// Condition references its own field.
    #[error("field {field}: condition references itself")]
    SelfReference {
        /// Offending field.
        field: FieldId,
    },
    /// Conditions form a dependency cycle.
    #[error("circular condition: {}", render_cycle(cycle))]
    CircularCondition {
        /// Fields on the cycle, in dependency order.
        cycle: Vec<FieldId>,
    },
    /// Field identifier is declared more than once.
    #[error("duplicate field identifier: {field}")]
    DuplicateFieldId {
        /// Duplicated identifier.
        field: FieldId,
    },
    /// Definition declares more fields than the configured limit.
    #[error("definition declares {actual} fields (limit {limit})")]
    TooManyFields {
        /// Configured limit.
        limit: usize,
        /// Declared field count.
        actual: usize,
    },
    /// Definition could not be canonicalized for fingerprinting.
    ///
    /// Carries a serializer failure from [`Fingerprint::of`]. The hashed
    /// projection holds only strings, integers, booleans, and parsed JSON
    /// values, so definitions decoded from JSON or built through the public
    /// constructors never produce it.
    ///
    /// [`Fingerprint::of`]: crate::core::Fingerprint::of
    #[error("definition could not be fingerprinted: {reason}")]
    Canonicalization {
        /// Canonicalization failure detail.
        reason: String,
    },
}

impl CompileError {
    /// Returns a stable label for the error kind.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::UnknownFieldType {
                ..
            } => "unknown_field_type",
            Self::InvalidConstraint {
                ..
            } => "invalid_constraint",
            Self::DanglingCondition {
                ..
            } => "dangling_condition",
            Self::SelfReference {
                ..
            } => "self_reference",
            Self::CircularCondition {
                ..
            } => "circular_condition",
            Self::DuplicateFieldId {
                ..
            } => "duplicate_field_id",
            Self::TooManyFields {
                ..
            } => "too_many_fields",
            Self::Canonicalization {
                ..
            } => "canonicalization",
        }
    }
}

/// Renders a cycle as `a -> b -> a`.
fn render_cycle(cycle: &[FieldId]) -> String {
    let mut out = String::new();
    for field in cycle {
        out.push_str(field.as_str());
        out.push_str(" -> ");
    }
    if let Some(first) = cycle.first() {
        out.push_str(first.as_str());
    }
    out
}

// ============================================================================
// SECTION: Error Lists
// ============================================================================

/// Every defect found while compiling one definition.
///
/// # Invariants
/// - Never empty when returned from the compiler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct CompileErrors(Vec<CompileError>);

impl CompileErrors {
    /// Wraps a list of errors.
    #[must_use]
    pub const fn new(errors: Vec<CompileError>) -> Self {
        Self(errors)
    }

    /// Consumes the list, returning the errors.
    #[must_use]
    pub fn into_inner(self) -> Vec<CompileError> {
        self.0
    }
}

impl Deref for CompileErrors {
    type Target = [CompileError];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<CompileError> for CompileErrors {
    fn from(error: CompileError) -> Self {
        Self(vec![error])
    }
}

impl fmt::Display for CompileErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} compile error(s)", self.0.len())?;
        for (index, error) in self.0.iter().enumerate() {
            let separator = if index == 0 { ": " } else { "; " };
            write!(f, "{separator}{error}")?;
        }
        Ok(())
    }
}

impl std::error::Error for CompileErrors {}
