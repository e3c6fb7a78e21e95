// crates/form-schema-core/src/core/fingerprint.rs
// ============================================================================
// Module: Form Definition Fingerprint
// Description: Structural digest of a form definition used as a cache key.
// Purpose: Let structurally identical definitions share one compiled form.
// Dependencies: crate::core::{definition, hashing}, serde
// ============================================================================

//! ## Overview
//! The fingerprint covers everything that changes validation or visibility
//! behavior: the version, and per field (in order) its id, submission name,
//! type, required flag, constraint shape, option values, and condition.
//! Presentation metadata (labels, option labels, placeholders, default
//! values) is excluded, so definitions differing only in copy share a
//! compiled form.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

use crate::core::definition::FieldDefinition;
use crate::core::definition::FormDefinition;
use crate::core::definition::Operator;
use crate::core::hashing::DEFAULT_HASH_ALGORITHM;
use crate::core::hashing::HashDigest;
use crate::core::hashing::HashError;
use crate::core::hashing::hash_canonical_json;

// ============================================================================
// SECTION: Fingerprint
// ============================================================================

/// Structural digest of a [`FormDefinition`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint(HashDigest);

impl Fingerprint {
    /// Computes the fingerprint of a definition.
    ///
    /// # Errors
    ///
    /// Returns [`HashError::Canonicalization`] when the structural shape
    /// cannot be canonicalized.
    pub fn of(definition: &FormDefinition) -> Result<Self, HashError> {
        let shape = FormShape {
            version: definition.version.as_str(),
            fields: definition.fields.iter().map(FieldShape::from_field).collect(),
        };
        hash_canonical_json(DEFAULT_HASH_ALGORITHM, &shape).map(Self)
    }

    /// Returns the underlying digest.
    #[must_use]
    pub const fn digest(&self) -> &HashDigest {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

// ============================================================================
// SECTION: Structural Shape
// ============================================================================

/// Hashed projection of a definition.
#[derive(Serialize)]
struct FormShape<'a> {
    /// Definition version.
    version: &'a str,
    /// Field shapes in definition order.
    fields: Vec<FieldShape<'a>>,
}

/// Hashed projection of one field.
#[derive(Serialize)]
struct FieldShape<'a> {
    /// Field identifier.
    id: &'a str,
    /// Submission key.
    name: &'a str,
    /// Wire type label.
    field_type: &'a str,
    /// Required flag.
    required: bool,
    /// Constraint shape.
    constraints: ConstraintShape<'a>,
    /// Option values (labels excluded).
    options: Vec<&'a str>,
    /// Condition shape.
    condition: Option<ConditionShape<'a>>,
}

/// Hashed projection of constraints.
///
/// Floats are rendered as strings so non-finite bounds still hash and are
/// left for the rule compiler to reject.
#[derive(Serialize)]
struct ConstraintShape<'a> {
    /// Minimum length.
    min_length: Option<usize>,
    /// Maximum length.
    max_length: Option<usize>,
    /// Minimum value.
    min_value: Option<String>,
    /// Maximum value.
    max_value: Option<String>,
    /// Pattern source.
    pattern: Option<&'a str>,
}

/// Hashed projection of a condition.
#[derive(Serialize)]
struct ConditionShape<'a> {
    /// Referenced field identifier.
    depends_on: &'a str,
    /// Operator.
    operator: Operator,
    /// Operand.
    value: &'a Value,
}

impl<'a> FieldShape<'a> {
    /// Projects a field definition onto its structural shape.
    fn from_field(field: &'a FieldDefinition) -> Self {
        let constraints = &field.constraints;
        Self {
            id: field.id.as_str(),
            name: &field.name,
            field_type: field.field_type.as_str(),
            required: field.required,
            constraints: ConstraintShape {
                min_length: constraints.min_length,
                max_length: constraints.max_length,
                min_value: constraints.min_value.map(|value| value.to_string()),
                max_value: constraints.max_value.map(|value| value.to_string()),
                pattern: constraints.pattern.as_deref(),
            },
            options: field.options.iter().map(|option| option.value.as_str()).collect(),
            condition: field.condition.as_ref().map(|condition| ConditionShape {
                depends_on: condition.depends_on.as_str(),
                operator: condition.operator,
                value: &condition.value,
            }),
        }
    }
}
