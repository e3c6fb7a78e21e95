// crates/form-schema-core/src/core/definition.rs
// ============================================================================
// Module: Form Definition Model
// Description: Declarative form definitions, field constraints, and conditions.
// Purpose: Provide the canonical, serializable input to the form compiler.
// Dependencies: crate::core::identifiers, serde, serde_json
// ============================================================================

//! ## Overview
//! A [`FormDefinition`] is an ordered list of typed fields. Each field carries
//! type-dependent [`Constraints`] and at most one visibility [`Condition`]
//! that references another field's value. Definitions are plain data: they
//! are validated structurally by the compiler, never here.
//!
//! The wire form is the camelCase JSON persisted by form-builder tooling.
//! Field types that are not part of the closed set deserialize into
//! [`FieldType::Unsupported`] so the compiler can report them alongside every
//! other defect instead of failing the whole parse.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

use crate::core::identifiers::FieldId;
use crate::core::identifiers::FormVersion;

// ============================================================================
// SECTION: Form Definition
// ============================================================================

/// Declarative, versioned list of field definitions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormDefinition {
    /// Definition version identifier.
    pub version: FormVersion,
    /// Fields in display order.
    pub fields: Vec<FieldDefinition>,
}

impl FormDefinition {
    /// Creates a definition from a version and ordered fields.
    #[must_use]
    pub fn new(version: impl Into<String>, fields: Vec<FieldDefinition>) -> Self {
        Self {
            version: FormVersion::new(version),
            fields,
        }
    }

    /// Returns the field with the given identifier, if present.
    #[must_use]
    pub fn field(&self, field_id: &str) -> Option<&FieldDefinition> {
        self.fields.iter().find(|field| field.id.as_str() == field_id)
    }
}

// ============================================================================
// SECTION: Field Definition
// ============================================================================

/// Definition of one form field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDefinition {
    /// Field identifier, unique within the form.
    pub id: FieldId,
    /// Submission key used to read the field's value from submitted data.
    pub name: String,
    /// Field type.
    #[serde(rename = "type")]
    pub field_type: FieldType,
    /// Display label (presentation only).
    #[serde(default)]
    pub label: String,
    /// Whether a value must be supplied while the field is visible.
    #[serde(default)]
    pub required: bool,
    /// Type-dependent constraints.
    #[serde(default)]
    pub constraints: Constraints,
    /// Allowed options (select fields only).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<SelectOption>,
    /// Placeholder text (presentation only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    /// Initial value shown by the UI (presentation only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<Value>,
    /// Optional visibility condition.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<Condition>,
}

impl FieldDefinition {
    /// Creates an optional, unconstrained field whose name and label equal its id.
    #[must_use]
    pub fn new(id: impl Into<String>, field_type: FieldType) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            label: id.clone(),
            id: FieldId::new(id),
            field_type,
            required: false,
            constraints: Constraints::default(),
            options: Vec::new(),
            placeholder: None,
            default_value: None,
            condition: None,
        }
    }

    /// Marks the field as required.
    #[must_use]
    pub const fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Replaces the submission key.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Replaces the constraints.
    #[must_use]
    pub fn with_constraints(mut self, constraints: Constraints) -> Self {
        self.constraints = constraints;
        self
    }

    /// Replaces the select options from `(label, value)` pairs.
    #[must_use]
    pub fn with_options<L, V>(mut self, options: impl IntoIterator<Item = (L, V)>) -> Self
    where
        L: Into<String>,
        V: Into<String>,
    {
        self.options = options
            .into_iter()
            .map(|(label, value)| SelectOption {
                label: label.into(),
                value: value.into(),
            })
            .collect();
        self
    }

    /// Attaches a visibility condition.
    #[must_use]
    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.condition = Some(condition);
        self
    }
}

// ============================================================================
// SECTION: Field Types
// ============================================================================

/// Field type.
///
/// # Invariants
/// - The six named variants form the closed set the compiler understands.
/// - [`FieldType::Unsupported`] only carries wire input outside that set and
///   is always rejected at compile time.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FieldType {
    /// Single-line text.
    Text,
    /// Multi-line text.
    Textarea,
    /// Numeric input.
    Number,
    /// Choice among declared options.
    Select,
    /// Boolean checkbox.
    Checkbox,
    /// Calendar date (`YYYY-MM-DD`).
    Date,
    /// Unrecognized type name from the wire.
    Unsupported(String),
}

impl FieldType {
    /// Returns the stable wire label for the type.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Text => "text",
            Self::Textarea => "textarea",
            Self::Number => "number",
            Self::Select => "select",
            Self::Checkbox => "checkbox",
            Self::Date => "date",
            Self::Unsupported(name) => name,
        }
    }
}

impl From<String> for FieldType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "text" => Self::Text,
            "textarea" => Self::Textarea,
            "number" => Self::Number,
            "select" => Self::Select,
            "checkbox" => Self::Checkbox,
            "date" => Self::Date,
            _ => Self::Unsupported(value),
        }
    }
}

impl From<FieldType> for String {
    fn from(value: FieldType) -> Self {
        match value {
            FieldType::Unsupported(name) => name,
            other => other.as_str().to_string(),
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// SECTION: Constraints
// ============================================================================

/// Type-dependent field constraints.
///
/// Constraints that do not apply to a field's type are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Constraints {
    /// Minimum length in characters (text types).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<usize>,
    /// Maximum length in characters (text types).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
    /// Minimum numeric value, inclusive (number type).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_value: Option<f64>,
    /// Maximum numeric value, inclusive (number type).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_value: Option<f64>,
    /// Regular expression the value must match (text types).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
}

/// Select option.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectOption {
    /// Display label (presentation only).
    pub label: String,
    /// Submitted value.
    pub value: String,
}

// ============================================================================
// SECTION: Conditions
// ============================================================================

/// Visibility condition referencing one other field's value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    /// Field whose value controls visibility.
    pub depends_on: FieldId,
    /// Comparison operator.
    pub operator: Operator,
    /// Operand compared against the referenced value.
    #[serde(default)]
    pub value: Value,
}

impl Condition {
    /// Creates a condition on `depends_on`.
    #[must_use]
    pub fn new(depends_on: impl Into<String>, operator: Operator, value: Value) -> Self {
        Self {
            depends_on: FieldId::new(depends_on),
            operator,
            value,
        }
    }
}

/// Condition comparison operator.
///
/// # Invariants
/// - Variants are stable; the set is closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operator {
    /// Structural equality.
    Equals,
    /// Structural inequality.
    NotEquals,
    /// Numeric `>`.
    GreaterThan,
    /// Numeric `<`.
    LessThan,
    /// Numeric `>=`.
    GreaterOrEqual,
    /// Numeric `<=`.
    LessOrEqual,
    /// Substring test over string-coerced operands.
    Contains,
    /// Referenced value is non-null and not an empty string.
    NotEmpty,
}

impl Operator {
    /// Returns a stable label for the operator.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Equals => "equals",
            Self::NotEquals => "not_equals",
            Self::GreaterThan => "greater_than",
            Self::LessThan => "less_than",
            Self::GreaterOrEqual => "greater_or_equal",
            Self::LessOrEqual => "less_or_equal",
            Self::Contains => "contains",
            Self::NotEmpty => "not_empty",
        }
    }
}
