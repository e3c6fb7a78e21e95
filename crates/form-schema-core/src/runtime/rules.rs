// crates/form-schema-core/src/runtime/rules.rs
// ============================================================================
// Module: Field Rule Compiler
// Description: Compiles one field definition into its validation rule.
// Purpose: Match the closed field type set exactly once and precompute checks.
// Dependencies: crate::core, regex, serde_json, time
// ============================================================================

//! ## Overview
//! [`compile_field`] resolves a [`FieldDefinition`] into a [`FieldRule`]:
//! effective length bounds, a compiled pattern, numeric bounds, or the
//! allowed option set. Constraint contradictions are rejected here so that
//! [`FieldRule::check`] never has to second-guess its configuration.
//!
//! Missing values are absent keys, `null`, or the empty string (except for
//! checkboxes, where only `true` satisfies `required`). A missing value on an
//! optional field passes without running any other check. All failing checks
//! for a present value are reported, not just the first.

// ============================================================================
// SECTION: Imports
// ============================================================================

use regex::Regex;
use serde_json::Value;
use time::Date;
use time::Month;

use crate::core::CompileError;
use crate::core::FieldDefinition;
use crate::core::FieldId;
use crate::core::FieldType;
use crate::core::ValidationError;
use crate::core::ValidationErrorKind;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default minimum length for text and textarea fields.
pub const DEFAULT_MIN_LENGTH: usize = 1;
/// Default maximum length for text fields.
pub const DEFAULT_TEXT_MAX_LENGTH: usize = 500;
/// Default maximum length for textarea fields.
pub const DEFAULT_TEXTAREA_MAX_LENGTH: usize = 2_000;
/// Default maximum pattern source length in bytes.
pub const DEFAULT_MAX_PATTERN_LENGTH: usize = 1_024;

// ============================================================================
// SECTION: Rule Types
// ============================================================================

/// Limits applied while compiling field rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuleLimits {
    /// Maximum pattern source length in bytes.
    pub max_pattern_length: usize,
}

impl Default for RuleLimits {
    fn default() -> Self {
        Self {
            max_pattern_length: DEFAULT_MAX_PATTERN_LENGTH,
        }
    }
}

/// Compiled validation rule for one field.
#[derive(Debug, Clone)]
pub struct FieldRule {
    /// Field identifier.
    field_id: FieldId,
    /// Submission key.
    key: String,
    /// Field type (always one of the supported variants).
    field_type: FieldType,
    /// Whether the field must carry a value while visible.
    required: bool,
    /// Type-specific checks.
    check: ValueCheck,
}

/// Type-specific checks with defaults resolved.
#[derive(Debug, Clone)]
enum ValueCheck {
    /// Text or textarea.
    Text {
        /// Effective minimum length in characters.
        min_length: usize,
        /// Effective maximum length in characters.
        max_length: usize,
        /// Compiled pattern.
        pattern: Option<Regex>,
    },
    /// Number with optional inclusive bounds.
    Number {
        /// Lower bound.
        min: Option<f64>,
        /// Upper bound.
        max: Option<f64>,
    },
    /// Select over declared option values (empty means unrestricted).
    Select {
        /// Allowed values.
        options: Vec<String>,
    },
    /// Boolean checkbox.
    Checkbox,
    /// `YYYY-MM-DD` calendar date.
    Date,
}

impl FieldRule {
    /// Returns the field identifier.
    #[must_use]
    pub const fn field_id(&self) -> &FieldId {
        &self.field_id
    }

    /// Returns the submission key the rule reads.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Returns the field type.
    #[must_use]
    pub const fn field_type(&self) -> &FieldType {
        &self.field_type
    }

    /// Returns whether the field is required.
    #[must_use]
    pub const fn is_required(&self) -> bool {
        self.required
    }

    /// Checks a value, appending one error per failed check to `errors`.
    pub fn check(&self, value: Option<&Value>, errors: &mut Vec<ValidationError>) {
        if matches!(self.check, ValueCheck::Checkbox) {
            self.check_checkbox(value, errors);
            return;
        }
        let Some(value) = value.filter(|value| !is_missing(value)) else {
            if self.required {
                errors.push(self.error(ValidationErrorKind::Required, "This field is required"));
            }
            return;
        };
        match &self.check {
            ValueCheck::Text {
                min_length,
                max_length,
                pattern,
            } => self.check_text(value, *min_length, *max_length, pattern.as_ref(), errors),
            ValueCheck::Number {
                min,
                max,
            } => self.check_number(value, *min, *max, errors),
            ValueCheck::Select {
                options,
            } => self.check_select(value, options, errors),
            ValueCheck::Date => self.check_date(value, errors),
            ValueCheck::Checkbox => {}
        }
    }

    /// Checks a checkbox: `required` means the value must be `true`.
    fn check_checkbox(&self, value: Option<&Value>, errors: &mut Vec<ValidationError>) {
        match value {
            None | Some(Value::Null | Value::Bool(false)) => {
                if self.required {
                    let message = "This box must be checked";
                    errors.push(self.error(ValidationErrorKind::Required, message));
                }
            }
            Some(Value::Bool(true)) => {}
            Some(_) => {
                errors.push(self.error(ValidationErrorKind::InvalidType, "Expected true or false"));
            }
        }
    }

    /// Checks text length and pattern; length and pattern failures are independent.
    fn check_text(
        &self,
        value: &Value,
        min_length: usize,
        max_length: usize,
        pattern: Option<&Regex>,
        errors: &mut Vec<ValidationError>,
    ) {
        let Value::String(text) = value else {
            errors.push(self.error(ValidationErrorKind::InvalidType, "Expected text"));
            return;
        };
        let length = text.chars().count();
        if length < min_length {
            errors.push(self.error(
                ValidationErrorKind::TooShort,
                format!("Must be at least {min_length} characters"),
            ));
        }
        if length > max_length {
            errors.push(self.error(
                ValidationErrorKind::TooLong,
                format!("Must be at most {max_length} characters"),
            ));
        }
        if let Some(pattern) = pattern
            && !pattern.is_match(text)
        {
            errors.push(self.error(ValidationErrorKind::PatternMismatch, "Invalid format"));
        }
    }

    /// Checks numeric type and inclusive bounds.
    fn check_number(
        &self,
        value: &Value,
        min: Option<f64>,
        max: Option<f64>,
        errors: &mut Vec<ValidationError>,
    ) {
        let Some(number) = value.as_f64() else {
            errors.push(self.error(ValidationErrorKind::InvalidType, "Expected a number"));
            return;
        };
        let below = min.is_some_and(|min| number < min);
        let above = max.is_some_and(|max| number > max);
        if below || above {
            errors.push(self.error(ValidationErrorKind::OutOfRange, range_message(min, max)));
        }
    }

    /// Checks option membership when options are declared.
    fn check_select(&self, value: &Value, options: &[String], errors: &mut Vec<ValidationError>) {
        let Value::String(selected) = value else {
            errors.push(self.error(ValidationErrorKind::InvalidType, "Expected an option value"));
            return;
        };
        if !options.is_empty() && !options.iter().any(|option| option == selected) {
            errors.push(self.error(ValidationErrorKind::InvalidOption, "Select a listed option"));
        }
    }

    /// Checks that the value is a `YYYY-MM-DD` calendar date.
    fn check_date(&self, value: &Value, errors: &mut Vec<ValidationError>) {
        let valid = value.as_str().and_then(parse_calendar_date).is_some();
        if !valid {
            errors.push(self.error(
                ValidationErrorKind::InvalidType,
                "Expected a date in YYYY-MM-DD format",
            ));
        }
    }

    /// Builds an error for this field.
    fn error(&self, kind: ValidationErrorKind, message: impl Into<String>) -> ValidationError {
        ValidationError::new(self.field_id.clone(), kind, message)
    }
}

// ============================================================================
// SECTION: Compilation
// ============================================================================

/// Compiles a field with default limits.
///
/// # Errors
///
/// Returns [`CompileError::UnknownFieldType`] or
/// [`CompileError::InvalidConstraint`] naming the field.
pub fn compile(field: &FieldDefinition) -> Result<FieldRule, CompileError> {
    compile_field(field, &RuleLimits::default())
}

/// Compiles a field into its validation rule.
///
/// # Errors
///
/// Returns [`CompileError::UnknownFieldType`] for unsupported types and
/// [`CompileError::InvalidConstraint`] for contradictory or malformed
/// constraints.
pub fn compile_field(
    field: &FieldDefinition,
    limits: &RuleLimits,
) -> Result<FieldRule, CompileError> {
    let constraints = &field.constraints;
    let check = match &field.field_type {
        FieldType::Text => compile_text(field, DEFAULT_TEXT_MAX_LENGTH, limits)?,
        FieldType::Textarea => compile_text(field, DEFAULT_TEXTAREA_MAX_LENGTH, limits)?,
        FieldType::Number => {
            let bounds = [("minValue", constraints.min_value), ("maxValue", constraints.max_value)];
            for (label, bound) in bounds {
                if bound.is_some_and(|bound| !bound.is_finite()) {
                    return Err(invalid(field, format!("{label} must be finite")));
                }
            }
            if let (Some(min), Some(max)) = (constraints.min_value, constraints.max_value)
                && min > max
            {
                return Err(invalid(field, format!("minValue {min} exceeds maxValue {max}")));
            }
            ValueCheck::Number {
                min: constraints.min_value,
                max: constraints.max_value,
            }
        }
        FieldType::Select => ValueCheck::Select {
            options: field.options.iter().map(|option| option.value.clone()).collect(),
        },
        FieldType::Checkbox => ValueCheck::Checkbox,
        FieldType::Date => ValueCheck::Date,
        FieldType::Unsupported(name) => {
            return Err(CompileError::UnknownFieldType {
                field: field.id.clone(),
                field_type: name.clone(),
            });
        }
    };
    Ok(FieldRule {
        field_id: field.id.clone(),
        key: field.name.clone(),
        field_type: field.field_type.clone(),
        required: field.required,
        check,
    })
}

/// Resolves text length bounds and compiles the pattern.
fn compile_text(
    field: &FieldDefinition,
    default_max: usize,
    limits: &RuleLimits,
) -> Result<ValueCheck, CompileError> {
    let constraints = &field.constraints;
    let min_length = constraints.min_length.unwrap_or(DEFAULT_MIN_LENGTH);
    let max_length = constraints.max_length.unwrap_or(default_max);
    if min_length > max_length {
        return Err(invalid(
            field,
            format!("minLength {min_length} exceeds maxLength {max_length}"),
        ));
    }
    let pattern = match constraints.pattern.as_deref() {
        None => None,
        Some(source) if source.len() > limits.max_pattern_length => {
            return Err(invalid(
                field,
                format!(
                    "pattern is {} bytes (limit {})",
                    source.len(),
                    limits.max_pattern_length
                ),
            ));
        }
        Some(source) => Some(
            Regex::new(source).map_err(|err| invalid(field, format!("invalid pattern: {err}")))?,
        ),
    };
    Ok(ValueCheck::Text {
        min_length,
        max_length,
        pattern,
    })
}

/// Builds an invalid-constraint error for a field.
fn invalid(field: &FieldDefinition, reason: String) -> CompileError {
    CompileError::InvalidConstraint {
        field: field.id.clone(),
        reason,
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Returns true for values treated as "not supplied".
fn is_missing(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(text) => text.is_empty(),
        _ => false,
    }
}

/// Formats the out-of-range message for the configured bounds.
fn range_message(min: Option<f64>, max: Option<f64>) -> String {
    match (min, max) {
        (Some(min), Some(max)) => format!("Must be between {min} and {max}"),
        (Some(min), None) => format!("Must be at least {min}"),
        (None, Some(max)) => format!("Must be at most {max}"),
        (None, None) => "Out of range".to_string(),
    }
}

/// Parses a strict `YYYY-MM-DD` calendar date.
fn parse_calendar_date(value: &str) -> Option<Date> {
    let bytes = value.as_bytes();
    if bytes.len() != 10 || bytes[4] != b'-' || bytes[7] != b'-' {
        return None;
    }
    let digits = [&value[0 .. 4], &value[5 .. 7], &value[8 .. 10]];
    if digits.iter().any(|part| !part.bytes().all(|byte| byte.is_ascii_digit())) {
        return None;
    }
    let year: i32 = digits[0].parse().ok()?;
    let month: u8 = digits[1].parse().ok()?;
    let day: u8 = digits[2].parse().ok()?;
    let month = Month::try_from(month).ok()?;
    Date::from_calendar_date(year, month, day).ok()
}
