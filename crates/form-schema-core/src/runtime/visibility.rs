// crates/form-schema-core/src/runtime/visibility.rs
// ============================================================================
// Module: Visibility Evaluator
// Description: Computes field visibility from a condition graph and values.
// Purpose: Apply the fixed operator set with conservative missing-value handling.
// Dependencies: crate::{core, runtime::graph}, bigdecimal, serde_json
// ============================================================================

//! ## Overview
//! A field without a condition is always visible. A conditional field is
//! visible only when the controlling value is present in the snapshot and
//! the operator holds; an absent value hides the field regardless of the
//! operator. Visibility depends on raw values only, never on another field's
//! visibility, so fields are evaluated independently and in any order.
//!
//! Ordering operators coerce both operands to decimals (numbers and numeric
//! strings); anything else makes the condition false. `contains` coerces
//! scalar operands to strings. Equality is structural, except that numbers
//! compare by decimal value so `1` equals `1.0`.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::cmp::Ordering;
use std::str::FromStr;

use bigdecimal::BigDecimal;
use serde_json::Value;

use crate::core::FormValues;
use crate::core::Operator;
use crate::core::VisibilityMap;
use crate::runtime::graph::ConditionEdge;
use crate::runtime::graph::ConditionGraph;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Largest decimal exponent magnitude accepted for ordering comparisons.
const MAX_DECIMAL_SCALE: u64 = 4_096;

// ============================================================================
// SECTION: Visibility
// ============================================================================

/// Computes the visibility of every field in the graph.
#[must_use]
pub fn compute_visibility(graph: &ConditionGraph, values: &FormValues) -> VisibilityMap {
    graph
        .field_ids()
        .iter()
        .map(|field_id| (field_id.clone(), is_visible(graph, field_id.as_str(), values)))
        .collect()
}

/// Returns whether one field is visible for the given values.
///
/// Fields unknown to the graph carry no condition and are reported visible.
#[must_use]
pub fn is_visible(graph: &ConditionGraph, field_id: &str, values: &FormValues) -> bool {
    graph.condition(field_id).is_none_or(|edge| edge_holds(edge, values))
}

/// Evaluates one condition edge against the snapshot.
fn edge_holds(edge: &ConditionEdge, values: &FormValues) -> bool {
    values
        .get(&edge.depends_on_key)
        .is_some_and(|actual| evaluate_operator(edge.operator, actual, &edge.value))
}

// ============================================================================
// SECTION: Operators
// ============================================================================

/// Evaluates an operator against a present controlling value.
#[must_use]
pub fn evaluate_operator(operator: Operator, actual: &Value, expected: &Value) -> bool {
    match operator {
        Operator::Equals => values_equal(actual, expected),
        Operator::NotEquals => !values_equal(actual, expected),
        Operator::GreaterThan => compare_numeric(actual, expected).is_some_and(Ordering::is_gt),
        Operator::LessThan => compare_numeric(actual, expected).is_some_and(Ordering::is_lt),
        Operator::GreaterOrEqual => compare_numeric(actual, expected).is_some_and(Ordering::is_ge),
        Operator::LessOrEqual => compare_numeric(actual, expected).is_some_and(Ordering::is_le),
        Operator::Contains => match (coerce_string(actual), coerce_string(expected)) {
            (Some(haystack), Some(needle)) => haystack.contains(needle.as_str()),
            _ => false,
        },
        Operator::NotEmpty => match actual {
            Value::Null => false,
            Value::String(text) => !text.is_empty(),
            _ => true,
        },
    }
}

/// Compares values structurally, with decimal-aware numbers.
fn values_equal(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Number(_), Value::Number(_)) => {
            compare_numeric(left, right).map_or(left == right, Ordering::is_eq)
        }
        _ => left == right,
    }
}

/// Orders two values after numeric coercion.
fn compare_numeric(left: &Value, right: &Value) -> Option<Ordering> {
    let left = coerce_decimal(left)?;
    let right = coerce_decimal(right)?;
    Some(left.cmp(&right))
}

/// Coerces numbers and numeric strings into decimals.
///
/// Decimals whose exponent exceeds [`MAX_DECIMAL_SCALE`] are not comparable.
fn coerce_decimal(value: &Value) -> Option<BigDecimal> {
    let decimal = match value {
        Value::Number(number) => BigDecimal::from_str(&number.to_string()).ok(),
        Value::String(text) => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                return None;
            }
            BigDecimal::from_str(trimmed).ok()
        }
        _ => None,
    }?;
    let (_, scale) = decimal.as_bigint_and_exponent();
    (scale.unsigned_abs() <= MAX_DECIMAL_SCALE).then_some(decimal)
}

/// Coerces scalar values into strings.
fn coerce_string(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}
