// crates/form-schema-core/src/runtime/graph.rs
// ============================================================================
// Module: Condition Graph Builder
// Description: Field visibility dependency graph with integrity checks.
// Purpose: Reject duplicate ids, dangling or self references, and cycles.
// Dependencies: crate::core, serde_json
// ============================================================================

//! ## Overview
//! Every field with a condition contributes one edge `field -> dependsOn`.
//! Because a field declares at most one condition, each node has at most one
//! outgoing edge, and the depth-first walk with visiting/visited marks
//! reduces to following that edge until a visited node, a visiting node
//! (a cycle), or a node without a condition is reached. The walk is
//! iterative so long dependency chains cannot exhaust the stack.
//!
//! ## Invariants
//! - A built graph has unique field ids, resolvable targets, no self edges,
//!   and no cycles.
//! - Each cycle is reported once, starting at the first cycle member in
//!   field order, listing every member in dependency order.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use serde_json::Value;

use crate::core::CompileError;
use crate::core::FieldDefinition;
use crate::core::FieldId;
use crate::core::Operator;

// ============================================================================
// SECTION: Graph Types
// ============================================================================

/// Resolved visibility condition of one field.
#[derive(Debug, Clone, PartialEq)]
pub struct ConditionEdge {
    /// Field whose visibility is conditional.
    pub field_id: FieldId,
    /// Field whose value controls visibility.
    pub depends_on: FieldId,
    /// Submission key of the controlling field.
    pub depends_on_key: String,
    /// Comparison operator.
    pub operator: Operator,
    /// Operand compared against the controlling value.
    pub value: Value,
}

/// Directed graph of field visibility dependencies.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ConditionGraph {
    /// All field ids in definition order.
    field_ids: Vec<FieldId>,
    /// Conditions keyed by the conditional field.
    conditions: BTreeMap<FieldId, ConditionEdge>,
    /// Reverse edges: controlling field to the fields it controls.
    dependents: BTreeMap<FieldId, Vec<FieldId>>,
}

/// Traversal mark for cycle detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    /// Not yet reached.
    Unvisited,
    /// On the current walk.
    Visiting,
    /// Fully explored.
    Visited,
}

// ============================================================================
// SECTION: Construction
// ============================================================================

impl ConditionGraph {
    /// Builds and validates the condition graph for an ordered field list.
    ///
    /// # Errors
    ///
    /// Returns every [`CompileError::DuplicateFieldId`],
    /// [`CompileError::SelfReference`], [`CompileError::DanglingCondition`],
    /// and [`CompileError::CircularCondition`] found, in field order with
    /// cycles last.
    pub fn build(fields: &[FieldDefinition]) -> Result<Self, Vec<CompileError>> {
        let mut errors = Vec::new();
        let mut index: BTreeMap<&str, usize> = BTreeMap::new();
        let mut unique = Vec::with_capacity(fields.len());
        for field in fields {
            match index.entry(field.id.as_str()) {
                Entry::Vacant(slot) => {
                    slot.insert(unique.len());
                    unique.push(field);
                }
                Entry::Occupied(_) => errors.push(CompileError::DuplicateFieldId {
                    field: field.id.clone(),
                }),
            }
        }

        let mut next: Vec<Option<usize>> = vec![None; unique.len()];
        let mut conditions = BTreeMap::new();
        let mut dependents: BTreeMap<FieldId, Vec<FieldId>> = BTreeMap::new();
        for (position, field) in unique.iter().enumerate() {
            let Some(condition) = &field.condition else {
                continue;
            };
            if condition.depends_on == field.id {
                errors.push(CompileError::SelfReference {
                    field: field.id.clone(),
                });
                continue;
            }
            let Some(&target) = index.get(condition.depends_on.as_str()) else {
                errors.push(CompileError::DanglingCondition {
                    field: field.id.clone(),
                    target: condition.depends_on.clone(),
                });
                continue;
            };
            next[position] = Some(target);
            dependents.entry(condition.depends_on.clone()).or_default().push(field.id.clone());
            conditions.insert(field.id.clone(), ConditionEdge {
                field_id: field.id.clone(),
                depends_on: condition.depends_on.clone(),
                depends_on_key: unique[target].name.clone(),
                operator: condition.operator,
                value: condition.value.clone(),
            });
        }

        for cycle in find_cycles(&next) {
            errors.push(CompileError::CircularCondition {
                cycle: cycle.into_iter().map(|position| unique[position].id.clone()).collect(),
            });
        }

        if !errors.is_empty() {
            return Err(errors);
        }
        Ok(Self {
            field_ids: unique.iter().map(|field| field.id.clone()).collect(),
            conditions,
            dependents,
        })
    }
}

/// Finds every cycle in a graph where each node has at most one successor.
fn find_cycles(next: &[Option<usize>]) -> Vec<Vec<usize>> {
    let mut marks = vec![Mark::Unvisited; next.len()];
    let mut cycles = Vec::new();
    for start in 0 .. next.len() {
        if marks[start] != Mark::Unvisited {
            continue;
        }
        let mut path = Vec::new();
        let mut node = Some(start);
        while let Some(current) = node {
            match marks[current] {
                Mark::Unvisited => {
                    marks[current] = Mark::Visiting;
                    path.push(current);
                    node = next[current];
                }
                Mark::Visiting => {
                    if let Some(position) = path.iter().position(|&member| member == current) {
                        let mut cycle = path[position ..].to_vec();
                        if let Some(earliest) = (0 .. cycle.len()).min_by_key(|&slot| cycle[slot])
                        {
                            cycle.rotate_left(earliest);
                        }
                        cycles.push(cycle);
                    }
                    node = None;
                }
                Mark::Visited => node = None,
            }
        }
        for member in path {
            marks[member] = Mark::Visited;
        }
    }
    cycles
}

// ============================================================================
// SECTION: Queries
// ============================================================================

impl ConditionGraph {
    /// Returns every field id in definition order.
    #[must_use]
    pub fn field_ids(&self) -> &[FieldId] {
        &self.field_ids
    }

    /// Returns the condition governing a field, if any.
    #[must_use]
    pub fn condition(&self, field_id: &str) -> Option<&ConditionEdge> {
        self.conditions.get(field_id)
    }

    /// Returns the conditions in definition order.
    pub fn edges(&self) -> impl Iterator<Item = &ConditionEdge> {
        self.field_ids.iter().filter_map(|field_id| self.conditions.get(field_id))
    }

    /// Returns the fields whose visibility depends on `field_id`.
    #[must_use]
    pub fn dependents(&self, field_id: &str) -> &[FieldId] {
        self.dependents.get(field_id).map_or(&[], Vec::as_slice)
    }
}
