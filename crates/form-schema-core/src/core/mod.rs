// crates/form-schema-core/src/core/mod.rs
// ============================================================================
// Module: Form Schema Core Types
// Description: Form definitions, fingerprints, and result types.
// Purpose: Provide stable, serializable types shared by the compiler and callers.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! Core types are the canonical source of truth for every surface built on
//! the compiler: definitions coming in, fingerprints identifying them, and
//! the compile/validation outcomes going out.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod definition;
pub mod errors;
pub mod fingerprint;
pub mod hashing;
pub mod identifiers;
pub mod validation;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use definition::Condition;
pub use definition::Constraints;
pub use definition::FieldDefinition;
pub use definition::FieldType;
pub use definition::FormDefinition;
pub use definition::Operator;
pub use definition::SelectOption;
pub use errors::CompileError;
pub use errors::CompileErrors;
pub use fingerprint::Fingerprint;
pub use hashing::DEFAULT_HASH_ALGORITHM;
pub use hashing::HashAlgorithm;
pub use hashing::HashDigest;
pub use hashing::HashError;
pub use identifiers::FieldId;
pub use identifiers::FormVersion;
pub use validation::FormValues;
pub use validation::ValidationError;
pub use validation::ValidationErrorKind;
pub use validation::ValidationResult;
pub use validation::VisibilityMap;
