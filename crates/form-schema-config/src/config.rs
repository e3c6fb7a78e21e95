// crates/form-schema-config/src/config.rs
// ============================================================================
// Module: Form Schema Configuration
// Description: Configuration loading and validation for the form compiler.
// Purpose: Provide strict, fail-closed config parsing with hard limits.
// Dependencies: form-schema-core, serde, toml
// ============================================================================

//! ## Overview
//! Configuration is loaded from a TOML file with strict size and path limits.
//! Every section is optional and falls back to the compiler defaults; any
//! value outside its documented bounds fails the load.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::env;
use std::fs;
use std::ops::RangeInclusive;
use std::path::Path;
use std::path::PathBuf;

use form_schema_core::CompilerConfig;
use form_schema_core::runtime::DEFAULT_CACHE_CAPACITY;
use form_schema_core::runtime::DEFAULT_MAX_FIELDS;
use form_schema_core::runtime::DEFAULT_MAX_PATTERN_LENGTH;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
pub const DEFAULT_CONFIG_NAME: &str = "form-schema.toml";
/// Environment variable used to override the config path.
pub const CONFIG_ENV_VAR: &str = "FORM_SCHEMA_CONFIG";
/// Maximum configuration file size in bytes.
pub(crate) const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum length of a single path component.
pub(crate) const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
pub(crate) const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Allowed cache capacities.
pub(crate) const CACHE_CAPACITY_RANGE: RangeInclusive<usize> = 1 ..= 65_536;
/// Allowed per-definition field limits.
pub(crate) const MAX_FIELDS_RANGE: RangeInclusive<usize> = 1 ..= 10_000;
/// Allowed pattern length limits.
pub(crate) const MAX_PATTERN_LENGTH_RANGE: RangeInclusive<usize> = 1 ..= 65_536;
/// Default maximum definition input size in bytes.
pub const DEFAULT_MAX_DEFINITION_BYTES: usize = 1024 * 1024;
/// Allowed definition input size limits.
pub(crate) const MAX_DEFINITION_BYTES_RANGE: RangeInclusive<usize> = 1024 ..= 16 * 1024 * 1024;

// ============================================================================
// SECTION: Configuration Model
// ============================================================================

/// Top-level form schema configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FormSchemaConfig {
    /// Compilation cache configuration.
    #[serde(default)]
    pub cache: CacheConfig,
    /// Input limit configuration.
    #[serde(default)]
    pub limits: LimitsConfig,
    /// Compile audit configuration.
    #[serde(default)]
    pub audit: AuditConfig,
}

impl FormSchemaConfig {
    /// Loads configuration from disk using the default resolution rules.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let resolved = resolve_path(path)?;
        validate_path(&resolved)?;
        let bytes = fs::read(&resolved).map_err(|err| ConfigError::Io(err.to_string()))?;
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        Self::from_toml_str(content)
    }

    /// Parses and validates configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed TOML or unknown keys and
    /// [`ConfigError::Invalid`] for out-of-range values.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.cache.validate()?;
        self.limits.validate()?;
        self.audit.validate()
    }

    /// Returns the compiler configuration described by this file.
    #[must_use]
    pub const fn compiler_config(&self) -> CompilerConfig {
        CompilerConfig {
            cache_capacity: self.cache.capacity,
            max_fields: self.limits.max_fields,
            max_pattern_length: self.limits.max_pattern_length,
        }
    }
}

/// Compilation cache configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CacheConfig {
    /// Maximum number of compiled forms retained.
    #[serde(default = "default_cache_capacity")]
    pub capacity: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: default_cache_capacity(),
        }
    }
}

impl CacheConfig {
    /// Validates cache configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        check_range("cache.capacity", self.capacity, &CACHE_CAPACITY_RANGE)
    }
}

/// Input limit configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LimitsConfig {
    /// Maximum number of fields per definition.
    #[serde(default = "default_max_fields")]
    pub max_fields: usize,
    /// Maximum pattern source length in bytes.
    #[serde(default = "default_max_pattern_length")]
    pub max_pattern_length: usize,
    /// Maximum definition or data input size in bytes.
    #[serde(default = "default_max_definition_bytes")]
    pub max_definition_bytes: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_fields: default_max_fields(),
            max_pattern_length: default_max_pattern_length(),
            max_definition_bytes: default_max_definition_bytes(),
        }
    }
}

impl LimitsConfig {
    /// Validates limit configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        check_range("limits.max_fields", self.max_fields, &MAX_FIELDS_RANGE)?;
        check_range(
            "limits.max_pattern_length",
            self.max_pattern_length,
            &MAX_PATTERN_LENGTH_RANGE,
        )?;
        check_range(
            "limits.max_definition_bytes",
            self.max_definition_bytes,
            &MAX_DEFINITION_BYTES_RANGE,
        )
    }
}

/// Where compile audit events are written.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditSinkKind {
    /// Audit events are discarded.
    #[default]
    None,
    /// Audit events are written to stderr as JSON lines.
    Stderr,
    /// Audit events are appended to `audit.path` as JSON lines.
    File,
}

/// Compile audit configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuditConfig {
    /// Audit sink selection.
    #[serde(default)]
    pub sink: AuditSinkKind,
    /// Audit log path (required for the file sink).
    #[serde(default)]
    pub path: Option<String>,
}

impl AuditConfig {
    /// Validates audit configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        match (self.sink, self.path.as_deref()) {
            (AuditSinkKind::File, None) => Err(ConfigError::Invalid(
                "audit.path is required when audit.sink = \"file\"".to_string(),
            )),
            (AuditSinkKind::File, Some(path)) => validate_path_string("audit.path", path),
            (_, Some(_)) => Err(ConfigError::Invalid(
                "audit.path is only valid with audit.sink = \"file\"".to_string(),
            )),
            (_, None) => Ok(()),
        }
    }
}

// ============================================================================
// SECTION: Defaults
// ============================================================================

/// Default cache capacity.
const fn default_cache_capacity() -> usize {
    DEFAULT_CACHE_CAPACITY
}

/// Default maximum field count.
const fn default_max_fields() -> usize {
    DEFAULT_MAX_FIELDS
}

/// Default maximum pattern length.
const fn default_max_pattern_length() -> usize {
    DEFAULT_MAX_PATTERN_LENGTH
}

/// Default maximum definition size.
const fn default_max_definition_bytes() -> usize {
    DEFAULT_MAX_DEFINITION_BYTES
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration loading or validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O failure while reading configuration.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Resolves the config path from CLI or environment defaults.
fn resolve_path(path: Option<&Path>) -> Result<PathBuf, ConfigError> {
    if let Some(path) = path {
        return Ok(path.to_path_buf());
    }
    if let Ok(env_path) = env::var(CONFIG_ENV_VAR) {
        if env_path.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
        }
        return Ok(PathBuf::from(env_path));
    }
    Ok(PathBuf::from(DEFAULT_CONFIG_NAME))
}

/// Validates the resolved path against length limits.
fn validate_path(path: &Path) -> Result<(), ConfigError> {
    let text = path.to_string_lossy();
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
    }
    for component in path.components() {
        let value = component.as_os_str().to_string_lossy();
        if value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid("config path component too long".to_string()));
        }
    }
    Ok(())
}

/// Validates a path string against length constraints.
fn validate_path_string(field: &str, value: &str) -> Result<(), ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::Invalid(format!("{field} must be non-empty")));
    }
    if trimmed.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid(format!("{field} exceeds max length")));
    }
    for component in Path::new(trimmed).components() {
        let component_value = component.as_os_str().to_string_lossy();
        if component_value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid(format!("{field} path component too long")));
        }
    }
    Ok(())
}

/// Checks that `value` lies within `range`.
fn check_range(
    field: &str,
    value: usize,
    range: &RangeInclusive<usize>,
) -> Result<(), ConfigError> {
    if range.contains(&value) {
        return Ok(());
    }
    Err(ConfigError::Invalid(format!(
        "{field} must be between {} and {}",
        range.start(),
        range.end()
    )))
}
