//! Error types for `secgroups`
//!
//! Configuration contract violations are [`ConfigError`]; failures while
//! loading the JSON-backed lookup tables are [`TableError`]. Both roll up
//! into the top-level [`Error`].

use std::path::PathBuf;
use thiserror::Error;

// ============================================================================
// Top-Level Error
// ============================================================================

/// Top-level error type for `secgroups` operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration contract violation
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Lookup table loading or access error
    #[error(transparent)]
    Table(#[from] TableError),
}

// ============================================================================
// Configuration Errors
// ============================================================================

/// Violations of a type's declared configuration contract.
///
/// All variants are raised synchronously during construction (or, for
/// [`ConfigError::NoSuchField`], during attribute-style access) and none is
/// recoverable inside the resolver: an entity either fully satisfies its
/// schema or does not exist.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A required key resolved to null after all default phases
    #[error("`{key}` config key cannot be nil")]
    Missing {
        /// The required key that stayed unresolved
        key: String,
    },

    /// A key in the working configuration that the schema does not recognize
    #[error("`{key}` is not a valid config key")]
    InvalidKey {
        /// The unrecognized key
        key: String,
    },

    /// Two mutually exclusive keys both supplied explicitly by the caller
    #[error("the `{first}` and `{second}` config keys are mutually exclusive")]
    InvalidCombination {
        /// First member of the violated group
        first: String,
        /// Second member of the violated group
        second: String,
    },

    /// Attribute-style access to a key absent from the resolved configuration
    #[error("no such config field `{key}`")]
    NoSuchField {
        /// The key that was asked for
        key: String,
    },

    /// The override map was neither a JSON object nor null
    #[error("config overrides must be a map, got {found}")]
    InvalidOverrides {
        /// Human-readable name of the JSON type that was supplied
        found: String,
    },
}

// ============================================================================
// Lookup Table Errors
// ============================================================================

/// Failures while configuring or reading a JSON-backed lookup table.
#[derive(Debug, Error)]
pub enum TableError {
    /// The configured backing file does not exist
    #[error("table file not found: {path}")]
    MissingFile {
        /// Path that was configured for the table
        path: PathBuf,
    },

    /// The backing file is not valid JSON of the expected shape
    #[error("parse error in {path}: {message}")]
    Parse {
        /// Path to the backing file
        path: PathBuf,
        /// Error message from the parser
        message: String,
    },

    /// The configured `path` value is not a string
    #[error("table `path` must be a string, got {value}")]
    InvalidPath {
        /// The value that was supplied for `path`
        value: String,
    },

    /// A lookup was attempted before the table was configured
    #[error("table has not been configured")]
    NotConfigured,

    /// The table's own configuration contract was violated
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// I/O error reading the backing file
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

// ============================================================================
// Result Type Alias
// ============================================================================

/// Result type alias for `secgroups` operations.
pub type Result<T> = std::result::Result<T, Error>;

// ============================================================================
// Tests
// ============================================================================
