//! Error types for the feedload import pipeline.
//!
//! One enum per layer, outermost last:
//!
//! - [`RecordsError`] - reading CSV / JSON / NDJSON record sources
//! - [`ConfigError`] - provider config loading (aggregates every issue)
//! - [`TransformError`] - transform registry and transform functions
//! - [`AssignError`] - writing a value into a canonical record
//! - [`StoreError`] - catalog store operations
//! - [`PersistError`] - persistence adapter (wraps store errors)
//! - [`PipelineError`] - top-level orchestration errors
//!
//! Error conversion is automatic via `From` implementations,
//! allowing `?` to work across error boundaries.

use std::fmt;

use thiserror::Error;

use crate::persist::PersistSummary;
use crate::transform::engine::ParseError;

// =============================================================================
// Record source errors
// =============================================================================

/// Errors while reading raw records.
#[derive(Debug, Error)]
pub enum RecordsError {
    /// Failed to read file.
    #[error("Failed to read records: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed CSV.
    #[error("Invalid CSV at line {line}: {message}")]
    Csv { line: u64, message: String },

    /// Malformed JSON document or NDJSON line.
    #[error("Invalid JSON at line {line}: {source}")]
    Json {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    /// A JSON source that is neither an array nor newline-delimited objects.
    #[error("JSON array expected for records")]
    NotAnArray,

    /// A record that is not a JSON object.
    #[error("Record {0} is not a JSON object")]
    NotAnObject(usize),
}

// =============================================================================
// Provider config errors
// =============================================================================

/// One problem found while validating a provider config.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigIssue {
    /// Location inside the document, e.g. `mappings[2].source`.
    pub path: String,
    pub message: String,
}

impl ConfigIssue {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ConfigIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

/// Errors while loading a provider config.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read provider config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Provider config is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Every validation issue found in the document.
    #[error("Invalid provider config ({source_name}): {}", join_issues(.issues))]
    Invalid {
        source_name: String,
        issues: Vec<ConfigIssue>,
    },
}

fn join_issues(issues: &[ConfigIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

// =============================================================================
// Transform errors
// =============================================================================

/// Errors from the transform registry and the transforms themselves.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransformError {
    /// Registration with an empty or already registered name.
    #[error("Transform already registered or name empty: '{0}'")]
    DuplicateName(String),

    /// Lookup of a name nobody registered.
    #[error("Unknown transform: {0}")]
    UnknownTransform(String),

    /// Input of a type the transform does not handle.
    #[error("{name} expects {expected}, got {actual}")]
    UnsupportedInput {
        name: &'static str,
        expected: &'static str,
        actual: &'static str,
    },

    /// Input of the right type whose content cannot be converted.
    #[error("{name} could not parse '{input}'")]
    Unparseable { name: &'static str, input: String },

    /// Missing or malformed parameter.
    #[error("{name}: {message}")]
    InvalidParams { name: &'static str, message: String },
}

// =============================================================================
// Assignment errors
// =============================================================================

/// Errors while writing a value into a canonical record.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AssignError {
    /// Value type does not match the destination field.
    #[error("Expected {expected} for '{field}', got {actual}")]
    TypeMismatch {
        field: String,
        expected: &'static str,
        actual: &'static str,
    },
}

// =============================================================================
// Store / persistence errors
// =============================================================================

/// Errors raised by a catalog store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Catalog store IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Catalog store JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A referenced row does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// A created row reuses an existing id.
    #[error("{entity} already exists: {id}")]
    Duplicate { entity: &'static str, id: String },

    /// Begin/commit/rollback called out of order.
    #[error("Transaction error: {0}")]
    Transaction(String),
}

/// Errors from the persistence adapter.
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// The record carries no value for the configured unique identifier.
    #[error("Missing unique identifier '{0}' for product resolution")]
    MissingIdentifier(String),

    /// Unique identifier outside the supported set.
    #[error("Unsupported unique identifier: {0}")]
    UnsupportedIdentifier(String),
}

// =============================================================================
// Pipeline errors (top-level)
// =============================================================================

/// Top-level pipeline orchestration errors.
///
/// Returned by [`crate::transform::pipeline::run_pipeline`]. Variants raised
/// mid-run carry the partial summary so callers can report what was committed.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Records error: {0}")]
    Records(#[from] RecordsError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// A rule failed under `error_policy = "fail"`.
    #[error("Record {} aborted the run: {}", .error.record_index, .error.message)]
    Parse {
        error: ParseError,
        summary: PersistSummary,
    },

    /// A record failed to persist; its transaction was rolled back.
    #[error("Record {record_index} failed to persist: {source}")]
    Persist {
        record_index: usize,
        #[source]
        source: PersistError,
        summary: PersistSummary,
    },

    /// The deadline or cancel flag fired between records.
    #[error("Run cancelled after {processed} records")]
    Cancelled {
        processed: usize,
        summary: PersistSummary,
    },
}

impl PipelineError {
    /// Counts committed before the run stopped, if it got that far.
    pub fn partial_summary(&self) -> Option<&PersistSummary> {
        match self {
            Self::Parse { summary, .. }
            | Self::Persist { summary, .. }
            | Self::Cancelled { summary, .. } => Some(summary),
            Self::Records(_) | Self::Config(_) => None,
        }
    }
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for record loading.
pub type RecordsResult<T> = Result<T, RecordsError>;

/// Result type for config loading.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Result type for transforms.
pub type TransformResult<T> = Result<T, TransformError>;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Result type for persistence.
pub type PersistResult<T> = Result<T, PersistError>;

/// Result type for pipeline runs.
pub type PipelineResult<T> = Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_lists_every_issue() {
        let err = ConfigError::Invalid {
            source_name: "acme.json".into(),
            issues: vec![
                ConfigIssue::new("provider_id", "Required"),
                ConfigIssue::new("mappings[0].source", "Required"),
            ],
        };
        let msg = err.to_string();
        assert!(msg.contains("acme.json"));
        assert!(msg.contains("provider_id: Required"));
        assert!(msg.contains("mappings[0].source: Required"));
    }

    #[test]
    fn test_error_conversion_chain() {
        let store_err = StoreError::Transaction("no open transaction".into());
        let persist_err: PersistError = store_err.into();
        assert!(persist_err.to_string().contains("no open transaction"));

        let records_err = RecordsError::NotAnArray;
        let pipeline_err: PipelineError = records_err.into();
        assert!(pipeline_err.to_string().contains("array"));
        assert!(pipeline_err.partial_summary().is_none());
    }

    #[test]
    fn test_transform_error_format() {
        let err = TransformError::UnsupportedInput {
            name: "trim",
            expected: "a string",
            actual: "number",
        };
        assert_eq!(err.to_string(), "trim expects a string, got number");
    }
}
