//! Error types for the guardrail crate.
//!
//! Validation never fails with an error; rejected SQL is reported through
//! [`crate::ValidationResult`]. These errors only cover loading schema snapshots.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading schema metadata.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// Snapshot file could not be read.
    #[error("failed to read schema snapshot {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Snapshot content is not a valid schema document.
    #[error("invalid schema snapshot: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// Snapshot could not be serialized.
    #[error("failed to serialize schema snapshot: {0}")]
    Serialize(String),
}
