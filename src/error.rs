//! Error types for FlowTrack ingestion

use thiserror::Error;

/// Errors that can occur at the pipeline boundary (storage, caller input).
///
/// The parsing stages themselves never fail: unreadable rows and unresolved
/// columns degrade to missing values instead.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Date parse error: {0}")]
    DateParseError(String),

    #[error("Missing required field: {0}")]
    MissingField(String),
}
