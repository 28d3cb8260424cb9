//! Error types
//!
//! The engine itself never fails; these cover CSV ingestion and snapshot
//! persistence.

use thiserror::Error;

/// Location-count CSV ingestion failure
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("CSV file must have at least a header row and one data row")]
    TooShort,
}

/// Saved-version persistence failure
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("version store I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("version store contains malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("no saved version with id '{0}'")]
    UnknownVersion(String),
}
