//! Error types for the annotation core
//!
//! Per-row and per-task failures are absorbed into sentinel values by the
//! callers so a batch always completes; only configuration and internal
//! consistency errors are meant to halt a run.

use thiserror::Error;

/// Result type alias for core operations
pub type Result<T> = std::result::Result<T, CoreError>;

/// Error type for the annotation core
#[derive(Error, Debug)]
pub enum CoreError {
    /// File system operation failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP request failed
    #[error("Network request failed: {0}. Check your internet connection.")]
    Http(#[from] reqwest::Error),

    /// Error from the common layer
    #[error(transparent)]
    Common(#[from] cysanno_common::CommonError),

    /// Remote record text did not parse as a UniProtKB flat record
    #[error("Malformed record: {0}")]
    RecordParse(String),

    /// Alignment engine produced output that could not be parsed
    #[error("Failed to parse alignment output for '{id}' vs {organism}: {reason}")]
    AlignmentParse {
        id: String,
        organism: String,
        reason: String,
    },

    /// Alignment engine could not be invoked
    #[error("Failed to run alignment engine '{exe}': {reason}")]
    Engine { exe: String, reason: String },

    /// Missing or invalid configuration, reported before any work starts
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal invariant violation; the run must stop rather than
    /// silently under-report
    #[error("Consistency check failed: expected {expected} results, got {actual}")]
    Consistency { expected: usize, actual: usize },
}

impl CoreError {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an alignment parse error
    pub fn alignment_parse(
        id: impl Into<String>,
        organism: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::AlignmentParse {
            id: id.into(),
            organism: organism.into(),
            reason: reason.into(),
        }
    }
}
