//! Error types for the annotation CLI
//!
//! User-facing errors with clear, actionable messages.

use thiserror::Error;

/// Result type alias for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

/// Error type for CLI operations
#[derive(Error, Debug)]
pub enum CliError {
    /// Required file is missing
    #[error("File not found: '{0}'. Verify the file path exists and you have read permissions.")]
    FileNotFound(String),

    /// Input file content could not be used
    #[error("Invalid input: {0}")]
    Input(String),

    /// A required column is absent from a tsv input file
    #[error("Required column '{0}' not found in input file")]
    MissingColumn(String),

    /// Invalid combination of command-line options
    #[error("Configuration error: {0}")]
    Config(String),

    /// Error from the annotation core
    #[error(transparent)]
    Core(#[from] cysanno_core::CoreError),

    /// Error from the common layer
    #[error(transparent)]
    Common(#[from] cysanno_common::CommonError),

    /// File system operation failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed delimited input
    #[error("Malformed tsv input: {0}")]
    Csv(#[from] csv::Error),
}

impl CliError {
    /// Create an input error
    pub fn input(msg: impl Into<String>) -> Self {
        Self::Input(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
