//! Error types for the CLI

use thiserror::Error;

/// Result type for CLI operations
pub type CliResult<T> = Result<T, CliError>;

/// Errors that can occur in the CLI
#[derive(Debug, Error)]
pub enum CliError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Result serialization error
    #[error("Failed to serialize results: {0}")]
    Json(#[from] serde_json::Error),

    /// Harness error
    #[error("Pilotar error: {0}")]
    Pilotar(#[from] pilotar::PilotarError),
}
