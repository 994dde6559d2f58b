//! # CLI Errors

use thiserror::Error;

/// Result type for CLI operations
pub type CliResult<T> = Result<T, CliError>;

/// CLI failures
#[derive(Debug, Error)]
pub enum CliError {
    /// Boot could not complete
    #[error("boot failed: {0}")]
    BootFailed(String),

    /// The serving loop terminated with an error
    #[error("server failed: {0}")]
    ServerFailed(#[from] std::io::Error),
}
