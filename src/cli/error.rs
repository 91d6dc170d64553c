//! CLI-level errors (wraps domain and settings errors)

use thiserror::Error;

use crate::config::SettingsError;
use crate::domain::TreeError;
use crate::exitcode;

/// CLI errors are the top-level error type.
/// These are what get displayed to the user.
#[derive(Error, Debug)]
pub enum CliError {
    #[error("{0}")]
    Tree(#[from] TreeError),

    #[error("{0}")]
    Settings(#[from] SettingsError),

    #[error("invalid arguments: {0}")]
    InvalidArgs(String),
}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

impl CliError {
    /// Get the appropriate exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::InvalidArgs(_) => exitcode::USAGE,
            CliError::Settings(SettingsError::NotFound(_)) => exitcode::NOINPUT,
            CliError::Settings(_) => exitcode::CONFIG,
            CliError::Tree(TreeError::Corrupted(_) | TreeError::Hook { .. }) => {
                exitcode::SOFTWARE
            }
            CliError::Tree(_) => exitcode::DATAERR,
        }
    }
}
