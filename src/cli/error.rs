//! CLI-level errors (wraps library errors)

use thiserror::Error;

use crate::errors::TreePrintError;

/// CLI errors are the top-level error type.
/// These are what get displayed to the user.
#[derive(Error, Debug)]
pub enum CliError {
    #[error("{0}")]
    TreePrint(#[from] TreePrintError),

    #[error("cannot write output: {0}")]
    Output(#[from] std::io::Error),

    #[error("invalid arguments: {0}")]
    InvalidArgs(String),
}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

impl CliError {
    /// Get the appropriate exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::InvalidArgs(_) => crate::exitcode::USAGE,
            CliError::Output(_) => crate::exitcode::IOERR,
            CliError::TreePrint(e) => match e {
                TreePrintError::NotFound(_) => crate::exitcode::NOINPUT,
                TreePrintError::NotADirectory(_) => crate::exitcode::USAGE,
                TreePrintError::Walk { .. } => crate::exitcode::IOERR,
                TreePrintError::Config { .. } => crate::exitcode::CONFIG,
            },
        }
    }
}
