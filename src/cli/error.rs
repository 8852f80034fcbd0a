//! CLI-level errors (wraps tree errors)

use std::path::PathBuf;

use thiserror::Error;

use crate::errors::TreeError;

/// CLI errors are the top-level error type.
/// These are what get displayed to the user.
#[derive(Error, Debug)]
pub enum CliError {
    #[error("{0}")]
    Tree(#[from] TreeError),

    #[error("line {line}: {message}")]
    Script { line: usize, message: String },

    #[error("{}: {source}", .path.display())]
    Input {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

impl CliError {
    pub(crate) fn script(line: usize, message: impl Into<String>) -> Self {
        CliError::Script {
            line,
            message: message.into(),
        }
    }

    /// Get the appropriate exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Tree(TreeError::Config { .. }) => crate::exitcode::CONFIG,
            CliError::Tree(_) => crate::exitcode::SOFTWARE,
            CliError::Script { .. } => crate::exitcode::DATAERR,
            CliError::Input { .. } => crate::exitcode::NOINPUT,
            CliError::Io(_) => crate::exitcode::IOERR,
        }
    }
}
