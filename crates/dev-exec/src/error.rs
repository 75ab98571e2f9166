//! Error types for command execution.

use thiserror::Error;

use dev_pty::PtyError;

/// Errors that can occur while running a command.
#[derive(Error, Debug)]
pub enum ExecError {
    /// The command ran and exited with a code outside the allowed set.
    #[error("Command {command} returned with exit code {code}")]
    Subprocess { code: i32, command: String },

    /// The shell for a captured command could not be started.
    #[error("failed to start '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// The pseudo-terminal session for an interactive command failed.
    #[error(transparent)]
    Pty(#[from] PtyError),
}

impl ExecError {
    /// Exit code of a subprocess fault, if this is one.
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            ExecError::Subprocess { code, .. } => Some(*code),
            _ => None,
        }
    }
}

/// Result type alias for execution operations.
pub type Result<T> = std::result::Result<T, ExecError>;
