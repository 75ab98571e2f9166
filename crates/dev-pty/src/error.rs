//! Error types for pseudo-terminal operations.

use thiserror::Error;

/// Errors that can occur while running a child on a pseudo-terminal.
#[derive(Error, Debug)]
pub enum PtyError {
    /// The program could not be found on the search path.
    #[error("program '{0}' not found in PATH")]
    ProgramNotFound(String),

    /// An argument or environment entry cannot be passed to exec.
    #[error("invalid command: {0}")]
    InvalidCommand(String),

    /// Allocating the master/slave pair failed.
    #[error("failed to allocate pty: {0}")]
    Allocate(#[source] nix::Error),

    /// fork(2) failed.
    #[error("failed to fork: {0}")]
    Fork(#[source] nix::Error),

    /// Waiting for the child failed.
    #[error("failed to wait for child {pid}: {source}")]
    Wait {
        pid: i32,
        #[source]
        source: nix::Error,
    },

    /// Readiness wait on the copied descriptors failed.
    #[error("poll failed: {0}")]
    Poll(#[source] nix::Error),

    /// Copying between the terminal and the child failed. The child was
    /// still reaped and exited with `code`.
    #[error("terminal copy failed, child exited with {code}: {source}")]
    Copy {
        code: i32,
        #[source]
        source: Box<PtyError>,
    },

    /// I/O error while copying between the terminal and the child.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for pty operations.
pub type Result<T> = std::result::Result<T, PtyError>;
