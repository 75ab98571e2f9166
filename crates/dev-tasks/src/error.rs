//! Error types for tasks and the task runner.

use thiserror::Error;

use dev_exec::ExecError;

/// Errors a task handler can return.
#[derive(Error, Debug)]
pub enum TaskError {
    /// The task's own logic failed; reported with the task name.
    #[error("{0}")]
    Failed(String),

    /// A command the task ran failed. Not contained by the runner.
    #[error(transparent)]
    Exec(#[from] ExecError),
}

impl TaskError {
    /// Shorthand for [`TaskError::Failed`].
    pub fn failed(message: impl Into<String>) -> Self {
        TaskError::Failed(message.into())
    }
}

/// Outcome of a failed plan, one variant per way a run can stop.
#[derive(Error, Debug)]
pub enum RunError {
    /// Arguments did not match the task's declared shape.
    #[error("Failed to validate input to {task}: {message}")]
    Validation { task: String, message: String },

    /// A task reported a logic failure.
    #[error("Failed to run {task} task: {message}")]
    TaskFailed { task: String, message: String },

    /// The plan names a task that is not registered.
    #[error("Could not find task {0}")]
    TaskNotFound(String),

    /// A command failed or could not be started.
    #[error(transparent)]
    Exec(#[from] ExecError),
}

/// Result type alias for task handlers.
pub type Result<T> = std::result::Result<T, TaskError>;
