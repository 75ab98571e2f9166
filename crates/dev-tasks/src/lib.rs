//! Tasks for dev.
//!
//! A task is a named, reusable unit of setup and teardown behaviour with an
//! up handler and an optional down handler. The Devfile lists tasks with
//! their arguments; [`TaskRunner`] looks each one up in the
//! [`TaskRegistry`], checks its arguments against the task's declared shape
//! and runs the handler for the plan's direction.
//!
//! # Example
//!
//! ```no_run
//! use dev_config::{resolve_command, Devfile};
//! use dev_exec::{CommandExecutor, ExecutionContext};
//! use dev_tasks::{TaskContext, TaskRegistry, TaskRunner};
//!
//! let devfile = Devfile::from_yaml("name: shop\nup:\n  - run: make", "Devfile".as_ref())?;
//! let registry = TaskRegistry::new();
//! let plan = resolve_command(&devfile, "up", &[], |name| registry.is_internal(name))?;
//!
//! let shell = CommandExecutor::new();
//! let mut exec = ExecutionContext::new();
//! let mut ctx = TaskContext::new(&mut exec, &shell, &devfile, &[]);
//! TaskRunner::new(&registry).run_plan(&plan, &mut ctx)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod error;
pub mod git;
pub mod registry;
pub mod runner;
pub mod task;
pub mod tasks;

#[cfg(test)]
mod testing;

pub use error::{Result, RunError, TaskError};
pub use git::{parse_url, RemoteUrl};
pub use registry::{TaskKind, TaskRegistry};
pub use runner::{TaskInstance, TaskRunner, ValidatedTask};
pub use task::{BoundTask, DynTask, Task, TaskContext};
pub use tasks::{Cd, CloneRepo, Env, Init, Open, Pip, Run, Update};

/// Result type for task handlers; alias of [`Result`].
pub type TaskResult<T> = Result<T>;
