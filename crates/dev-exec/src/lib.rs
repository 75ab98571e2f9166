//! Command execution for dev.
//!
//! Every external command a task needs goes through a [`Shell`]. The
//! process-spawning implementation, [`CommandExecutor`], picks between a
//! captured `sh -c` run and an interactive run on a pseudo-terminal, applies
//! the invocation's environment overlay, and turns disallowed exit codes
//! into [`ExecError::Subprocess`].
//!
//! [`ExecutionContext`] carries the per-invocation state: the environment
//! overlay and the [`ShellBridge`] queue that is flushed to the parent shell
//! when the CLI exits. [`FlushGuard`] ties that flush to scope exit.
//!
//! # Example
//!
//! ```no_run
//! use dev_exec::{CommandExecutor, ExecutionContext, RunOptions, Shell};
//!
//! let mut ctx = ExecutionContext::new();
//! let shell = CommandExecutor::new();
//!
//! let branch = shell.run(&mut ctx, "git branch --show-current", RunOptions::probe())?;
//! println!("on {}", branch.output.unwrap_or_default());
//!
//! ctx.bridge_mut().enqueue("cd /tmp");
//! ctx.into_bridge().flush();
//! # Ok::<(), dev_exec::ExecError>(())
//! ```

pub mod bridge;
pub mod console;
pub mod context;
pub mod error;
pub mod executor;

pub use bridge::{ShellBridge, DEFAULT_SHELL_FD, SHELL_FD_ENV};
pub use context::{ExecutionContext, FlushGuard};
pub use error::{ExecError, Result};
pub use executor::{
    elevate_command, CommandExecutor, CommandResult, ExecutionPath, RunOptions, Shell, ANNOUNCE_PREFIX,
};
