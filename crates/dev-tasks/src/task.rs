//! The task interface.
//!
//! A task declares the shape of its arguments as a `serde` type and
//! implements an up handler and, optionally, a down handler. Arguments are
//! converted from the Devfile's YAML before the handler runs, so a task
//! never sees arguments it did not declare.
//!
//! # Example
//!
//! ```
//! use serde::Deserialize;
//! use dev_tasks::{Task, TaskContext, TaskResult};
//!
//! #[derive(Deserialize)]
//! struct GreetArgs {
//!     who: String,
//! }
//!
//! struct Greet;
//!
//! impl Task for Greet {
//!     type Args = GreetArgs;
//!     const NAME: &'static str = "greet";
//!     const DESCRIPTION: &'static str = "Say hello";
//!
//!     fn up(&self, args: GreetArgs, _ctx: &mut TaskContext<'_>) -> TaskResult<()> {
//!         println!("hello {}", args.who);
//!         Ok(())
//!     }
//! }
//! ```

use serde::de::DeserializeOwned;
use serde_yaml::Value;

use dev_config::{Devfile, Direction};
use dev_exec::{CommandResult, ExecutionContext, RunOptions, Shell};

use crate::error::Result;

/// Everything a task handler may touch.
pub struct TaskContext<'a> {
    /// Environment overlay and shell bridge of this invocation.
    pub exec: &'a mut ExecutionContext,
    /// Runs external commands.
    pub shell: &'a dyn Shell,
    /// The loaded Devfile.
    pub devfile: &'a Devfile,
    /// Pass-through arguments from the command line.
    pub extra_args: &'a [String],
}

impl<'a> TaskContext<'a> {
    /// Creates a context.
    pub fn new(
        exec: &'a mut ExecutionContext,
        shell: &'a dyn Shell,
        devfile: &'a Devfile,
        extra_args: &'a [String],
    ) -> Self {
        Self {
            exec,
            shell,
            devfile,
            extra_args,
        }
    }

    /// Run a command through the shell with this invocation's context.
    pub fn run(&mut self, command: &str, options: RunOptions) -> dev_exec::Result<CommandResult> {
        self.shell.run(self.exec, command, options)
    }
}

/// A named unit of Devfile-driven behaviour.
pub trait Task {
    /// Declared argument shape. Absent arguments deserialize from `null`.
    type Args: DeserializeOwned + 'static;

    /// Registry name, as written in the Devfile.
    const NAME: &'static str;

    /// One-line description for listings.
    const DESCRIPTION: &'static str;

    /// Setup handler.
    fn up(&self, args: Self::Args, ctx: &mut TaskContext<'_>) -> Result<()>;

    /// Teardown handler. No-op unless overridden.
    fn down(&self, _args: Self::Args, _ctx: &mut TaskContext<'_>) -> Result<()> {
        Ok(())
    }
}

/// Object-safe view of a [`Task`], used by the registry.
pub trait DynTask {
    fn name(&self) -> &'static str;

    fn description(&self) -> &'static str;

    /// Convert `args` to the task's declared shape.
    ///
    /// On mismatch returns the reason as text.
    fn bind(&self, args: Value) -> std::result::Result<Box<dyn BoundTask + '_>, String>;
}

/// A task with validated arguments, ready to run once.
pub trait BoundTask {
    fn execute(self: Box<Self>, direction: Direction, ctx: &mut TaskContext<'_>) -> Result<()>;
}

struct Bound<'t, T: Task> {
    task: &'t T,
    args: T::Args,
}

impl<T: Task> BoundTask for Bound<'_, T> {
    fn execute(self: Box<Self>, direction: Direction, ctx: &mut TaskContext<'_>) -> Result<()> {
        let Bound { task, args } = *self;
        match direction {
            Direction::Up => task.up(args, ctx),
            Direction::Down => task.down(args, ctx),
        }
    }
}

impl<T: Task> DynTask for T {
    fn name(&self) -> &'static str {
        T::NAME
    }

    fn description(&self) -> &'static str {
        T::DESCRIPTION
    }

    fn bind(&self, args: Value) -> std::result::Result<Box<dyn BoundTask + '_>, String> {
        let args = serde_yaml::from_value::<T::Args>(args).map_err(|e| e.to_string())?;
        Ok(Box::new(Bound { task: self, args }))
    }
}
