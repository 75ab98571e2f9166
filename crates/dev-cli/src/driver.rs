//! Top-level driver: one CLI invocation from arguments to outcome.
//!
//! The driver loads the Devfile, resolves the command into a plan and runs
//! it, reporting every fault to the user. It never flushes the shell bridge
//! itself; the caller does that once the outcome is known.

use std::path::Path;

use tracing::debug;

use dev_config::{resolve_command, ConfigError, Devfile, ResolveError};
use dev_exec::{console, ExecutionContext, Shell};
use dev_tasks::{RunError, TaskContext, TaskRegistry, TaskRunner};

use crate::cli::Cli;
use crate::help;

/// Commands that run without the shell wrapper.
const WRAPPERLESS_COMMANDS: [&str; 1] = ["init"];

const INVOKED_VIA_SHELL_ENV: &str = "INVOKED_VIA_SHELL";
const SHELL_ENV: &str = "SHELL";
const DEFAULT_SHELL: &str = "bash";

/// How an invocation ended.
#[derive(Debug)]
pub enum Outcome {
    /// A listing was printed.
    Listed,
    /// Every step of the plan completed.
    Completed { command: String, steps: usize },
    /// The Devfile could not be loaded.
    ConfigFault(ConfigError),
    /// No command of that name exists.
    CommandNotFound(String),
    /// The plan stopped at a failing step.
    Failed { command: String, error: RunError },
}

impl Outcome {
    /// Process exit code for this outcome.
    pub fn exit_code(&self) -> i32 {
        match self {
            Outcome::Listed | Outcome::Completed { .. } => 0,
            Outcome::ConfigFault(_) | Outcome::CommandNotFound(_) | Outcome::Failed { .. } => 1,
        }
    }
}

/// Runs CLI invocations against a task registry and a shell.
pub struct Driver<'s> {
    registry: TaskRegistry,
    shell: &'s dyn Shell,
    binary: String,
}

impl<'s> Driver<'s> {
    /// Creates a driver with the built-in tasks.
    pub fn new(shell: &'s dyn Shell) -> Self {
        let binary = std::env::args_os()
            .next()
            .map(|arg| arg.to_string_lossy().into_owned())
            .unwrap_or_else(|| "dev-bare".to_string());

        Self {
            registry: TaskRegistry::new(),
            shell,
            binary,
        }
    }

    /// Uses `registry` instead of the built-in tasks.
    pub fn with_registry(mut self, registry: TaskRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Name of the binary suggested in the bare-invocation warning.
    pub fn with_binary(mut self, binary: impl Into<String>) -> Self {
        self.binary = binary.into();
        self
    }

    /// Run one invocation, printing listings and faults as they occur.
    pub fn run(&self, cli: &Cli, exec: &mut ExecutionContext) -> Outcome {
        if cli.tasks {
            help::print_tasks(&self.registry, cli.format, None);
            return Outcome::Listed;
        }

        let devfile = match load_devfile(&cli.file) {
            Ok(devfile) => devfile,
            Err(e) => {
                console::error(&e.to_string());
                return Outcome::ConfigFault(e);
            }
        };

        let command = match cli.command.as_deref() {
            Some(command) if !cli.commands => command,
            _ => {
                help::print_commands(&self.registry, &devfile, cli.format, None);
                return Outcome::Listed;
            }
        };

        if let Some(warning) = bare_warning(command, exec, &self.binary) {
            console::warn(&warning);
        }

        let plan = match resolve_command(&devfile, command, &cli.extra_args, |name| {
            self.registry.is_internal(name)
        }) {
            Ok(plan) => plan,
            Err(ResolveError::CommandNotFound(name)) => {
                help::print_commands(&self.registry, &devfile, cli.format, Some(&name));
                return Outcome::CommandNotFound(name);
            }
        };
        debug!(command, project = devfile.name(), steps = plan.len(), "running plan");

        let mut ctx = TaskContext::new(exec, self.shell, &devfile, &cli.extra_args);
        match TaskRunner::new(&self.registry).run_plan(&plan, &mut ctx) {
            Ok(steps) => Outcome::Completed {
                command: command.to_string(),
                steps,
            },
            Err(error) => {
                self.report(command, cli, &error);
                Outcome::Failed {
                    command: command.to_string(),
                    error,
                }
            }
        }
    }

    fn report(&self, command: &str, cli: &Cli, error: &RunError) {
        match error {
            RunError::TaskNotFound(name) => help::print_tasks(&self.registry, cli.format, Some(name)),
            RunError::Validation { .. } | RunError::TaskFailed { .. } => console::error(&error.to_string()),
            RunError::Exec(e) => console::error(&format!("Failed to run {}: {}", command, e)),
        }
    }
}

fn load_devfile(path: &Path) -> Result<Devfile, ConfigError> {
    let devfile = Devfile::load(path)?;
    debug!(path = %path.display(), project = devfile.name(), "loaded Devfile");
    Ok(devfile)
}

/// Warning shown when the binary runs outside the shell wrapper, which is
/// needed for directory changes to reach the user's shell.
pub fn bare_warning(command: &str, exec: &ExecutionContext, binary: &str) -> Option<String> {
    if WRAPPERLESS_COMMANDS.contains(&command) || exec.var(INVOKED_VIA_SHELL_ENV) == Some("1") {
        return None;
    }

    let shell = exec
        .var(SHELL_ENV)
        .and_then(|path| Path::new(path).file_name())
        .and_then(|name| name.to_str())
        .unwrap_or(DEFAULT_SHELL);

    Some(format!(
        "Warning: You are running dev-bare directly. For all features to work properly, you need to call dev.\n\
         If dev is not available in your shell, add the following to your shell config:\n\n    \
         eval \"$({} init {})\"\n",
        binary, shell
    ))
}
