//! Command execution.
//!
//! Commands run on one of two paths:
//!
//! - **captured**: `sh -c <cmd>` with stdout collected and no terminal
//!   passthrough; used for silent probes and anything run under `sudo`
//! - **interactive**: `bash -c <cmd>` on a pseudo-terminal so the command
//!   behaves as if typed by the user; output can still be captured
//!
//! Both paths run with the execution context's environment and report
//! their exit code the same way.

use std::collections::{BTreeMap, BTreeSet};
use std::process::{Command, Stdio};

use dev_pty::exitstatus_to_exitcode;
use tracing::debug;

use crate::console;
use crate::context::ExecutionContext;
use crate::error::{ExecError, Result};

/// Prefix of the line announcing a non-silent command.
pub const ANNOUNCE_PREFIX: &str = "=> Running command: ";

/// Options for a single command run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOptions {
    /// Return the command's output in [`CommandResult::output`].
    pub capture: bool,
    /// Skip the announcement and use the captured path.
    pub silent: bool,
    /// Run under `sudo`, on the captured path.
    pub elevate: bool,
    /// Wrap elevated commands as `sudo bash -c "<cmd>"` instead of `sudo <cmd>`.
    pub wrap_elevate_in_shell: bool,
    /// Exit codes that count as success.
    pub allowed_exit_codes: BTreeSet<i32>,
    /// Variables merged into the execution context before running.
    pub env: BTreeMap<String, String>,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            capture: false,
            silent: false,
            elevate: false,
            wrap_elevate_in_shell: true,
            allowed_exit_codes: BTreeSet::from([0]),
            env: BTreeMap::new(),
        }
    }
}

impl RunOptions {
    /// Creates default options: interactive, announced, only 0 allowed.
    pub fn new() -> Self {
        Self::default()
    }

    /// Options for a silent probe whose output is needed.
    pub fn probe() -> Self {
        Self::default().with_silent(true).with_capture(true)
    }

    /// Sets whether output is captured.
    pub fn with_capture(mut self, capture: bool) -> Self {
        self.capture = capture;
        self
    }

    /// Sets whether the command is silent.
    pub fn with_silent(mut self, silent: bool) -> Self {
        self.silent = silent;
        self
    }

    /// Sets whether the command runs under sudo.
    pub fn with_elevate(mut self, elevate: bool) -> Self {
        self.elevate = elevate;
        self
    }

    /// Sets how elevated commands are wrapped.
    pub fn with_wrap_elevate_in_shell(mut self, wrap: bool) -> Self {
        self.wrap_elevate_in_shell = wrap;
        self
    }

    /// Replaces the allowed exit codes.
    pub fn with_allowed_exit_codes(mut self, codes: impl IntoIterator<Item = i32>) -> Self {
        self.allowed_exit_codes = codes.into_iter().collect();
        self
    }

    /// Replaces the environment overrides.
    pub fn with_env(mut self, env: BTreeMap<String, String>) -> Self {
        self.env = env;
        self
    }

    /// Adds one environment override.
    pub fn with_env_var(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }
}

/// Outcome of a command whose exit code was allowed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandResult {
    /// Decoded exit code; negative for signal termination.
    pub exit_code: i32,
    /// Output trimmed of surrounding whitespace, when capture was requested.
    pub output: Option<String>,
}

/// Which way a command is run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionPath {
    Captured,
    Interactive,
}

impl ExecutionPath {
    /// Elevated and silent commands are captured; everything else is
    /// interactive.
    pub fn select(options: &RunOptions) -> Self {
        if options.elevate || options.silent {
            ExecutionPath::Captured
        } else {
            ExecutionPath::Interactive
        }
    }
}

/// Something that runs shell command text.
///
/// Tasks depend on this trait rather than on [`CommandExecutor`] so they can
/// be exercised without spawning processes.
pub trait Shell {
    /// Run `command` with `options`, merging `options.env` into `ctx` first.
    ///
    /// Fails with [`ExecError::Subprocess`] when the exit code is not in
    /// `options.allowed_exit_codes`.
    fn run(&self, ctx: &mut ExecutionContext, command: &str, options: RunOptions) -> Result<CommandResult>;
}

/// The process-spawning [`Shell`].
#[derive(Debug, Default, Clone, Copy)]
pub struct CommandExecutor;

impl CommandExecutor {
    /// Creates a new executor.
    pub fn new() -> Self {
        Self
    }
}

impl Shell for CommandExecutor {
    fn run(&self, ctx: &mut ExecutionContext, command: &str, mut options: RunOptions) -> Result<CommandResult> {
        ctx.merge_env(std::mem::take(&mut options.env));

        if !options.silent {
            console::announce(&format!("{}{}", ANNOUNCE_PREFIX, command));
        }

        let path = ExecutionPath::select(&options);
        debug!(command, ?path, capture = options.capture, "running command");

        let (exit_code, output) = match path {
            ExecutionPath::Captured => run_captured(ctx.env(), command, &options)?,
            ExecutionPath::Interactive => run_interactive(ctx.env(), command, options.capture)?,
        };

        debug!(command, exit_code, "command finished");

        if !options.allowed_exit_codes.contains(&exit_code) {
            return Err(ExecError::Subprocess {
                code: exit_code,
                command: command.to_string(),
            });
        }

        Ok(CommandResult {
            exit_code,
            output: output.map(|text| text.trim().to_string()),
        })
    }
}

/// Wrap `command` for `sudo`, escaping embedded double quotes.
pub fn elevate_command(command: &str, wrap_in_shell: bool) -> String {
    let escaped = command.replace('"', "\\\"");
    if wrap_in_shell {
        format!("sudo bash -c \"{}\"", escaped)
    } else {
        format!("sudo {}", escaped)
    }
}

fn run_captured(
    env: &BTreeMap<String, String>,
    command: &str,
    options: &RunOptions,
) -> Result<(i32, Option<String>)> {
    let shell_command = if options.elevate {
        elevate_command(command, options.wrap_elevate_in_shell)
    } else {
        command.to_string()
    };

    let output = Command::new("sh")
        .arg("-c")
        .arg(&shell_command)
        .env_clear()
        .envs(env)
        .stdin(Stdio::inherit())
        .output()
        .map_err(|source| ExecError::Spawn {
            command: shell_command.clone(),
            source,
        })?;

    let captured = options
        .capture
        .then(|| String::from_utf8_lossy(&output.stdout).into_owned());

    Ok((exitstatus_to_exitcode(output.status), captured))
}

fn run_interactive(
    env: &BTreeMap<String, String>,
    command: &str,
    capture: bool,
) -> Result<(i32, Option<String>)> {
    let argv = ["bash".to_string(), "-c".to_string(), command.to_string()];
    let mut captured = Vec::new();

    let code = dev_pty::spawn(&argv, env, |chunk| {
        if capture {
            captured.extend_from_slice(chunk);
        }
        Ok(())
    })?;

    let output = capture.then(|| String::from_utf8_lossy(&captured).into_owned());
    Ok((code, output))
}


#[cfg(test)]
mod tests {
    use super::*;

    fn test_context() -> ExecutionContext {
        let mut env = BTreeMap::new();
        env.insert(
            "PATH".to_string(),
            std::env::var("PATH").unwrap_or_else(|_| "/usr/bin:/bin".to_string()),
        );
        ExecutionContext::from_env(env)
    }

    #[test]
    fn test_default_options() {
        let options = RunOptions::default();
        assert!(!options.capture);
        assert!(!options.silent);
        assert!(!options.elevate);
        assert!(options.wrap_elevate_in_shell);
        assert_eq!(options.allowed_exit_codes, BTreeSet::from([0]));
        assert!(options.env.is_empty());
    }

    #[test]
    fn test_select_path() {
        assert_eq!(ExecutionPath::select(&RunOptions::new()), ExecutionPath::Interactive);
        assert_eq!(
            ExecutionPath::select(&RunOptions::new().with_capture(true)),
            ExecutionPath::Interactive
        );
        assert_eq!(
            ExecutionPath::select(&RunOptions::new().with_silent(true)),
            ExecutionPath::Captured
        );
        assert_eq!(
            ExecutionPath::select(&RunOptions::new().with_elevate(true)),
            ExecutionPath::Captured
        );
    }

    #[test]
    fn test_elevate_command_wrapped() {
        assert_eq!(
            elevate_command(r#"echo "hi" > /etc/motd"#, true),
            r#"sudo bash -c "echo \"hi\" > /etc/motd""#
        );
    }

    #[test]
    fn test_elevate_command_prefixed() {
        assert_eq!(elevate_command("mkdir /opt/x", false), "sudo mkdir /opt/x");
    }

    #[test]
    fn test_captured_output_is_trimmed() {
        let mut ctx = test_context();
        let result = CommandExecutor::new()
            .run(&mut ctx, "echo '  hello  '", RunOptions::probe())
            .unwrap();

        assert_eq!(result.exit_code, 0);
        assert_eq!(result.output.as_deref(), Some("hello"));
    }

    #[test]
    fn test_captured_without_capture_has_no_output() {
        let mut ctx = test_context();
        let result = CommandExecutor::new()
            .run(&mut ctx, "echo hello", RunOptions::new().with_silent(true))
            .unwrap();

        assert_eq!(result.output, None);
    }

    #[test]
    fn test_captured_false_is_subprocess_fault() {
        let mut ctx = test_context();
        let err = CommandExecutor::new()
            .run(&mut ctx, "false", RunOptions::new().with_silent(true))
            .unwrap_err();

        match err {
            ExecError::Subprocess { code, command } => {
                assert_eq!(code, 1);
                assert_eq!(command, "false");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_allowed_exit_code_is_not_a_fault() {
        let mut ctx = test_context();
        let result = CommandExecutor::new()
            .run(
                &mut ctx,
                "exit 1",
                RunOptions::probe().with_allowed_exit_codes([0, 1]),
            )
            .unwrap();

        assert_eq!(result.exit_code, 1);
    }

    #[test]
    fn test_captured_signal_is_negated() {
        let mut ctx = test_context();
        let err = CommandExecutor::new()
            .run(&mut ctx, "kill -TERM $$", RunOptions::new().with_silent(true))
            .unwrap_err();

        assert_eq!(err.exit_code(), Some(-15));
    }

    #[test]
    fn test_env_overrides_reach_child_and_persist() {
        let mut ctx = test_context();
        let result = CommandExecutor::new()
            .run(
                &mut ctx,
                "printf %s \"$DEV_EXEC_TEST\"",
                RunOptions::probe().with_env_var("DEV_EXEC_TEST", "overlay"),
            )
            .unwrap();

        assert_eq!(result.output.as_deref(), Some("overlay"));
        assert_eq!(ctx.var("DEV_EXEC_TEST"), Some("overlay"));

        let again = CommandExecutor::new()
            .run(&mut ctx, "printf %s \"$DEV_EXEC_TEST\"", RunOptions::probe())
            .unwrap();
        assert_eq!(again.output.as_deref(), Some("overlay"));
    }

    #[test]
    fn test_interactive_capture() {
        let mut ctx = test_context();
        let result = CommandExecutor::new()
            .run(&mut ctx, "printf interactive", RunOptions::new().with_capture(true))
            .unwrap();

        assert_eq!(result.exit_code, 0);
        assert_eq!(result.output.as_deref(), Some("interactive"));
    }

    #[test]
    fn test_interactive_nonzero_is_subprocess_fault() {
        let mut ctx = test_context();
        let err = CommandExecutor::new()
            .run(&mut ctx, "exit 4", RunOptions::new())
            .unwrap_err();

        match err {
            ExecError::Subprocess { code, command } => {
                assert_eq!(code, 4);
                assert_eq!(command, "exit 4");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
