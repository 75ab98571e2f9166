use std::collections::BTreeMap;

use serde::Deserialize;
use tracing::debug;

use dev_exec::{ExecError, RunOptions};

use crate::error::Result;
use crate::task::{Task, TaskContext};

/// Runs shell commands.
pub struct Run;

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum RunArgs {
    /// `- run: date`
    Single(String),
    /// `- run: [date, uptime]`
    Many(Vec<String>),
    /// `- run: {command: ..., env: {...}, if: ...}`
    Detailed(DetailedRun),
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DetailedRun {
    command: Commands,
    #[serde(default)]
    env: BTreeMap<String, String>,
    /// Skip the commands when this succeeds.
    #[serde(rename = "if")]
    unless_ok: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Commands {
    One(String),
    Many(Vec<String>),
}

impl From<Commands> for Vec<String> {
    fn from(commands: Commands) -> Self {
        match commands {
            Commands::One(command) => vec![command],
            Commands::Many(commands) => commands,
        }
    }
}

impl Task for Run {
    type Args = RunArgs;
    const NAME: &'static str = "run";
    const DESCRIPTION: &'static str = "Run shell commands";

    fn up(&self, args: RunArgs, ctx: &mut TaskContext<'_>) -> Result<()> {
        let (commands, env, unless_ok): (Vec<String>, _, _) = match args {
            RunArgs::Single(command) => (vec![command], BTreeMap::new(), None),
            RunArgs::Many(commands) => (commands, BTreeMap::new(), None),
            RunArgs::Detailed(detailed) => (detailed.command.into(), detailed.env, detailed.unless_ok),
        };

        if let Some(check) = unless_ok {
            match ctx.run(&check, RunOptions::new().with_silent(true)) {
                Ok(_) => {
                    debug!(check = %check, "condition succeeded, skipping commands");
                    return Ok(());
                }
                Err(ExecError::Subprocess { code, .. }) => {
                    debug!(check = %check, code, "condition failed, running commands");
                }
                Err(e) => return Err(e.into()),
            }
        }

        let last = commands.len().saturating_sub(1);
        for (index, command) in commands.iter().enumerate() {
            let command = if index == last && !ctx.extra_args.is_empty() {
                format!("{} {}", command, ctx.extra_args.join(" "))
            } else {
                command.clone()
            };
            ctx.run(&command, RunOptions::new().with_env(env.clone()))?;
        }

        Ok(())
    }
}
