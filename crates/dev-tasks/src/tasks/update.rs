use std::path::PathBuf;

use dev_config::paths;
use dev_exec::{console, RunOptions};

use crate::error::{Result, TaskError};
use crate::task::{Task, TaskContext};

const BRANCH: &str = "main";
const CLI_CRATE: &str = "crates/dev-cli";

/// Refreshes the install checkout and reinstalls the binary from it.
pub struct Update {
    install_dir: Option<PathBuf>,
}

impl Update {
    /// Updates the configured install checkout.
    pub fn new() -> Self {
        Self { install_dir: None }
    }

    /// Updates the checkout at `dir` instead.
    pub fn with_install_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            install_dir: Some(dir.into()),
        }
    }
}

impl Default for Update {
    fn default() -> Self {
        Self::new()
    }
}

impl Task for Update {
    type Args = Vec<String>;
    const NAME: &'static str = "update";
    const DESCRIPTION: &'static str = "Update dev to the latest version";

    fn up(&self, args: Vec<String>, ctx: &mut TaskContext<'_>) -> Result<()> {
        if !args.is_empty() {
            return Err(TaskError::failed("Usage: dev update"));
        }

        let dir = self.install_dir.clone().unwrap_or_else(paths::install_dir);
        let dir = dir.display();

        ctx.run(
            &format!("git -C {} fetch --quiet --depth=1 origin {}", dir, BRANCH),
            RunOptions::new(),
        )?;
        ctx.run(
            &format!("git -C {} reset --quiet origin/{} --hard", dir, BRANCH),
            RunOptions::new(),
        )?;
        ctx.run(
            &format!("cargo install --quiet --force --path {}/{}", dir, CLI_CRATE),
            RunOptions::new(),
        )?;

        console::success("dev updated successfully");
        Ok(())
    }
}
