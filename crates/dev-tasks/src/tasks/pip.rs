use std::path::Path;

use serde::Deserialize;

use dev_exec::{console, RunOptions};

use crate::error::{Result, TaskError};
use crate::task::{Task, TaskContext};

const PIP_FLAGS: &str = "--disable-pip-version-check -q";
const DEFAULT_REQUIREMENTS: &str = "requirements.txt";

/// Installs Python requirement files and packages.
pub struct Pip;

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum PipArgs {
    One(String),
    Many(Vec<String>),
}

impl Task for Pip {
    type Args = Option<PipArgs>;
    const NAME: &'static str = "pip";
    const DESCRIPTION: &'static str = "Install Python dependencies with pip";

    fn up(&self, args: Self::Args, ctx: &mut TaskContext<'_>) -> Result<()> {
        let to_install = match args {
            None => vec![DEFAULT_REQUIREMENTS.to_string()],
            Some(PipArgs::One(item)) => vec![item],
            Some(PipArgs::Many(items)) => items,
        };

        for item in &to_install {
            if item.ends_with(".txt") {
                install_requirements(ctx, item)?;
            } else {
                install_package(ctx, item)?;
            }
        }
        Ok(())
    }
}

fn install_requirements(ctx: &mut TaskContext<'_>, filename: &str) -> Result<()> {
    if !Path::new(filename).exists() {
        return Err(TaskError::failed(format!("{} does not exist", filename)));
    }
    ctx.run(&format!("pip {} install -r {}", PIP_FLAGS, filename), RunOptions::new())?;
    console::success(&format!("Python dependencies from {} installed successfully", filename));
    Ok(())
}

fn install_package(ctx: &mut TaskContext<'_>, package: &str) -> Result<()> {
    ctx.run(&format!("pip {} install {}", PIP_FLAGS, package), RunOptions::new())?;
    console::success(&format!("Python package {} installed successfully", package));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::DynTask;
    use crate::testing::ScriptedShell;
    use dev_config::{Devfile, Direction};
    use dev_exec::ExecutionContext;
    use serde_yaml::Value;
    use tempfile::tempdir;

    fn execute(shell: &ScriptedShell, args: Value) -> Result<()> {
        let devfile = Devfile::empty();
        let mut exec = ExecutionContext::default();
        let mut ctx = TaskContext::new(&mut exec, shell, &devfile, &[]);
        Pip.bind(args)
            .map_err(TaskError::Failed)?
            .execute(Direction::Up, &mut ctx)
    }

    #[test]
    fn test_packages() {
        let shell = ScriptedShell::new();
        execute(&shell, serde_yaml::from_str("[black, isort]").unwrap()).unwrap();
        assert_eq!(
            shell.commands(),
            vec![
                "pip --disable-pip-version-check -q install black",
                "pip --disable-pip-version-check -q install isort",
            ]
        );
    }

    #[test]
    fn test_requirements_file() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("dev.txt");
        std::fs::write(&file, "black\n").unwrap();
        let file = file.to_string_lossy().to_string();

        let shell = ScriptedShell::new();
        execute(&shell, Value::from(file.as_str())).unwrap();
        assert_eq!(
            shell.commands(),
            vec![format!("pip --disable-pip-version-check -q install -r {}", file)]
        );
    }

    #[test]
    fn test_missing_requirements_file() {
        let shell = ScriptedShell::new();
        let err = execute(&shell, Value::from("no-such-dir/requirements.txt")).unwrap_err();

        assert_eq!(err.to_string(), "no-such-dir/requirements.txt does not exist");
        assert!(shell.commands().is_empty());
    }

    #[test]
    fn test_absent_args_use_default_file() {
        let shell = ScriptedShell::new();
        let result = execute(&shell, Value::Null);

        if Path::new(DEFAULT_REQUIREMENTS).exists() {
            assert!(result.is_ok());
        } else {
            assert!(matches!(result, Err(TaskError::Failed(ref m)) if m == "requirements.txt does not exist"));
        }
    }

    #[test]
    fn test_mapping_is_rejected() {
        assert!(Pip.bind(serde_yaml::from_str("a: b").unwrap()).is_err());
    }
}
