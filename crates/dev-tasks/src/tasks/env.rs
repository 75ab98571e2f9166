use std::collections::BTreeMap;

use dev_exec::console;

use crate::error::Result;
use crate::task::{Task, TaskContext};

/// Sets environment variables for every later command of the invocation.
pub struct Env;

impl Task for Env {
    type Args = BTreeMap<String, String>;
    const NAME: &'static str = "env";
    const DESCRIPTION: &'static str = "Set environment variables";

    fn up(&self, vars: Self::Args, ctx: &mut TaskContext<'_>) -> Result<()> {
        for key in vars.keys() {
            console::announce(&format!("=> Setting environment variable {}", key));
        }
        ctx.exec.merge_env(vars);
        Ok(())
    }

    fn down(&self, vars: Self::Args, ctx: &mut TaskContext<'_>) -> Result<()> {
        ctx.exec.unset_env(vars.keys());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::DynTask;
    use crate::testing::ScriptedShell;
    use dev_config::{Devfile, Direction};
    use dev_exec::ExecutionContext;
    use serde_yaml::Value;

    fn execute(exec: &mut ExecutionContext, yaml: &str, direction: Direction) {
        let shell = ScriptedShell::new();
        let devfile = Devfile::empty();
        let args: Value = serde_yaml::from_str(yaml).unwrap();
        let mut ctx = TaskContext::new(exec, &shell, &devfile, &[]);
        Env.bind(args).unwrap().execute(direction, &mut ctx).unwrap();
    }

    #[test]
    fn test_up_sets_and_down_unsets() {
        let mut exec = ExecutionContext::default();

        execute(&mut exec, "DEBUG: '1'\nSCOPE: api", Direction::Up);
        assert_eq!(exec.var("DEBUG"), Some("1"));
        assert_eq!(exec.var("SCOPE"), Some("api"));

        execute(&mut exec, "DEBUG: '1'", Direction::Down);
        assert_eq!(exec.var("DEBUG"), None);
        assert_eq!(exec.var("SCOPE"), Some("api"));
    }

    #[test]
    fn test_non_string_values_are_rejected() {
        assert!(Env.bind(serde_yaml::from_str("A: [1]").unwrap()).is_err());
        assert!(Env.bind(Value::from("A=1")).is_err());
    }
}
