//! Test double for [`Shell`].

use std::cell::RefCell;
use std::collections::HashMap;

use dev_exec::{CommandResult, ExecError, ExecutionContext, RunOptions, Shell};

/// One recorded call.
#[derive(Debug, Clone)]
pub(crate) struct Call {
    pub command: String,
    pub options: RunOptions,
}

/// Records commands and answers them from a script; unscripted commands
/// exit 0 with empty output.
#[derive(Default)]
pub(crate) struct ScriptedShell {
    responses: HashMap<String, (i32, String)>,
    calls: RefCell<Vec<Call>>,
}

impl ScriptedShell {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_exit_code(self, command: &str, code: i32) -> Self {
        self.with_response(command, code, "")
    }

    pub fn with_output(self, command: &str, output: &str) -> Self {
        self.with_response(command, 0, output)
    }

    pub fn with_response(mut self, command: &str, code: i32, output: &str) -> Self {
        self.responses
            .insert(command.to_string(), (code, output.to_string()));
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    pub fn commands(&self) -> Vec<String> {
        self.calls.borrow().iter().map(|call| call.command.clone()).collect()
    }
}

impl Shell for ScriptedShell {
    fn run(
        &self,
        ctx: &mut ExecutionContext,
        command: &str,
        options: RunOptions,
    ) -> dev_exec::Result<CommandResult> {
        self.calls.borrow_mut().push(Call {
            command: command.to_string(),
            options: options.clone(),
        });
        ctx.merge_env(options.env.clone());

        let (code, output) = self
            .responses
            .get(command)
            .cloned()
            .unwrap_or_else(|| (0, String::new()));

        if !options.allowed_exit_codes.contains(&code) {
            return Err(ExecError::Subprocess {
                code,
                command: command.to_string(),
            });
        }

        Ok(CommandResult {
            exit_code: code,
            output: options.capture.then(|| output.trim().to_string()),
        })
    }
}
