//! Plan execution.
//!
//! Each invocation moves through
//!
//! ```text
//! Created ──validate──► Validated ──execute──► Executing ──► Completed
//!    │                                            │
//!    └──────────────► Failed ◄────────────────────┘
//! ```
//!
//! [`TaskInstance`] and [`ValidatedTask`] encode the first two states in
//! the type system, so a task cannot run with unchecked arguments. A plan
//! stops at the first failure.

use serde_yaml::Value;
use tracing::{debug, trace};

use dev_config::{Direction, DirectionedPlan, TaskInvocation};

use crate::error::{RunError, TaskError};
use crate::registry::TaskRegistry;
use crate::task::{BoundTask, DynTask, TaskContext};

/// A task paired with its raw arguments, not yet validated.
pub struct TaskInstance<'r> {
    task: &'r dyn DynTask,
    args: Option<Value>,
}

impl<'r> TaskInstance<'r> {
    /// Creates an instance in the `Created` state.
    pub fn new(task: &'r dyn DynTask, args: Option<Value>) -> Self {
        Self { task, args }
    }

    /// Check the arguments against the task's declared shape.
    pub fn validate(self) -> Result<ValidatedTask<'r>, RunError> {
        let name = self.task.name();
        let args = self.args.unwrap_or(Value::Null);

        match self.task.bind(args) {
            Ok(bound) => {
                trace!(task = name, "task validated");
                Ok(ValidatedTask { name, bound })
            }
            Err(message) => {
                debug!(task = name, error = %message, "task validation failed");
                Err(RunError::Validation {
                    task: name.to_string(),
                    message,
                })
            }
        }
    }
}

/// A task whose arguments matched its declared shape.
pub struct ValidatedTask<'r> {
    name: &'static str,
    bound: Box<dyn BoundTask + 'r>,
}

impl ValidatedTask<'_> {
    /// Registry name of the task.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Run the handler for `direction`.
    ///
    /// A logic failure becomes [`RunError::TaskFailed`]; a command failure
    /// is passed through unchanged as [`RunError::Exec`].
    pub fn execute(self, direction: Direction, ctx: &mut TaskContext<'_>) -> Result<(), RunError> {
        let name = self.name;
        trace!(task = name, %direction, "task executing");

        match self.bound.execute(direction, ctx) {
            Ok(()) => {
                trace!(task = name, %direction, "task completed");
                Ok(())
            }
            Err(TaskError::Failed(message)) => {
                debug!(task = name, %direction, error = %message, "task failed");
                Err(RunError::TaskFailed {
                    task: name.to_string(),
                    message,
                })
            }
            Err(TaskError::Exec(e)) => {
                debug!(task = name, %direction, error = %e, "command failed inside task");
                Err(RunError::Exec(e))
            }
        }
    }
}

/// Runs invocations against a registry.
pub struct TaskRunner<'r> {
    registry: &'r TaskRegistry,
}

impl<'r> TaskRunner<'r> {
    /// Creates a runner.
    pub fn new(registry: &'r TaskRegistry) -> Self {
        Self { registry }
    }

    /// Validate and run one invocation.
    pub fn run_invocation(
        &self,
        invocation: &TaskInvocation,
        direction: Direction,
        ctx: &mut TaskContext<'_>,
    ) -> Result<(), RunError> {
        let task = self
            .registry
            .get(&invocation.name)
            .ok_or_else(|| RunError::TaskNotFound(invocation.name.clone()))?;

        TaskInstance::new(task, invocation.args.clone())
            .validate()?
            .execute(direction, ctx)
    }

    /// Run every invocation of `plan` in order, stopping at the first error.
    ///
    /// Every task name is looked up before the first one runs, so a plan
    /// naming an unknown task runs nothing. Returns the number of
    /// invocations that completed.
    pub fn run_plan(&self, plan: &DirectionedPlan, ctx: &mut TaskContext<'_>) -> Result<usize, RunError> {
        if let Some((_, missing)) = plan
            .steps()
            .find(|(_, invocation)| self.registry.get(&invocation.name).is_none())
        {
            debug!(task = %missing.name, "plan names an unknown task");
            return Err(RunError::TaskNotFound(missing.name.clone()));
        }

        let mut completed = 0;
        for (direction, invocation) in plan.steps() {
            debug!(task = %invocation.name, %direction, "running task");
            self.run_invocation(invocation, direction, ctx)?;
            completed += 1;
        }
        Ok(completed)
    }
}
