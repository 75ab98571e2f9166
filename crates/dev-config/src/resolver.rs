//! Command name to execution plan.

use serde_yaml::Value;
use tracing::debug;

use crate::devfile::Devfile;
use crate::error::ResolveError;
use crate::invocation::{DirectionedPlan, TaskInvocation};

/// Command names with built-in meaning.
pub const RESERVED_COMMANDS: [&str; 2] = ["up", "down"];

/// Resolve `name` against `devfile` into a plan.
///
/// - an internal task name (per `is_internal`) runs that task once, upward,
///   with `extra_args` as a list argument
/// - `down` runs the `down:` tasks upward, then the `up:` tasks downward in
///   their declared order
/// - `up` and custom commands run their tasks upward
///
/// Anything else is [`ResolveError::CommandNotFound`].
pub fn resolve_command<F>(
    devfile: &Devfile,
    name: &str,
    extra_args: &[String],
    is_internal: F,
) -> Result<DirectionedPlan, ResolveError>
where
    F: Fn(&str) -> bool,
{
    if is_internal(name) {
        let args = Value::Sequence(extra_args.iter().map(|arg| Value::from(arg.as_str())).collect());
        debug!(command = name, "resolved internal task");
        return Ok(DirectionedPlan::up(
            vec![TaskInvocation::new(name, Some(args))].into(),
        ));
    }

    let plan = match name {
        "up" => DirectionedPlan::up(devfile.up().clone()),
        "down" => DirectionedPlan::with_down(devfile.down().clone(), devfile.up().clone()),
        _ => {
            let command = devfile
                .command(name)
                .ok_or_else(|| ResolveError::CommandNotFound(name.to_string()))?;
            DirectionedPlan::up(command.tasks.clone())
        }
    };

    debug!(command = name, steps = plan.len(), "resolved command");
    Ok(plan)
}

/// Returns true for `up` and `down`.
pub fn is_reserved(name: &str) -> bool {
    RESERVED_COMMANDS.contains(&name)
}
