//! Task definition parsing.
//!
//! Accepted shapes:
//!
//! ```yaml
//! lint: flake8                  # bare string: one `run` task
//! test:
//!   - pip                       # name without arguments
//!   - run: py.test              # {task: args}
//!   - env: {A: "1"}
//!     run: make                 # several keys: one task per key
//! logs:
//!   description: Tail logs
//!   tasks:                      # command form
//!     - run: docker-compose logs -f
//! ```

use serde_yaml::{Mapping, Value};

use crate::error::{ConfigError, Result};
use crate::invocation::{InvocationList, TaskInvocation};

/// Task used for bare-string definitions.
pub const DEFAULT_TASK: &str = "run";

const TASKS_KEY: &str = "tasks";
const DESCRIPTION_KEY: &str = "description";

/// Parse a task definition into invocations, in source order.
///
/// `null` yields an empty list.
pub fn parse(definition: &Value) -> Result<InvocationList> {
    match definition {
        Value::Null => Ok(InvocationList::new()),
        Value::String(command) => Ok(vec![TaskInvocation::new(DEFAULT_TASK, Some(Value::from(command.as_str())))].into()),
        Value::Sequence(items) => {
            let mut invocations = Vec::new();
            for item in items {
                parse_item(item, &mut invocations)?;
            }
            Ok(invocations.into())
        }
        Value::Mapping(map) if map.len() == 1 => {
            let mut invocations = Vec::new();
            parse_mapping(map, &mut invocations)?;
            Ok(invocations.into())
        }
        other => Err(ConfigError::Definition(format!(
            "expected a command string, a task list or a single task, found {}",
            describe(other)
        ))),
    }
}

/// Parse a custom command value: a plain definition or
/// `{tasks: <definition>, description: <string>}`.
///
/// Returns the optional description and the invocations.
pub fn parse_command(definition: &Value) -> Result<(Option<String>, InvocationList)> {
    let Value::Mapping(map) = definition else {
        return Ok((None, parse(definition)?));
    };
    if !map.contains_key(TASKS_KEY) {
        return Ok((None, parse(definition)?));
    }

    for key in map.keys() {
        match key.as_str() {
            Some(TASKS_KEY) | Some(DESCRIPTION_KEY) => {}
            _ => {
                return Err(ConfigError::Definition(format!(
                    "unexpected key {} next to '{}'",
                    describe_key(key),
                    TASKS_KEY
                )))
            }
        }
    }

    let description = match map.get(DESCRIPTION_KEY) {
        None | Some(Value::Null) => None,
        Some(Value::String(text)) => Some(text.clone()),
        Some(other) => {
            return Err(ConfigError::Definition(format!(
                "'{}' must be a string, found {}",
                DESCRIPTION_KEY,
                describe(other)
            )))
        }
    };

    let tasks = match map.get(TASKS_KEY) {
        Some(Value::Mapping(_)) => {
            return Err(ConfigError::Definition(format!("'{}' must be a list of tasks", TASKS_KEY)))
        }
        Some(value) => parse(value)?,
        None => InvocationList::new(),
    };

    Ok((description, tasks))
}

fn parse_item(item: &Value, out: &mut Vec<TaskInvocation>) -> Result<()> {
    match item {
        Value::String(name) => {
            out.push(TaskInvocation::named(name.as_str()));
            Ok(())
        }
        Value::Mapping(map) if !map.is_empty() => parse_mapping(map, out),
        other => Err(ConfigError::Definition(format!(
            "expected a task name or a {{task: arguments}} mapping, found {}",
            describe(other)
        ))),
    }
}

fn parse_mapping(map: &Mapping, out: &mut Vec<TaskInvocation>) -> Result<()> {
    for (key, args) in map {
        let Some(name) = key.as_str() else {
            return Err(ConfigError::Definition(format!(
                "task names must be strings, found {}",
                describe_key(key)
            )));
        };
        check_args(name, args)?;
        out.push(TaskInvocation::new(name, Some(args.clone())));
    }
    Ok(())
}

/// Arguments are plain YAML data: scalars, lists and string-keyed maps.
fn check_args(task: &str, args: &Value) -> Result<()> {
    match args {
        Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_) => Ok(()),
        Value::Sequence(items) => items.iter().try_for_each(|item| check_args(task, item)),
        Value::Mapping(map) => map.iter().try_for_each(|(key, value)| {
            if key.is_string() {
                check_args(task, value)
            } else {
                Err(ConfigError::Definition(format!(
                    "arguments to {} must use string keys, found {}",
                    task,
                    describe_key(key)
                )))
            }
        }),
        Value::Tagged(_) => Err(ConfigError::Definition(format!(
            "arguments to {} must not use YAML tags",
            task
        ))),
    }
}

fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a list",
        Value::Mapping(map) if map.is_empty() => "an empty mapping",
        Value::Mapping(_) => "a mapping with several keys",
        Value::Tagged(_) => "a tagged value",
    }
}

fn describe_key(key: &Value) -> String {
    match key.as_str() {
        Some(text) => format!("'{}'", text),
        None => describe(key).to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn yaml(text: &str) -> Value {
        serde_yaml::from_str(text).unwrap()
    }

    fn names(list: &InvocationList) -> Vec<&str> {
        list.names()
    }

    #[test]
    fn test_bare_string_is_run_task() {
        let list = parse(&yaml("date")).unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list.as_slice()[0].name, "run");
        assert_eq!(list.as_slice()[0].args, Some(Value::from("date")));
    }

    #[test]
    fn test_null_is_empty() {
        assert!(parse(&Value::Null).unwrap().is_empty());
    }

    #[test]
    fn test_single_key_mapping() {
        let list = parse(&yaml("pip: requirements.txt")).unwrap();
        assert_eq!(names(&list), vec!["pip"]);
        assert_eq!(list.as_slice()[0].args, Some(Value::from("requirements.txt")));
    }

    #[test]
    fn test_list_preserves_order_and_args() {
        let list = parse(&yaml(
            r#"
- taskA: "x"
- taskB:
    K: v
"#,
        ))
        .unwrap();

        assert_eq!(names(&list), vec!["taskA", "taskB"]);
        assert_eq!(list.as_slice()[0].args, Some(Value::from("x")));
        assert_eq!(list.as_slice()[1].args, Some(yaml("K: v")));
    }

    #[test]
    fn test_string_in_list_has_no_args() {
        let list = parse(&yaml("- pip\n- run: make")).unwrap();
        assert_eq!(names(&list), vec!["pip", "run"]);
        assert!(list.as_slice()[0].args.is_none());
    }

    #[test]
    fn test_null_args_in_list() {
        let list = parse(&yaml("- pip:")).unwrap();
        assert_eq!(names(&list), vec!["pip"]);
        assert!(list.as_slice()[0].args.is_none());
    }

    #[test]
    fn test_multi_key_item_yields_one_per_key() {
        let list = parse(&yaml("- env: {A: '1'}\n  run: make\n- pip")).unwrap();
        assert_eq!(names(&list), vec!["env", "run", "pip"]);
    }

    #[test]
    fn test_number_is_rejected() {
        assert!(matches!(parse(&yaml("42")), Err(ConfigError::Definition(_))));
    }

    #[test]
    fn test_number_in_list_is_rejected() {
        assert!(parse(&yaml("- 1\n- pip")).is_err());
    }

    #[test]
    fn test_multi_key_top_level_mapping_is_rejected() {
        let err = parse(&yaml("a: 1\nb: 2")).unwrap_err();
        assert!(err.to_string().contains("several keys"));
    }

    #[test]
    fn test_non_string_task_name_is_rejected() {
        assert!(parse(&yaml("- 1: x")).is_err());
    }

    #[test]
    fn test_parse_is_pure() {
        let definition = yaml("- run: make\n- pip");
        let before = definition.clone();
        let first = parse(&definition).unwrap();
        let second = parse(&definition).unwrap();

        assert_eq!(first, second);
        assert_eq!(definition, before);
    }

    #[test]
    fn test_command_form_with_description() {
        let (description, list) = parse_command(&yaml(
            r#"
description: Tail development logs
tasks:
  - run: docker-compose logs -f
"#,
        ))
        .unwrap();

        assert_eq!(description.as_deref(), Some("Tail development logs"));
        assert_eq!(names(&list), vec!["run"]);
    }

    #[test]
    fn test_command_form_without_description() {
        let (description, list) = parse_command(&yaml("tasks: make")).unwrap();
        assert!(description.is_none());
        assert_eq!(names(&list), vec!["run"]);
    }

    #[test]
    fn test_command_plain_definitions() {
        let (description, list) = parse_command(&yaml("flake8")).unwrap();
        assert!(description.is_none());
        assert_eq!(names(&list), vec!["run"]);

        let (_, list) = parse_command(&yaml("- run: py.test")).unwrap();
        assert_eq!(names(&list), vec!["run"]);
    }

    #[test]
    fn test_command_form_rejects_extra_keys() {
        assert!(parse_command(&yaml("tasks: make\nextra: 1")).is_err());
    }

    #[test]
    fn test_command_form_rejects_non_string_description() {
        assert!(parse_command(&yaml("tasks: make\ndescription: [a]")).is_err());
    }
}
