//! Task invocations and execution plans.

use std::fmt;

use serde_yaml::Value;

/// One scheduled run of a named task.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskInvocation {
    /// Registry name of the task.
    pub name: String,
    /// Task-specific arguments; `None` when absent or `null`.
    pub args: Option<Value>,
}

impl TaskInvocation {
    /// Creates an invocation. A `null` argument is stored as absent.
    pub fn new(name: impl Into<String>, args: Option<Value>) -> Self {
        Self {
            name: name.into(),
            args: args.filter(|value| !value.is_null()),
        }
    }

    /// Creates an invocation without arguments.
    pub fn named(name: impl Into<String>) -> Self {
        Self::new(name, None)
    }

    /// Arguments as a YAML value, `null` when absent.
    pub fn args_value(&self) -> Value {
        self.args.clone().unwrap_or(Value::Null)
    }
}

impl fmt::Display for TaskInvocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.args {
            None => write!(f, "<{}>", self.name),
            Some(args) => write!(f, "<{}: {:?}>", self.name, args),
        }
    }
}

/// Ordered invocations for one command, in source order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InvocationList(Vec<TaskInvocation>);

impl InvocationList {
    /// Creates an empty list.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TaskInvocation> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[TaskInvocation] {
        &self.0
    }

    /// Task names in order.
    pub fn names(&self) -> Vec<&str> {
        self.0.iter().map(|invocation| invocation.name.as_str()).collect()
    }
}

impl From<Vec<TaskInvocation>> for InvocationList {
    fn from(invocations: Vec<TaskInvocation>) -> Self {
        Self(invocations)
    }
}

impl FromIterator<TaskInvocation> for InvocationList {
    fn from_iter<I: IntoIterator<Item = TaskInvocation>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a InvocationList {
    type Item = &'a TaskInvocation;
    type IntoIter = std::slice::Iter<'a, TaskInvocation>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Which handler of a task runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Up => write!(f, "up"),
            Direction::Down => write!(f, "down"),
        }
    }
}

/// Up to two invocation lists tagged with a direction.
///
/// Iteration always yields the up-direction list first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DirectionedPlan {
    up: Option<InvocationList>,
    down: Option<InvocationList>,
}

impl DirectionedPlan {
    /// A plan with a single up-direction list.
    pub fn up(list: InvocationList) -> Self {
        Self {
            up: Some(list),
            down: None,
        }
    }

    /// A plan with both lists.
    pub fn with_down(up: InvocationList, down: InvocationList) -> Self {
        Self {
            up: Some(up),
            down: Some(down),
        }
    }

    /// The list for `direction`, if present.
    pub fn stage(&self, direction: Direction) -> Option<&InvocationList> {
        match direction {
            Direction::Up => self.up.as_ref(),
            Direction::Down => self.down.as_ref(),
        }
    }

    /// Stages in execution order.
    pub fn stages(&self) -> impl Iterator<Item = (Direction, &InvocationList)> {
        [(Direction::Up, self.up.as_ref()), (Direction::Down, self.down.as_ref())]
            .into_iter()
            .filter_map(|(direction, list)| list.map(|list| (direction, list)))
    }

    /// Every invocation with its direction, in execution order.
    pub fn steps(&self) -> impl Iterator<Item = (Direction, &TaskInvocation)> {
        self.stages()
            .flat_map(|(direction, list)| list.iter().map(move |invocation| (direction, invocation)))
    }

    /// Total number of invocations across stages.
    pub fn len(&self) -> usize {
        self.stages().map(|(_, list)| list.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
