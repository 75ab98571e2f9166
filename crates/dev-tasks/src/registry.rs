//! Task registry.

use crate::task::{DynTask, Task};
use crate::tasks::{Cd, CloneRepo, Env, Init, Open, Pip, Run, Update};

/// Where a task may be used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskKind {
    /// Referenced from the Devfile.
    Project,
    /// Invoked directly as a pseudo-command (`dev cd`, `dev update`).
    Internal,
}

struct Entry {
    kind: TaskKind,
    task: Box<dyn DynTask>,
}

/// Name to task lookup, in registration order.
///
/// # Example
///
/// ```
/// use dev_tasks::{TaskKind, TaskRegistry};
///
/// let registry = TaskRegistry::new();
/// assert!(registry.get("run").is_some());
/// assert!(registry.is_internal("cd"));
///
/// for (name, description) in registry.list(TaskKind::Project) {
///     println!("{:<10} {}", name, description);
/// }
/// ```
pub struct TaskRegistry {
    entries: Vec<Entry>,
}

impl TaskRegistry {
    /// Creates a registry with all built-in tasks.
    pub fn new() -> Self {
        let mut registry = Self::empty();

        registry.register(TaskKind::Project, Run);
        registry.register(TaskKind::Project, Env);
        registry.register(TaskKind::Project, Pip);

        registry.register(TaskKind::Internal, Cd::new());
        registry.register(TaskKind::Internal, CloneRepo::new());
        registry.register(TaskKind::Internal, Init);
        registry.register(TaskKind::Internal, Open);
        registry.register(TaskKind::Internal, Update::new());

        registry
    }

    /// Creates an empty registry.
    pub fn empty() -> Self {
        Self { entries: Vec::new() }
    }

    /// Registers a task, replacing any task with the same name.
    pub fn register<T: Task + 'static>(&mut self, kind: TaskKind, task: T) {
        let task: Box<dyn DynTask> = Box::new(task);
        match self.entries.iter_mut().find(|entry| entry.task.name() == task.name()) {
            Some(entry) => *entry = Entry { kind, task },
            None => self.entries.push(Entry { kind, task }),
        }
    }

    /// Gets a task by name.
    pub fn get(&self, name: &str) -> Option<&dyn DynTask> {
        self.entries
            .iter()
            .find(|entry| entry.task.name() == name)
            .map(|entry| entry.task.as_ref())
    }

    /// Returns true if `name` is a registered internal task.
    pub fn is_internal(&self, name: &str) -> bool {
        self.entries
            .iter()
            .any(|entry| entry.kind == TaskKind::Internal && entry.task.name() == name)
    }

    /// Names and descriptions of tasks of one kind, in registration order.
    pub fn list(&self, kind: TaskKind) -> Vec<(&'static str, &'static str)> {
        self.entries
            .iter()
            .filter(|entry| entry.kind == kind)
            .map(|entry| (entry.task.name(), entry.task.description()))
            .collect()
    }

    /// Returns the number of registered tasks.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no tasks are registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for TaskRegistry {
    fn default() -> Self {
        Self::new()
    }
}
