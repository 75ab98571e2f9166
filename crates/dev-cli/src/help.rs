//! Command and task listings.
//!
//! Shown for `--commands`, `--tasks`, a bare `dev-bare`, and when a command
//! or task name cannot be found. `brief` prints one name per line and feeds
//! the shell completion.

use serde::Serialize;

use dev_config::Devfile;
use dev_exec::console;
use dev_tasks::{TaskKind, TaskRegistry};

use crate::cli::OutputFormat;

const BUILTIN_COMMANDS: [(&str, &str); 2] = [
    ("up", "Setup your local environment"),
    ("down", "Shutdown your local environment"),
];

/// One row of a listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Entry {
    pub name: String,
    pub description: Option<String>,
}

impl Entry {
    fn new(name: &str, description: Option<&str>) -> Self {
        Self {
            name: name.to_string(),
            description: description.map(str::to_string),
        }
    }
}

/// Built-in and custom commands, each in declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandListing {
    pub builtin: Vec<Entry>,
    pub custom: Vec<Entry>,
}

impl CommandListing {
    pub fn new(registry: &TaskRegistry, devfile: &Devfile) -> Self {
        let builtin = BUILTIN_COMMANDS
            .into_iter()
            .chain(registry.list(TaskKind::Internal))
            .map(|(name, description)| Entry::new(name, Some(description)))
            .collect();

        let custom = devfile
            .commands()
            .iter()
            .map(|command| Entry::new(&command.name, command.description.as_deref()))
            .collect();

        Self { builtin, custom }
    }

    pub fn render(&self, format: OutputFormat) -> String {
        match format {
            OutputFormat::Table => {
                let mut out = table("Builtin commands", "Command", &self.builtin);
                if !self.custom.is_empty() {
                    out.push('\n');
                    out.push_str(&table("Custom commands", "Command", &self.custom));
                }
                out
            }
            OutputFormat::Brief => brief(self.builtin.iter().chain(&self.custom)),
            OutputFormat::Json => json(self),
        }
    }
}

/// Project tasks usable in a Devfile.
pub fn task_entries(registry: &TaskRegistry) -> Vec<Entry> {
    registry
        .list(TaskKind::Project)
        .into_iter()
        .map(|(name, description)| Entry::new(name, Some(description)))
        .collect()
}

pub fn render_tasks(entries: &[Entry], format: OutputFormat) -> String {
    match format {
        OutputFormat::Table => table("Tasks", "Task", entries),
        OutputFormat::Brief => brief(entries),
        OutputFormat::Json => json(entries),
    }
}

/// Print the commands listing, preceded by an error when `missing` is set.
pub fn print_commands(registry: &TaskRegistry, devfile: &Devfile, format: OutputFormat, missing: Option<&str>) {
    if let Some(name) = missing {
        console::error(&format!("Could not find command {}", name));
    }
    print!("{}", CommandListing::new(registry, devfile).render(format));
}

/// Print the tasks listing, preceded by an error when `missing` is set.
pub fn print_tasks(registry: &TaskRegistry, format: OutputFormat, missing: Option<&str>) {
    if let Some(name) = missing {
        console::error(&format!("Could not find task {}", name));
    }
    print!("{}", render_tasks(&task_entries(registry), format));
}

fn table(title: &str, column: &str, entries: &[Entry]) -> String {
    let width = entries
        .iter()
        .map(|entry| entry.name.len())
        .chain([column.len(), 10])
        .max()
        .unwrap_or(10);

    let mut out = format!("{}\n", title);
    out.push_str(&format!("{:<width$}  DESCRIPTION\n", column.to_uppercase(), width = width));
    out.push_str(&format!("{}\n", "-".repeat(width + 52)));
    for entry in entries {
        out.push_str(&format!(
            "{:<width$}  {}\n",
            entry.name,
            entry.description.as_deref().unwrap_or(""),
            width = width
        ));
    }
    out
}

fn brief<'e>(entries: impl IntoIterator<Item = &'e Entry>) -> String {
    entries.into_iter().map(|entry| format!("{}\n", entry.name)).collect()
}

fn json<T: Serialize + ?Sized>(value: &T) -> String {
    match serde_json::to_string_pretty(value) {
        Ok(json) => format!("{}\n", json),
        Err(e) => {
            tracing::warn!(error = %e, "failed to serialize listing");
            String::new()
        }
    }
}
