use std::fs;
use std::path::{Path, PathBuf};

use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use tracing::{debug, trace};

use dev_config::paths;
use dev_exec::console;

use crate::error::{Result, TaskError};
use crate::task::{Task, TaskContext};

const GIT_DIR: &str = ".git";

/// Deepest layout searched: `<root>/<host>/<organization>/<repository>`.
const MAX_DEPTH: usize = 3;

/// Asks the user which entry they meant; returns the raw answer.
pub type Prompt = fn(&str) -> Result<String>;

/// Changes the parent shell's directory to a repository under the source root.
pub struct Cd {
    root: Option<PathBuf>,
    prompt: Prompt,
}

impl Cd {
    /// Searches the configured source root and prompts on the terminal.
    pub fn new() -> Self {
        Self {
            root: None,
            prompt: read_answer,
        }
    }

    /// Searches `root` instead of the configured source root.
    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = Some(root.into());
        self
    }

    /// Uses `prompt` to ask for a selection.
    pub fn with_prompt(mut self, prompt: Prompt) -> Self {
        self.prompt = prompt;
        self
    }

    fn select<'e>(&self, entries: &'e [Repository]) -> Result<&'e Repository> {
        console::announce("Found multiple matches, select which one you meant:");
        println!(
            "{:>5}  {:<30} {:<20} {:<20} {}",
            "Index", "Repository", "Organization", "Host", "Path"
        );
        for (index, entry) in entries.iter().enumerate() {
            println!(
                "{:>5}  {:<30} {:<20} {:<20} {}",
                index + 1,
                entry.name,
                entry.organization.as_deref().unwrap_or(""),
                entry.host.as_deref().unwrap_or(""),
                entry.path.display()
            );
        }

        let answer = (self.prompt)("Which one? [1]: ")?;
        let answer = answer.trim();
        let selected = if answer.is_empty() {
            Some(1)
        } else {
            answer.parse::<usize>().ok()
        };

        match selected {
            Some(index) if (1..=entries.len()).contains(&index) => Ok(&entries[index - 1]),
            _ => Err(TaskError::failed(format!(
                "Answer must be in interval 1 to {}",
                entries.len()
            ))),
        }
    }
}

impl Default for Cd {
    fn default() -> Self {
        Self::new()
    }
}

impl Task for Cd {
    type Args = Vec<String>;
    const NAME: &'static str = "cd";
    const DESCRIPTION: &'static str = "Change directory to a repository";

    fn up(&self, args: Vec<String>, ctx: &mut TaskContext<'_>) -> Result<()> {
        let root = self.root.clone().unwrap_or_else(paths::src_dir);
        let repositories = find_repositories(&root);
        debug!(root = %root.display(), found = repositories.len(), "scanned for repositories");

        let candidates: Vec<Repository> = match args.first() {
            None => repositories,
            Some(pattern) => repositories
                .into_iter()
                .filter(|repository| repository.name.contains(pattern.as_str()))
                .collect(),
        };

        let target = match (candidates.len(), args.first()) {
            (0, Some(pattern)) => {
                return Err(TaskError::failed(format!(
                    "Could not find any repositories matching {}",
                    pattern
                )))
            }
            (0, None) => {
                return Err(TaskError::failed(format!(
                    "Could not find any repositories in {}",
                    root.display()
                )))
            }
            (1, Some(_)) => &candidates[0],
            _ => self.select(&candidates)?,
        };

        ctx.exec.bridge_mut().enqueue(format!("cd {}", target.path.display()));
        Ok(())
    }
}

/// A git checkout found under the source root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Repository {
    pub name: String,
    pub host: Option<String>,
    pub organization: Option<String>,
    pub path: PathBuf,
}

/// Git repositories one to three levels below `root`, sorted by lower-cased
/// name.
///
/// The level decides what the parent directories mean: `repo`,
/// `host/repo` or `host/organization/repo`.
pub fn find_repositories(root: &Path) -> Vec<Repository> {
    let mut found = Vec::new();
    scan(root, &mut Vec::new(), &mut found);
    found.sort_by_key(|repository| repository.name.to_lowercase());
    found
}

fn scan(dir: &Path, parents: &mut Vec<String>, found: &mut Vec<Repository>) {
    let Ok(children) = fs::read_dir(dir) else {
        trace!(dir = %dir.display(), "skipping unreadable directory");
        return;
    };

    for child in children.flatten() {
        let path = child.path();
        if !path.is_dir() {
            continue;
        }
        let name = child.file_name().to_string_lossy().into_owned();

        if path.join(GIT_DIR).is_dir() {
            let (host, organization) = match parents.as_slice() {
                [] => (None, None),
                [host] => (Some(host.clone()), None),
                [host, organization] => (Some(host.clone()), Some(organization.clone())),
                _ => continue,
            };
            found.push(Repository {
                name,
                host,
                organization,
                path,
            });
        } else if parents.len() + 1 < MAX_DEPTH {
            parents.push(name);
            scan(&path, parents, found);
            parents.pop();
        }
    }
}

fn read_answer(prompt: &str) -> Result<String> {
    let mut editor =
        DefaultEditor::new().map_err(|e| TaskError::failed(format!("Could not read answer: {}", e)))?;

    editor.readline(prompt).map_err(|e| match e {
        ReadlineError::Interrupted | ReadlineError::Eof => TaskError::failed("No repository selected"),
        other => TaskError::failed(format!("Could not read answer: {}", other)),
    })
}
