use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;

use dev_config::paths;
use dev_exec::{console, RunOptions};

use crate::error::{Result, TaskError};
use crate::git::{self, RemoteUrl, GITHUB_HOST};
use crate::task::{Task, TaskContext};

use super::single_arg;

static REPO_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9\-_.]+$").expect("Invalid repository regex"));

static ORG_REPO_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<organization>[a-zA-Z0-9\-_.]+)/(?P<repository>[a-zA-Z0-9\-_.]+)$")
        .expect("Invalid organization/repository regex")
});

/// Clones a repository into `<source root>/<host>/<organization>/<repository>`
/// and changes the parent shell's directory to it.
pub struct CloneRepo {
    root: Option<PathBuf>,
}

impl CloneRepo {
    /// Clones below the configured source root.
    pub fn new() -> Self {
        Self { root: None }
    }

    /// Clones below `root` instead.
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Some(root.into()),
        }
    }
}

impl Default for CloneRepo {
    fn default() -> Self {
        Self::new()
    }
}

impl Task for CloneRepo {
    type Args = Vec<String>;
    const NAME: &'static str = "clone";
    const DESCRIPTION: &'static str = "Clone a remote repository";

    fn up(&self, args: Vec<String>, ctx: &mut TaskContext<'_>) -> Result<()> {
        let arg = single_arg(args, "dev clone <repository_or_url>")?;
        let root = self.root.clone().unwrap_or_else(paths::src_dir);

        let (url, dir) = if REPO_REGEX.is_match(&arg) {
            let origin = git::remote_origin(ctx)?;
            clone_target(&arg, origin.as_ref(), &root)?
        } else {
            clone_target(&arg, None, &root)?
        };

        if dir.is_dir() {
            console::info(&format!("Already cloned in {}", dir.display()));
        } else {
            git::setup_config(ctx)?;
            ctx.run(&format!("git clone {} {}", url, dir.display()), RunOptions::new())?;
        }

        ctx.exec.bridge_mut().enqueue(format!("cd {}", dir.display()));
        Ok(())
    }
}

/// Clone URL and destination for `arg`.
///
/// - `repo`: sibling of the current repository's GitHub origin
/// - `org/repo`: GitHub repository
/// - SSH or HTTPS URL: cloned as given
fn clone_target(arg: &str, origin: Option<&RemoteUrl>, root: &Path) -> Result<(String, PathBuf)> {
    if REPO_REGEX.is_match(arg) {
        let origin = origin.ok_or_else(|| {
            TaskError::failed("Can not clone using only repository name when not in a repository")
        })?;
        if !origin.is_github() {
            return Err(TaskError::failed("Can only clone Github repositories by name"));
        }
        return Ok(github_target(&origin.organization, arg, root));
    }

    if let Some(captures) = ORG_REPO_REGEX.captures(arg) {
        return Ok(github_target(&captures["organization"], &captures["repository"], root));
    }

    if let Some(remote) = git::parse_url(arg) {
        let dir = root
            .join(&remote.host)
            .join(&remote.organization)
            .join(&remote.repository);
        return Ok((arg.to_string(), dir));
    }

    Err(TaskError::failed(format!("Could not parse {} for clone", arg)))
}

fn github_target(organization: &str, repository: &str, root: &Path) -> (String, PathBuf) {
    let url = format!("https://{}/{}/{}.git", GITHUB_HOST, organization, repository);
    let dir = root.join(GITHUB_HOST).join(organization).join(repository);
    (url, dir)
}
