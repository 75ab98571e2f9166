use std::path::PathBuf;

use dev_exec::RunOptions;

use crate::error::{Result, TaskError};
use crate::git::{self, RemoteUrl};
use crate::task::{Task, TaskContext};

use super::single_arg;

/// Targets handled without Devfile configuration.
const BUILTIN_TARGETS: [&str; 2] = ["pr", "issue"];

/// Programs tried, in order, to open a URL.
const OPENERS: [&str; 2] = ["open", "xdg-open"];

const DEFAULT_BRANCHES: [&str; 2] = ["main", "master"];

/// Opens the current pull request, a new issue, or a Devfile `open:` target
/// in the browser.
pub struct Open;

impl Task for Open {
    type Args = Vec<String>;
    const NAME: &'static str = "open";
    const DESCRIPTION: &'static str = "Open links in your browser";

    fn up(&self, args: Vec<String>, ctx: &mut TaskContext<'_>) -> Result<()> {
        let target = single_arg(args, "dev open <target>")?;

        let url = match target.as_str() {
            "pr" => pull_request_url(ctx)?,
            "issue" => {
                let remote = github_remote(ctx)?;
                format!(
                    "https://github.com/{}/{}/issues/new",
                    remote.organization, remote.repository
                )
            }
            _ => match ctx.devfile.open_targets().get(&target) {
                Some(url) => url.clone(),
                None => {
                    let valid: Vec<&str> = ctx
                        .devfile
                        .open_targets()
                        .keys()
                        .map(String::as_str)
                        .chain(BUILTIN_TARGETS)
                        .collect();
                    return Err(TaskError::failed(format!(
                        "No URL configured for {}. Valid targets are {}.",
                        target,
                        valid.join(", ")
                    )));
                }
            },
        };

        let opener = find_opener(ctx)?;
        ctx.run(&format!("{} {}", opener, url), RunOptions::new())?;
        Ok(())
    }
}

fn github_remote(ctx: &mut TaskContext<'_>) -> Result<RemoteUrl> {
    match git::remote_origin(ctx)? {
        Some(remote) if remote.is_github() => Ok(remote),
        _ => Err(TaskError::failed("Feature only supported on Github remotes.")),
    }
}

fn pull_request_url(ctx: &mut TaskContext<'_>) -> Result<String> {
    let remote = github_remote(ctx)?;
    let branch = git::current_branch(ctx)?;
    if DEFAULT_BRANCHES.contains(&branch.as_str()) {
        return Err(TaskError::failed("Cannot open PR for default branch"));
    }
    Ok(format!(
        "https://github.com/{}/{}/pull/{}",
        remote.organization, remote.repository, branch
    ))
}

/// First of `open` and `xdg-open` found on the invocation's `PATH`.
fn find_opener(ctx: &TaskContext<'_>) -> Result<&'static str> {
    let search_path = ctx.exec.var("PATH");
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));

    OPENERS
        .into_iter()
        .find(|opener| which::which_in(opener, search_path, &cwd).is_ok())
        .ok_or_else(|| TaskError::failed(format!("Could not find {} on PATH", OPENERS.join(" or "))))
}
