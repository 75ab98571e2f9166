//! Git helpers shared by the internal tasks.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use dev_exec::RunOptions;

use crate::task::TaskContext;

static SSH_URL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^git@(?P<host>.+):(?P<organization>.+)/(?P<repository>.+)\.git")
        .expect("Invalid SSH remote regex")
});

static HTTP_URL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^https?://(?P<host>.+)/(?P<organization>.+)/(?P<repository>.+)\.git")
        .expect("Invalid HTTP remote regex")
});

/// Host every short-form repository reference points at.
pub const GITHUB_HOST: &str = "github.com";

/// The parts of a remote URL that locate a repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteUrl {
    pub host: String,
    pub organization: String,
    pub repository: String,
}

impl RemoteUrl {
    /// Returns true for repositories hosted on GitHub.
    pub fn is_github(&self) -> bool {
        self.host == GITHUB_HOST
    }
}

impl fmt::Display for RemoteUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.host, self.organization, self.repository)
    }
}

/// Parse `git@host:org/repo.git` or `http(s)://host/org/repo.git`.
pub fn parse_url(url: &str) -> Option<RemoteUrl> {
    let captures = SSH_URL_REGEX
        .captures(url)
        .or_else(|| HTTP_URL_REGEX.captures(url))?;

    Some(RemoteUrl {
        host: captures["host"].to_string(),
        organization: captures["organization"].to_string(),
        repository: captures["repository"].to_string(),
    })
}

/// `remote.origin.url` of the current repository; empty when not set.
pub fn remote_origin_url(ctx: &mut TaskContext<'_>) -> dev_exec::Result<String> {
    let result = ctx.run(
        "git config --get remote.origin.url",
        RunOptions::probe().with_allowed_exit_codes([0, 1]),
    )?;
    Ok(result.output.unwrap_or_default())
}

/// Parsed origin remote, if there is one in a recognised format.
pub fn remote_origin(ctx: &mut TaskContext<'_>) -> dev_exec::Result<Option<RemoteUrl>> {
    Ok(parse_url(&remote_origin_url(ctx)?))
}

/// Name of the checked-out branch.
pub fn current_branch(ctx: &mut TaskContext<'_>) -> dev_exec::Result<String> {
    let result = ctx.run("git branch --show-current", RunOptions::probe())?;
    Ok(result.output.unwrap_or_default())
}

/// Make GitHub HTTPS URLs go over SSH.
pub fn setup_config(ctx: &mut TaskContext<'_>) -> dev_exec::Result<()> {
    ctx.run(
        r#"git config --global url."git@github.com:".insteadOf "https://github.com/""#,
        RunOptions::probe(),
    )?;
    Ok(())
}
