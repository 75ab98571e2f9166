//! Embeds `DEV_COMMIT` and `DEV_BUILD_DATE` for `dev-bare --version`.
//!
//! `dev update` installs from a shallow checkout, so the commit comes from
//! `git describe`; a `DEV_COMMIT` set in the build environment wins, for
//! builds outside a checkout.

use std::process::Command;

fn describe_head() -> Option<String> {
    let output = Command::new("git")
        .args(["describe", "--always", "--dirty", "--abbrev=8"])
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    let commit = String::from_utf8(output.stdout).ok()?;
    Some(commit.trim().to_string()).filter(|c| !c.is_empty())
}

fn main() {
    let commit = std::env::var("DEV_COMMIT")
        .ok()
        .filter(|c| !c.is_empty())
        .or_else(describe_head)
        .unwrap_or_else(|| "unknown".to_string());

    println!("cargo:rustc-env=DEV_COMMIT={}", commit);
    println!(
        "cargo:rustc-env=DEV_BUILD_DATE={}",
        chrono::Utc::now().date_naive()
    );

    println!("cargo:rerun-if-env-changed=DEV_COMMIT");
    println!("cargo:rerun-if-changed=../../.git/HEAD");
}
