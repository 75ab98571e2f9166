//! Well-known locations and the environment variables that override them.
//!
//! # Environment Variables
//!
//! - `DEVFILE`: Devfile to load (default `Devfile`)
//! - `DEV_SRC_DIR`: root of cloned repositories (default `~/src`)
//! - `DEV_INSTALL_DIR`: checkout used by `update` (default `/opt/dev`)
//!
//! Overrides may start with `~`.

use std::path::PathBuf;

/// Environment variable naming the Devfile.
pub const DEVFILE_ENV: &str = "DEVFILE";

/// Environment variable for the repository root.
pub const SRC_DIR_ENV: &str = "DEV_SRC_DIR";

/// Environment variable for the install checkout.
pub const INSTALL_DIR_ENV: &str = "DEV_INSTALL_DIR";

/// Devfile name looked up in the working directory.
pub const DEFAULT_DEVFILE: &str = "Devfile";

const DEFAULT_SRC_SUBDIR: &str = "src";
const DEFAULT_INSTALL_DIR: &str = "/opt/dev";

/// Root under which repositories are cloned and searched.
///
/// `DEV_SRC_DIR` if set, otherwise `~/src`, otherwise `src` in the current
/// directory.
pub fn src_dir() -> PathBuf {
    dir_from_env(SRC_DIR_ENV).unwrap_or_else(|| {
        dirs::home_dir()
            .map(|home| home.join(DEFAULT_SRC_SUBDIR))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SRC_SUBDIR))
    })
}

/// Checkout that `update` refreshes and reinstalls from.
pub fn install_dir() -> PathBuf {
    dir_from_env(INSTALL_DIR_ENV).unwrap_or_else(|| PathBuf::from(DEFAULT_INSTALL_DIR))
}

/// Expand a leading `~` in `path`.
pub fn expand(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).to_string())
}

fn dir_from_env(var: &str) -> Option<PathBuf> {
    std::env::var(var)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .map(|value| expand(&value))
}
