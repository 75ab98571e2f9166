//! Error types for configuration loading and command resolution.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading a Devfile.
///
/// All of them are fatal before any task runs.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The file exists but could not be read.
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid YAML.
    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// The YAML does not describe a valid Devfile.
    #[error("Failed to validate {path}: {message}")]
    Invalid { path: PathBuf, message: String },

    /// A task definition has an unsupported shape.
    #[error("{0}")]
    Definition(String),
}

/// Result type alias for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Errors raised while resolving a command name into a plan.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// Neither a custom command, a reserved command nor an internal task.
    #[error("Could not find command {0}")]
    CommandNotFound(String),
}
