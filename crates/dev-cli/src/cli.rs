//! Command-line interface definition using clap.

use std::path::PathBuf;

use clap::Parser;

use dev_config::paths::{DEFAULT_DEVFILE, DEVFILE_ENV};

/// `<version> (<commit> <build date>)`, e.g. `0.4.0 (a1b2c3d4 2026-10-16)`.
pub const VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("DEV_COMMIT"),
    " ",
    env!("DEV_BUILD_DATE"),
    ")"
);

/// dev - set up, tear down and work with your project's local environment
#[derive(Parser, Debug)]
#[command(name = "dev-bare")]
#[command(author, version = VERSION, about, long_about = None)]
pub struct Cli {
    /// Command to run: up, down, an internal command or a Devfile command
    pub command: Option<String>,

    /// Arguments passed through to the command
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub extra_args: Vec<String>,

    /// List all commands
    #[arg(short, long)]
    pub commands: bool,

    /// List all tasks
    #[arg(short, long)]
    pub tasks: bool,

    /// Output format for listings
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,

    /// Path to the Devfile
    #[arg(short, long, env = DEVFILE_ENV, default_value = DEFAULT_DEVFILE)]
    pub file: PathBuf,

    /// Enable verbose output (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// Output format for listings
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Table,
    Brief,
    Json,
}

impl Cli {
    /// Returns the log level based on verbosity.
    pub fn log_level(&self) -> tracing::Level {
        match self.verbose {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        }
    }
}
