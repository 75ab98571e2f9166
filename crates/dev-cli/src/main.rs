//! dev-bare entry point.

use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

use dev_cli::{Cli, Driver};
use dev_exec::{CommandExecutor, ExecutionContext, FlushGuard};

fn main() {
    // Before the execution context snapshots the environment.
    let _ = dotenvy::from_filename(".env.local");

    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cli.log_level().to_string()));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let shell = CommandExecutor::new();
    // Flushes the shell bridge on every way out of this scope, panics included.
    let mut exec = FlushGuard::new(ExecutionContext::new());

    let outcome = Driver::new(&shell).run(&cli, &mut exec);
    tracing::debug!(?outcome, "invocation finished");

    drop(exec);
    std::process::exit(outcome.exit_code());
}
