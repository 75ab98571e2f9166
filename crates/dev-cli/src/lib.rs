//! Command-line driver for dev.
//!
//! `dev-bare` is normally invoked through the `dev` shell function printed
//! by `dev-bare init <shell>`; the function evaluates the directives the
//! binary writes to the shell bridge once it exits.

pub mod cli;
pub mod driver;
pub mod help;

pub use cli::{Cli, OutputFormat};
pub use driver::{bare_warning, Driver, Outcome};
