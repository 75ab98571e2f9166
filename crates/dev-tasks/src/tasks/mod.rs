//! Built-in tasks.
//!
//! Project tasks are referenced from the Devfile:
//!
//! | Task  | Arguments                                            |
//! |-------|------------------------------------------------------|
//! | `run` | command, list of commands, or `{command, env, if}`   |
//! | `env` | `{NAME: value}`                                      |
//! | `pip` | nothing, a requirement file or package, or a list    |
//!
//! Internal tasks are pseudo-commands (`dev cd shop`) and receive the
//! pass-through arguments as a list.

mod cd;
mod clone;
mod env;
mod init;
mod open;
mod pip;
mod run;
mod update;

pub use cd::Cd;
pub use clone::CloneRepo;
pub use env::Env;
pub use init::{render_init_script, Init, SUPPORTED_SHELLS};
pub use open::Open;
pub use pip::Pip;
pub use run::Run;
pub use update::Update;

use crate::error::TaskError;

/// Require exactly one positional argument for an internal task.
fn single_arg(args: Vec<String>, usage: &str) -> Result<String, TaskError> {
    let mut args = args.into_iter();
    match (args.next(), args.next()) {
        (Some(arg), None) => Ok(arg),
        _ => Err(TaskError::failed(format!("Usage: {}", usage))),
    }
}
