//! Devfile loading and command resolution for dev.
//!
//! This crate turns the project's `Devfile` into typed task invocations and
//! resolves a command name from the command line into a
//! [`DirectionedPlan`]: the ordered invocations to run, tagged with whether
//! each task's up or down handler applies.
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use dev_config::{resolve_command, Devfile};
//!
//! let devfile = Devfile::load(Path::new("Devfile"))?;
//! let plan = resolve_command(&devfile, "down", &[], |name| name == "cd")?;
//!
//! for (direction, invocation) in plan.steps() {
//!     println!("{} {}", direction, invocation);
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod devfile;
pub mod error;
pub mod invocation;
pub mod parse;
pub mod paths;
pub mod resolver;

pub use devfile::{CommandDefinition, Devfile, UNKNOWN_PROJECT};
pub use error::{ConfigError, ResolveError, Result};
pub use invocation::{Direction, DirectionedPlan, InvocationList, TaskInvocation};
pub use parse::{parse, parse_command, DEFAULT_TASK};
pub use resolver::{is_reserved, resolve_command, RESERVED_COMMANDS};
