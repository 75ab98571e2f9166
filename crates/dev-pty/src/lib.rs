//! Pseudo-terminal sessions for interactive child processes.
//!
//! This crate runs a command on a freshly allocated pseudo-terminal so that
//! programs which insist on a terminal (editors, pagers, password prompts)
//! behave as if launched directly by the user, while the caller still sees
//! every byte the child prints.
//!
//! # Overview
//!
//! - [`spawn`]: resolve, fork, exec and copy I/O until the child exits
//! - [`fork`]: the lower-level fork onto a pty, for callers that exec themselves
//! - [`PtySession`]: parent-side handle with the copy loop and wait
//! - [`RawModeGuard`]: raw-mode stdin for the duration of a session
//! - [`waitstatus_to_exitcode`], [`exitstatus_to_exitcode`]: shell-style
//!   exit code decoding
//!
//! # Example
//!
//! ```no_run
//! use std::collections::BTreeMap;
//!
//! let env: BTreeMap<String, String> = std::env::vars().collect();
//! let argv = vec!["bash".to_string(), "-c".to_string(), "vim notes.md".to_string()];
//!
//! let mut seen = Vec::new();
//! let code = dev_pty::spawn(&argv, &env, |chunk| {
//!     seen.extend_from_slice(chunk);
//!     Ok(())
//! })?;
//! println!("vim exited with {}", code);
//! # Ok::<(), dev_pty::PtyError>(())
//! ```

pub mod error;
pub mod session;
pub mod status;
pub mod terminal;

pub use error::{PtyError, Result};
pub use session::{fork, spawn, Forked, PtySession, CHUNK_SIZE};
pub use status::{exitstatus_to_exitcode, waitstatus_to_exitcode};
pub use terminal::RawModeGuard;
