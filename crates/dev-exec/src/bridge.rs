//! Directives for the parent shell.
//!
//! A child process cannot change its parent shell's working directory, so
//! commands such as `cd <repo>` are queued here during the run and written,
//! once, to a descriptor that the shell wrapper installed before starting
//! the CLI. The wrapper evaluates each line after the CLI exits.
//!
//! Wire format: every queued command followed by `\n`, in queue order, then
//! a single NUL byte.

use std::fs::File;
use std::io::Write;
use std::os::fd::{BorrowedFd, RawFd};

use tracing::{debug, trace};

/// Environment variable naming the bridge descriptor.
pub const SHELL_FD_ENV: &str = "SHELL_FD";

/// Descriptor used when `SHELL_FD` is unset or not a number.
pub const DEFAULT_SHELL_FD: RawFd = 101;

/// Ordered queue of shell directives.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ShellBridge {
    queue: Vec<String>,
}

impl ShellBridge {
    /// Creates an empty bridge.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a directive. No validation is performed.
    pub fn enqueue(&mut self, command: impl Into<String>) {
        let command = command.into();
        trace!(command = %command, "queued shell directive");
        self.queue.push(command);
    }

    /// Queued directives in order.
    pub fn commands(&self) -> &[String] {
        &self.queue
    }

    /// Number of queued directives.
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Returns true if nothing is queued.
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Write the queue to the descriptor named by `SHELL_FD`.
    ///
    /// Consumes the bridge, so a queue is flushed at most once. Failure to
    /// open or write the descriptor is silent.
    pub fn flush(self) {
        let fd = shell_fd();
        self.flush_to(fd);
    }

    /// Write the queue to `fd`. Returns whether the channel was written.
    pub fn flush_to(self, fd: RawFd) -> bool {
        let Some(mut channel) = open_channel(fd) else {
            debug!(fd, queued = self.queue.len(), "shell bridge descriptor not open, dropping directives");
            return false;
        };

        match write_directives(&mut channel, &self.queue) {
            Ok(()) => {
                debug!(fd, queued = self.queue.len(), "flushed shell directives");
                true
            }
            Err(e) => {
                debug!(fd, error = %e, "failed to write shell directives");
                false
            }
        }
    }
}

fn shell_fd() -> RawFd {
    std::env::var(SHELL_FD_ENV)
        .ok()
        .and_then(|value| value.trim().parse().ok())
        .unwrap_or(DEFAULT_SHELL_FD)
}

/// Duplicate `fd` into an owned file if it refers to an open descriptor.
fn open_channel(fd: RawFd) -> Option<File> {
    // SAFETY: F_GETFD only inspects the descriptor table.
    if unsafe { libc::fcntl(fd, libc::F_GETFD) } < 0 {
        return None;
    }

    // SAFETY: `fd` was just checked to be open, and it is only borrowed for
    // the duplication below.
    let borrowed = unsafe { BorrowedFd::borrow_raw(fd) };
    borrowed.try_clone_to_owned().ok().map(File::from)
}

fn write_directives(channel: &mut File, queue: &[String]) -> std::io::Result<()> {
    for command in queue {
        channel.write_all(command.as_bytes())?;
        channel.write_all(b"\n")?;
    }
    channel.write_all(b"\0")?;
    channel.flush()
}
