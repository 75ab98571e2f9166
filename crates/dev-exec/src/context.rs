//! Per-invocation execution state.

use std::collections::BTreeMap;
use std::ops::{Deref, DerefMut};
use std::os::fd::RawFd;

use tracing::trace;

use crate::bridge::ShellBridge;

/// State shared by every task of one CLI invocation.
///
/// Holds the environment handed to every subprocess (seeded from the
/// process environment, then extended by tasks) and the queue of
/// directives for the parent shell.
#[derive(Debug, Default, Clone)]
pub struct ExecutionContext {
    env: BTreeMap<String, String>,
    bridge: ShellBridge,
}

impl ExecutionContext {
    /// Creates a context seeded from the current process environment.
    ///
    /// Variables whose name or value is not valid UTF-8 are skipped.
    pub fn new() -> Self {
        let env = std::env::vars_os()
            .filter_map(|(key, value)| Some((key.into_string().ok()?, value.into_string().ok()?)))
            .collect();
        Self::from_env(env)
    }

    /// Creates a context with an explicit base environment.
    pub fn from_env(env: BTreeMap<String, String>) -> Self {
        Self {
            env,
            bridge: ShellBridge::new(),
        }
    }

    /// The environment passed to subprocesses.
    pub fn env(&self) -> &BTreeMap<String, String> {
        &self.env
    }

    /// Look up one variable.
    pub fn var(&self, key: &str) -> Option<&str> {
        self.env.get(key).map(String::as_str)
    }

    /// Add or override variables for the rest of the invocation.
    pub fn merge_env<I, K, V>(&mut self, vars: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (key, value) in vars {
            let key = key.into();
            trace!(key = %key, "environment override");
            self.env.insert(key, value.into());
        }
    }

    /// Remove variables. Missing keys are ignored.
    pub fn unset_env<I, K>(&mut self, keys: I)
    where
        I: IntoIterator<Item = K>,
        K: AsRef<str>,
    {
        for key in keys {
            if self.env.remove(key.as_ref()).is_some() {
                trace!(key = key.as_ref(), "environment variable removed");
            }
        }
    }

    /// The parent-shell directive queue.
    pub fn bridge(&self) -> &ShellBridge {
        &self.bridge
    }

    /// Mutable access to the directive queue.
    pub fn bridge_mut(&mut self) -> &mut ShellBridge {
        &mut self.bridge
    }

    /// Consume the context, keeping only the directive queue for flushing.
    pub fn into_bridge(self) -> ShellBridge {
        self.bridge
    }
}

/// Owns the invocation's [`ExecutionContext`] and flushes its bridge when
/// dropped, including while unwinding from a panic.
///
/// `std::process::exit` skips destructors; drop the guard before exiting.
#[derive(Debug)]
pub struct FlushGuard {
    ctx: ExecutionContext,
    fd: Option<RawFd>,
}

impl FlushGuard {
    /// Flushes to the descriptor named by `SHELL_FD`.
    pub fn new(ctx: ExecutionContext) -> Self {
        Self { ctx, fd: None }
    }

    /// Flushes to `fd` instead.
    pub fn with_fd(ctx: ExecutionContext, fd: RawFd) -> Self {
        Self { ctx, fd: Some(fd) }
    }
}

impl Deref for FlushGuard {
    type Target = ExecutionContext;

    fn deref(&self) -> &ExecutionContext {
        &self.ctx
    }
}

impl DerefMut for FlushGuard {
    fn deref_mut(&mut self) -> &mut ExecutionContext {
        &mut self.ctx
    }
}

impl Drop for FlushGuard {
    fn drop(&mut self) {
        if std::thread::panicking() {
            trace!("flushing shell bridge while unwinding");
        }
        let bridge = std::mem::take(&mut self.ctx).into_bridge();
        match self.fd {
            Some(fd) => {
                bridge.flush_to(fd);
            }
            None => bridge.flush(),
        }
    }
}
