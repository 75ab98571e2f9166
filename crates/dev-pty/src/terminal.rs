//! Terminal mode save/restore for the controlling stdin.

use std::os::fd::{AsFd, BorrowedFd};

use nix::sys::termios::{self, SetArg, Termios};
use tracing::{debug, trace};

/// Holds stdin in raw mode and restores the saved mode on drop.
///
/// Dropping the guard is the only way back to the original mode, so the
/// terminal is restored on every exit path of the copy loop, including
/// early returns and unwinding.
pub struct RawModeGuard<'fd> {
    fd: BorrowedFd<'fd>,
    saved: Termios,
}

impl<'fd> RawModeGuard<'fd> {
    /// Switch `fd` to raw mode.
    ///
    /// Returns `None` when `fd` is not a terminal or the mode cannot be
    /// changed; callers carry on without raw mode in that case.
    pub fn enter(fd: BorrowedFd<'fd>) -> Option<Self> {
        let saved = match termios::tcgetattr(fd) {
            Ok(saved) => saved,
            Err(e) => {
                trace!(error = %e, "stdin is not a terminal, skipping raw mode");
                return None;
            }
        };

        let mut raw = saved.clone();
        termios::cfmakeraw(&mut raw);
        if let Err(e) = termios::tcsetattr(fd, SetArg::TCSAFLUSH, &raw) {
            debug!(error = %e, "failed to switch stdin to raw mode");
            return None;
        }

        trace!("stdin switched to raw mode");
        Some(Self { fd, saved })
    }
}

impl Drop for RawModeGuard<'_> {
    fn drop(&mut self) {
        if let Err(e) = termios::tcsetattr(self.fd.as_fd(), SetArg::TCSAFLUSH, &self.saved) {
            debug!(error = %e, "failed to restore terminal mode");
        } else {
            trace!("terminal mode restored");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nix::pty::openpty;

    #[test]
    fn test_enter_on_non_terminal_is_none() {
        let (read, _write) = nix::unistd::pipe().unwrap();
        assert!(RawModeGuard::enter(read.as_fd()).is_none());
    }

    #[test]
    fn test_raw_mode_restored_on_drop() {
        let pty = openpty(None, None).unwrap();
        let before = termios::tcgetattr(pty.slave.as_fd()).unwrap();

        {
            let guard = RawModeGuard::enter(pty.slave.as_fd());
            assert!(guard.is_some());
            let during = termios::tcgetattr(pty.slave.as_fd()).unwrap();
            assert_ne!(during.local_flags, before.local_flags);
        }

        let after = termios::tcgetattr(pty.slave.as_fd()).unwrap();
        assert_eq!(after.local_flags, before.local_flags);
        assert_eq!(after.input_flags, before.input_flags);
    }
}
