//! Wait-status decoding.

use std::os::unix::process::ExitStatusExt;
use std::process::ExitStatus;

use nix::sys::wait::WaitStatus;
use nix::unistd::Pid;

/// Convert a blocking wait result into a shell-style exit code.
///
/// A normal exit yields the exit code as-is and a signal termination yields
/// the negated signal number. Any other status cannot be produced by a
/// blocking `waitpid` without `WUNTRACED`/`WCONTINUED`, so it is treated as
/// a programming error.
///
/// # Panics
///
/// Panics on any status other than `Exited` or `Signaled`.
pub fn waitstatus_to_exitcode(status: WaitStatus) -> i32 {
    match status {
        WaitStatus::Exited(_, code) => code,
        WaitStatus::Signaled(_, signal, _) => -(signal as i32),
        other => panic!("invalid wait status: {:?}", other),
    }
}

/// [`waitstatus_to_exitcode`] for a status reported by `std::process`.
///
/// # Panics
///
/// Panics on any status other than a normal exit or a signal termination.
pub fn exitstatus_to_exitcode(status: ExitStatus) -> i32 {
    let raw = status.into_raw();
    match WaitStatus::from_raw(Pid::from_raw(0), raw) {
        Ok(decoded) => waitstatus_to_exitcode(decoded),
        Err(e) => panic!("invalid wait status: {:#x} ({})", raw, e),
    }
}
