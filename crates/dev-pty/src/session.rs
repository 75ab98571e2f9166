//! Fork a child onto a pseudo-terminal and shuttle bytes until it exits.
//!
//! The flow for one interactive command is:
//!
//! ```text
//! fork()  ──► copy_io()  ──► (raw mode restored) ──► wait()
//!  │            │
//!  │            ├── master ──► stdout + on_master_read
//!  │            └── stdin  ──► master
//!  └── child: setsid, slave on 0/1/2, controlling tty, execve
//! ```

use std::collections::BTreeMap;
use std::ffi::{CStr, CString};
use std::io::{self, Write};
use std::os::fd::{AsFd, BorrowedFd, IntoRawFd, OwnedFd};
use std::os::raw::c_char;
use std::os::unix::ffi::OsStringExt;
use std::path::PathBuf;

use nix::errno::Errno;
use nix::poll::{poll, PollFd, PollFlags, PollTimeout};
use nix::pty::openpty;
use nix::sys::wait::waitpid;
use nix::unistd::{self, ForkResult, Pid};
use tracing::{debug, trace};

use crate::status::waitstatus_to_exitcode;
use crate::terminal::RawModeGuard;
use crate::{PtyError, Result};

/// Bytes moved per read on either side of the copy loop.
pub const CHUNK_SIZE: usize = 1024;

/// Exit code used by the child when exec fails.
const EXEC_FAILED: i32 = 127;

/// Outcome of [`fork`], seen from each side.
#[derive(Debug)]
pub enum Forked {
    /// Running in the child, already a session leader with the pty slave
    /// as its controlling terminal and standard streams.
    Child,
    /// Running in the parent.
    Parent(PtySession),
}

/// Parent-side handle on a child running behind a pty master.
#[derive(Debug)]
pub struct PtySession {
    pid: Pid,
    master: OwnedFd,
}

/// Allocate a pty pair and fork.
///
/// In the child a new session is started, the slave is bound to standard
/// input, output and error, and the slave device is opened explicitly so it
/// becomes the controlling terminal. The parent gets the child pid and the
/// master descriptor.
///
/// # Safety
///
/// The usual `fork(2)` contract for a possibly multi-threaded process: on the
/// [`Forked::Child`] branch only async-signal-safe functions may be called
/// until the child execs or calls `_exit`.
pub unsafe fn fork() -> Result<Forked> {
    let pty = openpty(None, None).map_err(PtyError::Allocate)?;

    // Resolved before forking so the child does not allocate.
    let slave_path = unistd::ttyname(pty.slave.as_fd())
        .ok()
        .and_then(|path| CString::new(path.into_os_string().into_vec()).ok());

    match unsafe { unistd::fork() }.map_err(PtyError::Fork)? {
        ForkResult::Child => {
            unsafe { become_session_leader(pty.master, pty.slave, slave_path.as_deref()) };
            Ok(Forked::Child)
        }
        ForkResult::Parent { child } => {
            drop(pty.slave);
            Ok(Forked::Parent(PtySession {
                pid: child,
                master: pty.master,
            }))
        }
    }
}

/// Child-side session setup. Exits the child on failure.
///
/// # Safety
///
/// Must only be called in a freshly forked child.
unsafe fn become_session_leader(master: OwnedFd, slave: OwnedFd, slave_path: Option<&CStr>) {
    drop(master);

    unsafe {
        if libc::setsid() < 0 {
            libc::_exit(1);
        }

        let slave_fd = slave.into_raw_fd();
        for target in [libc::STDIN_FILENO, libc::STDOUT_FILENO, libc::STDERR_FILENO] {
            if libc::dup2(slave_fd, target) < 0 {
                libc::_exit(1);
            }
        }
        if slave_fd > libc::STDERR_FILENO {
            libc::close(slave_fd);
        }

        // BSDs only attach a controlling terminal through TIOCSCTTY; Linux
        // also attaches one on open. Both are best effort.
        libc::ioctl(libc::STDIN_FILENO, libc::TIOCSCTTY as _, 0);
        if let Some(path) = slave_path {
            let tty = libc::open(path.as_ptr(), libc::O_RDWR);
            if tty >= 0 {
                libc::close(tty);
            }
        }
    }
}

impl PtySession {
    /// Child process id.
    pub fn pid(&self) -> Pid {
        self.pid
    }

    /// Copy pty master output to stdout and `stdin` to the master.
    ///
    /// Blocks on readiness of both descriptors with no timeout. Returns once
    /// the master reports EOF or an error, which means the child has exited
    /// or detached from the terminal. EOF, an error or a closed descriptor on
    /// `stdin` only stops forwarding input. An error from `on_master_read`
    /// ends the loop with that error.
    pub fn copy_io<F>(&mut self, stdin: BorrowedFd<'_>, on_master_read: &mut F) -> Result<()>
    where
        F: FnMut(&[u8]) -> io::Result<()>,
    {
        let mut buf = [0u8; CHUNK_SIZE];
        let mut watch_stdin = true;
        let mut stdout = io::stdout();

        loop {
            let (master_ready, stdin_ready) = {
                let mut fds = vec![PollFd::new(self.master.as_fd(), PollFlags::POLLIN)];
                if watch_stdin {
                    fds.push(PollFd::new(stdin, PollFlags::POLLIN));
                }

                match poll(&mut fds, PollTimeout::NONE) {
                    Ok(_) => {}
                    Err(Errno::EINTR) => continue,
                    Err(e) => return Err(PtyError::Poll(e)),
                }

                (
                    readiness(fds[0].revents()),
                    fds.get(1).map_or(Readiness::Idle, |fd| readiness(fd.revents())),
                )
            };

            if master_ready == Readiness::Closed {
                trace!(pid = %self.pid, "pty master descriptor invalid, treating as EOF");
                return Ok(());
            }

            if master_ready == Readiness::Readable {
                let n = match unistd::read(&self.master, &mut buf) {
                    Ok(n) => n,
                    Err(Errno::EINTR) => continue,
                    // Linux reports EIO once the slave side is gone.
                    Err(e) => {
                        trace!(pid = %self.pid, error = %e, "master read failed, treating as EOF");
                        0
                    }
                };
                if n == 0 {
                    trace!(pid = %self.pid, "pty master reached EOF");
                    return Ok(());
                }

                stdout.write_all(&buf[..n])?;
                stdout.flush()?;
                on_master_read(&buf[..n])?;
            }

            if stdin_ready == Readiness::Closed {
                debug!("stdin is not an open descriptor, no longer forwarding input");
                watch_stdin = false;
            } else if stdin_ready == Readiness::Readable {
                match unistd::read(stdin, &mut buf) {
                    Ok(0) => {
                        trace!("stdin reached EOF, no longer forwarding input");
                        watch_stdin = false;
                    }
                    Ok(n) => write_all(self.master.as_fd(), &buf[..n])?,
                    Err(Errno::EINTR) => {}
                    Err(e) => {
                        debug!(error = %e, "stdin read failed, no longer forwarding input");
                        watch_stdin = false;
                    }
                }
            }
        }
    }

    /// Close the master and block until the child terminates.
    ///
    /// Returns the decoded exit code: the exit status for a normal exit, the
    /// negated signal number for a signal termination.
    pub fn wait(self) -> Result<i32> {
        let PtySession { pid, master } = self;
        drop(master);

        loop {
            match waitpid(pid, None) {
                Ok(status) => {
                    trace!(pid = %pid, status = ?status, "pty child reaped");
                    return Ok(waitstatus_to_exitcode(status));
                }
                Err(Errno::EINTR) => continue,
                Err(source) => {
                    return Err(PtyError::Wait {
                        pid: pid.as_raw(),
                        source,
                    })
                }
            }
        }
    }
}

/// Run `argv` on a fresh pty with exactly `env` as its environment.
///
/// `argv[0]` is looked up on the `PATH` found in `env`; no shell expansion
/// happens beyond what the caller embedded in the arguments. While the child
/// runs, a terminal stdin is held in raw mode and everything the child
/// writes is echoed to stdout and handed to `on_master_read`.
///
/// Returns the decoded exit code of the child. The child is reaped even
/// when copying fails; the copy error is then returned as
/// [`PtyError::Copy`] together with the exit code.
pub fn spawn<F>(argv: &[String], env: &BTreeMap<String, String>, mut on_master_read: F) -> Result<i32>
where
    F: FnMut(&[u8]) -> io::Result<()>,
{
    let image = ExecImage::new(argv, env)?;
    let argv_ptrs = null_terminated(&image.argv);
    let envp_ptrs = null_terminated(&image.envp);

    // SAFETY: the child branch only calls execve and _exit on memory that
    // was fully prepared above.
    match unsafe { fork() }? {
        Forked::Child => unsafe {
            libc::execve(image.path.as_ptr(), argv_ptrs.as_ptr(), envp_ptrs.as_ptr());
            libc::_exit(EXEC_FAILED)
        },
        Forked::Parent(mut session) => {
            debug!(pid = %session.pid(), program = %image.program, "spawned pty child");

            let stdin = io::stdin();
            let copied = {
                let _raw = RawModeGuard::enter(stdin.as_fd());
                session.copy_io(stdin.as_fd(), &mut on_master_read)
            };

            let code = session.wait()?;
            debug!(program = %image.program, code, "pty child exited");

            match copied {
                Ok(()) => Ok(code),
                Err(e) => Err(PtyError::Copy {
                    code,
                    source: Box::new(e),
                }),
            }
        }
    }
}

/// Everything execve needs, converted before forking.
struct ExecImage {
    program: String,
    path: CString,
    argv: Vec<CString>,
    envp: Vec<CString>,
}

impl ExecImage {
    fn new(argv: &[String], env: &BTreeMap<String, String>) -> Result<Self> {
        let program = argv
            .first()
            .ok_or_else(|| PtyError::InvalidCommand("empty argv".to_string()))?
            .clone();

        let resolved = resolve_program(&program, env.get("PATH").map(String::as_str))?;
        let path = CString::new(resolved.into_os_string().into_vec())
            .map_err(|_| PtyError::InvalidCommand("program path contains a nul byte".to_string()))?;

        let argv = argv
            .iter()
            .map(|arg| {
                CString::new(arg.as_bytes())
                    .map_err(|_| PtyError::InvalidCommand("argument contains a nul byte".to_string()))
            })
            .collect::<Result<Vec<_>>>()?;

        let envp = env
            .iter()
            .map(|(key, value)| {
                CString::new(format!("{}={}", key, value)).map_err(|_| {
                    PtyError::InvalidCommand(format!("environment entry '{}' contains a nul byte", key))
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            program,
            path,
            argv,
            envp,
        })
    }
}

fn resolve_program(program: &str, search_path: Option<&str>) -> Result<PathBuf> {
    if program.contains('/') {
        return Ok(PathBuf::from(program));
    }

    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    which::which_in(program, search_path, cwd)
        .map_err(|_| PtyError::ProgramNotFound(program.to_string()))
}

fn null_terminated(strings: &[CString]) -> Vec<*const c_char> {
    strings
        .iter()
        .map(|s| s.as_ptr())
        .chain(std::iter::once(std::ptr::null()))
        .collect()
}

/// What `poll` reported for one descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Readiness {
    Idle,
    Readable,
    /// `POLLNVAL`: the descriptor is not open.
    Closed,
}

fn readiness(revents: Option<PollFlags>) -> Readiness {
    match revents {
        Some(r) if r.contains(PollFlags::POLLNVAL) => Readiness::Closed,
        Some(r) if r.intersects(PollFlags::POLLIN | PollFlags::POLLHUP | PollFlags::POLLERR) => {
            Readiness::Readable
        }
        _ => Readiness::Idle,
    }
}

/// Write all of `data`, retrying short writes.
fn write_all(fd: BorrowedFd<'_>, mut data: &[u8]) -> Result<()> {
    while !data.is_empty() {
        match unistd::write(fd, data) {
            Ok(n) => data = &data[n..],
            Err(Errno::EINTR) => continue,
            Err(e) => return Err(io::Error::from(e).into()),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_env() -> BTreeMap<String, String> {
        let mut env = BTreeMap::new();
        env.insert(
            "PATH".to_string(),
            std::env::var("PATH").unwrap_or_else(|_| "/usr/bin:/bin".to_string()),
        );
        env
    }

    fn sh(script: &str) -> Vec<String> {
        vec!["sh".to_string(), "-c".to_string(), script.to_string()]
    }

    #[test]
    fn test_spawn_returns_exit_code() {
        let code = spawn(&sh("exit 3"), &test_env(), |_| Ok(())).unwrap();
        assert_eq!(code, 3);
    }

    #[test]
    fn test_spawn_success() {
        let code = spawn(&sh("true"), &test_env(), |_| Ok(())).unwrap();
        assert_eq!(code, 0);
    }

    #[test]
    fn test_spawn_captures_master_output() {
        let mut captured = Vec::new();
        let code = spawn(&sh("printf hello"), &test_env(), |chunk| {
            captured.extend_from_slice(chunk);
            Ok(())
        })
        .unwrap();

        assert_eq!(code, 0);
        assert_eq!(String::from_utf8_lossy(&captured), "hello");
    }

    #[test]
    fn test_spawn_child_sees_terminal() {
        let mut captured = Vec::new();
        spawn(&sh("test -t 0 && test -t 1 && printf tty"), &test_env(), |chunk| {
            captured.extend_from_slice(chunk);
            Ok(())
        })
        .unwrap();

        assert_eq!(String::from_utf8_lossy(&captured), "tty");
    }

    #[test]
    fn test_spawn_uses_given_environment() {
        let mut env = test_env();
        env.insert("DEV_PTY_TEST".to_string(), "from-overlay".to_string());

        let mut captured = Vec::new();
        spawn(&sh("printf %s \"$DEV_PTY_TEST\""), &env, |chunk| {
            captured.extend_from_slice(chunk);
            Ok(())
        })
        .unwrap();

        assert_eq!(String::from_utf8_lossy(&captured), "from-overlay");
    }

    #[test]
    fn test_spawn_signal_is_negated() {
        let code = spawn(&sh("kill -TERM $$"), &test_env(), |_| Ok(())).unwrap();
        assert_eq!(code, -15);
    }

    #[test]
    fn test_spawn_missing_program() {
        let argv = vec!["dev-pty-no-such-program".to_string()];
        let result = spawn(&argv, &test_env(), |_| Ok(()));
        assert!(matches!(result, Err(PtyError::ProgramNotFound(name)) if name == "dev-pty-no-such-program"));
    }

    #[test]
    fn test_spawn_empty_argv() {
        let result = spawn(&[], &test_env(), |_| Ok(()));
        assert!(matches!(result, Err(PtyError::InvalidCommand(_))));
    }

    #[test]
    fn test_resolve_program_with_slash_is_kept() {
        let path = resolve_program("/bin/sh", None).unwrap();
        assert_eq!(path, PathBuf::from("/bin/sh"));
    }

    #[test]
    fn test_write_all_to_pipe() {
        let (read, write) = unistd::pipe().unwrap();
        write_all(write.as_fd(), b"abc").unwrap();
        drop(write);

        let mut buf = [0u8; 8];
        let n = unistd::read(&read, &mut buf).unwrap();
        assert_eq!(&buf[..n], b"abc");
    }

    #[test]
    fn test_failed_copy_still_reaps_child() {
        let result = spawn(&sh("trap '' HUP; printf hello; exit 4"), &test_env(), |_| {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "sink closed"))
        });

        match result {
            Err(PtyError::Copy { code, source }) => {
                assert_eq!(code, 4);
                assert!(matches!(*source, PtyError::Io(ref e) if e.kind() == io::ErrorKind::BrokenPipe));
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_closed_descriptor_is_not_readable() {
        assert_eq!(readiness(Some(PollFlags::POLLNVAL)), Readiness::Closed);
        assert_eq!(
            readiness(Some(PollFlags::POLLNVAL | PollFlags::POLLIN)),
            Readiness::Closed
        );
    }

    #[test]
    fn test_readiness_flags() {
        assert_eq!(readiness(Some(PollFlags::POLLIN)), Readiness::Readable);
        assert_eq!(readiness(Some(PollFlags::POLLHUP)), Readiness::Readable);
        assert_eq!(readiness(Some(PollFlags::POLLERR)), Readiness::Readable);
        assert_eq!(readiness(Some(PollFlags::empty())), Readiness::Idle);
        assert_eq!(readiness(None), Readiness::Idle);
    }
}
