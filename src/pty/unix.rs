//! Unix PTY implementation
//!
//! POSIX PTY pair plus fork/exec of the child. The master stays in blocking
//! mode on purpose: the session reader thread parks in `read` and wakes when
//! output arrives or the slave side goes away, so child exit (including a
//! forced kill) unblocks the reader without any extra signaling.

use std::ffi::CString;
use std::os::fd::BorrowedFd;
use std::os::unix::io::{AsRawFd, RawFd};
use std::sync::Mutex;

use nix::fcntl::{open, OFlag};
use nix::libc::{self, STDERR_FILENO, STDIN_FILENO, STDOUT_FILENO};
use nix::poll::{poll, PollFd, PollFlags};
use nix::pty::{grantpt, posix_openpt, ptsname, unlockpt, PtyMaster};
use nix::sys::signal::{kill, Signal};
use nix::sys::stat::Mode;
use nix::sys::wait::{waitpid, WaitPidFlag, WaitStatus};
use nix::unistd::{close, dup2, execvpe, fork, read, setsid, write, ForkResult, Pid};

use super::{ExitStatus, PtyError, PtyResult, WindowSize};

/// A pseudoterminal master with a child process on the slave side.
///
/// Shared between the session's reader thread (reads) and the render side
/// (writes, resize, kill), so child bookkeeping lives behind a mutex rather
/// than `&mut`. Once reaped, the child's real exit status is cached so
/// later `wait`/`kill` calls keep reporting it.
pub struct Pty {
    master: PtyMaster,
    child: Pid,
    status: Mutex<Option<ExitStatus>>,
}

impl Pty {
    /// Open a PTY pair, fork, and exec `command` with `args` on the slave.
    ///
    /// The child gets a fresh session with the slave as its controlling
    /// terminal and the slave duplicated onto stdin, stdout, and stderr. The
    /// environment is inherited, with `TERM` set for the escape sequences
    /// the parser understands.
    pub fn spawn(command: &str, args: &[&str], size: WindowSize) -> PtyResult<Self> {
        let master = posix_openpt(OFlag::O_RDWR | OFlag::O_NOCTTY).map_err(PtyError::OpenMaster)?;
        grantpt(&master).map_err(PtyError::PreparePty)?;
        unlockpt(&master).map_err(PtyError::PreparePty)?;

        // SAFETY: no other thread can race on this master between unlockpt
        // and here; the name is copied out immediately.
        let slave_name = unsafe { ptsname(&master) }.map_err(PtyError::PtsName)?;

        set_window_size(master.as_raw_fd(), size)?;

        // All allocation happens before the fork; the child branch after
        // fork is not async-signal-safe and must not touch the heap.
        let command_cstr = CString::new(command)?;
        let mut argv = Vec::with_capacity(args.len() + 1);
        argv.push(command_cstr.clone());
        for arg in args {
            argv.push(CString::new(*arg)?);
        }
        let mut envp = Vec::new();
        for (key, value) in std::env::vars() {
            if key == "TERM" {
                continue;
            }
            envp.push(CString::new(format!("{}={}", key, value))?);
        }
        envp.push(CString::new("TERM=xterm")?);

        // SAFETY: the child branch only calls exec-path syscalls and exits
        // on failure; there is no channel back to the parent, so any failed
        // step becomes a nonzero child exit instead of an error value that
        // would run the embedding program's error path in a forked copy.
        match unsafe { fork() }.map_err(PtyError::Fork)? {
            ForkResult::Child => {
                drop(master);

                if setsid().is_err() {
                    std::process::exit(1);
                }

                let slave_fd = match open(slave_name.as_str(), OFlag::O_RDWR, Mode::empty()) {
                    Ok(fd) => fd,
                    Err(_) => std::process::exit(1),
                };

                // SAFETY: slave_fd is a valid terminal fd in a fresh session.
                unsafe {
                    libc::ioctl(slave_fd, libc::TIOCSCTTY as _, 0);
                }

                for std_fd in [STDIN_FILENO, STDOUT_FILENO, STDERR_FILENO] {
                    if dup2(slave_fd, std_fd).is_err() {
                        std::process::exit(1);
                    }
                }
                if slave_fd > STDERR_FILENO {
                    let _ = close(slave_fd);
                }

                let _ = execvpe(&command_cstr, &argv, &envp);
                std::process::exit(127);
            }
            ForkResult::Parent { child } => Ok(Pty {
                master,
                child,
                status: Mutex::new(None),
            }),
        }
    }

    pub fn master_fd(&self) -> RawFd {
        self.master.as_raw_fd()
    }

    pub fn child_pid(&self) -> Pid {
        self.child
    }

    /// Blocking read of child output. `Ok(0)` means the stream is over: the
    /// slave side was closed, which Linux reports as EIO on the master.
    pub fn read(&self, buf: &mut [u8]) -> PtyResult<usize> {
        match read(self.master.as_raw_fd(), buf) {
            Ok(n) => Ok(n),
            Err(nix::errno::Errno::EIO) => Ok(0),
            Err(e) => Err(PtyError::Read(e)),
        }
    }

    /// Write keyboard input to the child, retrying short writes.
    pub fn write_all(&self, mut data: &[u8]) -> PtyResult<()> {
        while !data.is_empty() {
            let n = write(self.master.as_raw_fd(), data).map_err(PtyError::Write)?;
            data = &data[n..];
        }
        Ok(())
    }

    /// Wait up to `timeout_ms` for output to be readable.
    pub fn poll_read(&self, timeout_ms: i32) -> PtyResult<bool> {
        // SAFETY: the master fd outlives this call.
        let fd = unsafe { BorrowedFd::borrow_raw(self.master.as_raw_fd()) };
        let mut fds = [PollFd::new(&fd, PollFlags::POLLIN)];
        let n = poll(&mut fds, timeout_ms).map_err(PtyError::Poll)?;
        Ok(n > 0
            && fds[0]
                .revents()
                .is_some_and(|r| r.intersects(PollFlags::POLLIN | PollFlags::POLLHUP)))
    }

    /// Update the kernel's window size and notify the child with SIGWINCH.
    pub fn resize(&self, size: WindowSize) -> PtyResult<()> {
        set_window_size(self.master.as_raw_fd(), size)?;
        // The child may have exited already; a missed notification is fine.
        let _ = kill(self.child, Signal::SIGWINCH);
        Ok(())
    }

    pub fn signal(&self, signal: Signal) -> PtyResult<()> {
        kill(self.child, signal).map_err(PtyError::Signal)
    }

    /// Force-kill the child and reap it. Reports the cached status when the
    /// child is already gone.
    pub fn kill(&self) -> PtyResult<ExitStatus> {
        if self.status.lock().unwrap().is_none() {
            // ESRCH just means the child beat us to it.
            match kill(self.child, Signal::SIGKILL) {
                Ok(()) | Err(nix::errno::Errno::ESRCH) => {}
                Err(e) => return Err(PtyError::Signal(e)),
            }
        }
        self.wait()
    }

    /// Block until the child exits and collect its status.
    pub fn wait(&self) -> PtyResult<ExitStatus> {
        let mut status = self.status.lock().unwrap();
        if let Some(cached) = *status {
            return Ok(cached);
        }
        loop {
            match waitpid(self.child, None).map_err(PtyError::Wait)? {
                WaitStatus::Exited(_, code) => {
                    let exit = ExitStatus::Exited(code);
                    *status = Some(exit);
                    return Ok(exit);
                }
                WaitStatus::Signaled(_, signal, _) => {
                    let exit = ExitStatus::Signaled(signal as i32);
                    *status = Some(exit);
                    return Ok(exit);
                }
                _ => continue,
            }
        }
    }

    /// Whether the child is still running, reaping it if it exited.
    pub fn is_alive(&self) -> bool {
        let mut status = self.status.lock().unwrap();
        if status.is_some() {
            return false;
        }
        match waitpid(self.child, Some(WaitPidFlag::WNOHANG)) {
            Ok(WaitStatus::StillAlive) => true,
            Ok(WaitStatus::Exited(_, code)) => {
                *status = Some(ExitStatus::Exited(code));
                false
            }
            Ok(WaitStatus::Signaled(_, signal, _)) => {
                *status = Some(ExitStatus::Signaled(signal as i32));
                false
            }
            Ok(_) => true,
            Err(_) => false,
        }
    }
}

impl Drop for Pty {
    fn drop(&mut self) {
        if self.status.get_mut().unwrap().is_none() {
            let _ = kill(self.child, Signal::SIGKILL);
            let _ = waitpid(self.child, None);
        }
    }
}

fn set_window_size(fd: RawFd, size: WindowSize) -> PtyResult<()> {
    let winsize = libc::winsize {
        ws_row: size.rows,
        ws_col: size.cols,
        ws_xpixel: size.pixel_width,
        ws_ypixel: size.pixel_height,
    };
    // SAFETY: fd is a pty master and winsize is a valid struct for it.
    let rc = unsafe { libc::ioctl(fd, libc::TIOCSWINSZ, &winsize) };
    if rc < 0 {
        return Err(PtyError::SetWinsize(nix::errno::Errno::last()));
    }
    Ok(())
}
