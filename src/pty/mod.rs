//! Pseudoterminal handling
//!
//! Creates the PTY pair, spawns the child process on the slave side, and
//! exposes the master for reading child output, writing keyboard input,
//! resizing, and termination.

#[cfg(unix)]
mod unix;

#[cfg(unix)]
pub use unix::Pty;

/// Error type for PTY operations, one variant per failing syscall.
#[derive(Debug, thiserror::Error)]
pub enum PtyError {
    #[error("failed to open pty master: {0}")]
    OpenMaster(#[source] nix::Error),

    #[error("failed to prepare pty slave: {0}")]
    PreparePty(#[source] nix::Error),

    #[error("failed to resolve pty slave name: {0}")]
    PtsName(#[source] nix::Error),

    #[error("failed to fork: {0}")]
    Fork(#[source] nix::Error),

    #[error("failed to set window size: {0}")]
    SetWinsize(#[source] nix::Error),

    #[error("failed to read from pty: {0}")]
    Read(#[source] nix::Error),

    #[error("failed to write to pty: {0}")]
    Write(#[source] nix::Error),

    #[error("failed to poll pty: {0}")]
    Poll(#[source] nix::Error),

    #[error("failed to signal child: {0}")]
    Signal(#[source] nix::Error),

    #[error("failed to wait for child: {0}")]
    Wait(#[source] nix::Error),

    #[error("command contains an interior nul byte")]
    NulInCommand(#[from] std::ffi::NulError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type PtyResult<T> = Result<T, PtyError>;

/// PTY window geometry as the kernel sees it (`struct winsize`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowSize {
    pub rows: u16,
    pub cols: u16,
    pub pixel_width: u16,
    pub pixel_height: u16,
}

impl WindowSize {
    pub fn new(cols: u16, rows: u16) -> Self {
        Self {
            rows,
            cols,
            pixel_width: 0,
            pixel_height: 0,
        }
    }

    pub fn with_pixels(cols: u16, rows: u16, pixel_width: u16, pixel_height: u16) -> Self {
        Self {
            rows,
            cols,
            pixel_width,
            pixel_height,
        }
    }
}

impl Default for WindowSize {
    fn default() -> Self {
        Self::new(80, 24)
    }
}

/// How the child exited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitStatus {
    Exited(i32),
    Signaled(i32),
}
