//! Terminal session
//!
//! Wires a [`Pty`] to a [`Terminal`] across two threads. The reader thread
//! exclusively owns the live terminal: it blocks on the PTY, feeds each
//! chunk through the decoder and parser, then publishes a copy of the
//! screen into the shared front buffer. The render side never touches the
//! live state; it takes frames out of the front buffer and pushes input,
//! resizes, and termination in through the PTY and the shared flags.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

use crate::core::{Frame, ScreenBuffer, ScreenConfig};
use crate::glyph::{grid_size, GlyphSource};
use crate::input::{encode_key, Key, Modifiers};
use crate::pty::{ExitStatus, Pty, PtyResult, WindowSize};
use crate::terminal::Terminal;

/// Everything needed to start a session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub command: String,
    pub args: Vec<String>,
    pub cols: usize,
    pub rows: usize,
    pub screen: ScreenConfig,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            command: std::env::var("SHELL").unwrap_or_else(|_| "/bin/sh".to_string()),
            args: Vec::new(),
            cols: 80,
            rows: 24,
            screen: ScreenConfig::default(),
        }
    }
}

/// State shared between the reader thread and the render side.
struct Shared {
    /// Latest published copy of the screen.
    front: Mutex<ScreenBuffer>,
    /// Set by the reader after each publish, cleared by `take_frame`.
    frame_ready: AtomicBool,
    /// Set once the child's output stream has ended.
    closed: AtomicBool,
    /// Geometry change waiting for the reader to apply, cells as (cols, rows).
    pending_resize: Mutex<Option<(usize, usize)>>,
}

/// A running child process with its terminal state.
///
/// Dropping the session kills the child and joins the reader thread.
pub struct Session {
    pty: Arc<Pty>,
    shared: Arc<Shared>,
    glyphs: Arc<dyn GlyphSource>,
    reader: Option<JoinHandle<()>>,
}

impl Session {
    /// Spawn the child and start the reader thread.
    pub fn spawn(config: SessionConfig, glyphs: Arc<dyn GlyphSource>) -> PtyResult<Self> {
        let args: Vec<&str> = config.args.iter().map(String::as_str).collect();
        let pty = Arc::new(Pty::spawn(
            &config.command,
            &args,
            WindowSize::new(config.cols as u16, config.rows as u16),
        )?);
        tracing::info!(
            command = %config.command,
            cols = config.cols,
            rows = config.rows,
            pid = pty.child_pid().as_raw(),
            "session started"
        );

        let terminal = Terminal::new(config.cols, config.rows, config.screen, glyphs.clone());
        let shared = Arc::new(Shared {
            front: Mutex::new(terminal.screen().clone()),
            frame_ready: AtomicBool::new(true),
            closed: AtomicBool::new(false),
            pending_resize: Mutex::new(None),
        });

        let reader = {
            let pty = pty.clone();
            let shared = shared.clone();
            std::thread::Builder::new()
                .name("pty-reader".into())
                .spawn(move || reader_loop(pty, shared, terminal))?
        };

        Ok(Self {
            pty,
            shared,
            glyphs,
            reader: Some(reader),
        })
    }

    /// Take the latest frame if one was published since the last call.
    pub fn take_frame(&self) -> Option<Frame> {
        if !self.shared.frame_ready.swap(false, Ordering::AcqRel) {
            return None;
        }
        let front = self.shared.front.lock().unwrap();
        Some(Frame::from_screen(&front))
    }

    /// Snapshot the current frame regardless of freshness.
    pub fn frame(&self) -> Frame {
        let front = self.shared.front.lock().unwrap();
        Frame::from_screen(&front)
    }

    /// Send raw bytes to the child as keyboard input.
    pub fn send_bytes(&self, bytes: &[u8]) -> PtyResult<()> {
        self.pty.write_all(bytes)
    }

    /// Encode a key event and send it to the child.
    pub fn send_key(&self, key: Key, mods: Modifiers) -> PtyResult<()> {
        let bytes = encode_key(key, mods);
        if bytes.is_empty() {
            return Ok(());
        }
        self.send_bytes(&bytes)
    }

    /// Change the terminal geometry in cells.
    ///
    /// The kernel size is updated and the child signaled immediately; the
    /// screen itself is resized by the reader thread before its next batch,
    /// so a frame taken right after this call may still have the old shape.
    pub fn resize(&self, cols: usize, rows: usize) -> PtyResult<()> {
        assert!(cols > 0 && rows > 0, "degenerate grid {}x{}", cols, rows);
        *self.shared.pending_resize.lock().unwrap() = Some((cols, rows));
        self.pty.resize(WindowSize::new(cols as u16, rows as u16))?;
        tracing::debug!(cols, rows, "resize requested");
        Ok(())
    }

    /// Change the terminal geometry from a pixel viewport, deriving the cell
    /// grid from the glyph advance.
    pub fn resize_pixels(&self, pixel_width: u32, pixel_height: u32) -> PtyResult<()> {
        let (cols, rows) = grid_size(pixel_width, pixel_height, self.glyphs.advance());
        *self.shared.pending_resize.lock().unwrap() = Some((cols, rows));
        self.pty.resize(WindowSize::with_pixels(
            cols as u16,
            rows as u16,
            pixel_width as u16,
            pixel_height as u16,
        ))?;
        Ok(())
    }

    /// Whether the child's output stream has ended.
    pub fn is_closed(&self) -> bool {
        self.shared.closed.load(Ordering::Acquire)
    }

    /// Kill the child, join the reader, and return how the child exited.
    pub fn terminate(&mut self) -> PtyResult<ExitStatus> {
        let status = self.pty.kill()?;
        if let Some(reader) = self.reader.take() {
            let _ = reader.join();
        }
        tracing::info!(?status, "session terminated");
        Ok(status)
    }

    /// Block until the child exits on its own.
    pub fn wait(&mut self) -> PtyResult<ExitStatus> {
        let status = self.pty.wait()?;
        if let Some(reader) = self.reader.take() {
            let _ = reader.join();
        }
        Ok(status)
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if self.reader.is_some() {
            let _ = self.terminate();
        }
    }
}

fn reader_loop(pty: Arc<Pty>, shared: Arc<Shared>, mut terminal: Terminal) {
    let mut buf = [0u8; 4096];
    loop {
        let n = match pty.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) => {
                tracing::error!(error = %e, "pty read failed");
                break;
            }
        };
        // A queued geometry change takes effect before the chunk that woke
        // us, so the chunk lands on the new grid instead of being wiped.
        if let Some((cols, rows)) = shared.pending_resize.lock().unwrap().take() {
            terminal.resize(cols, rows);
        }
        terminal.process_bytes(&buf[..n]);
        publish(&shared, &terminal);
    }
    // Publish whatever was on screen when the stream ended, then mark the
    // session closed so pollers see the final frame.
    publish(&shared, &terminal);
    shared.closed.store(true, Ordering::Release);
    tracing::debug!("reader thread exiting");
}

fn publish(shared: &Shared, terminal: &Terminal) {
    {
        let mut front = shared.front.lock().unwrap();
        front.clone_from(terminal.screen());
    }
    shared.frame_ready.store(true, Ordering::Release);
}
