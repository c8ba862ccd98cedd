//! bte: a minimal terminal emulator core
//!
//! The crate owns a PTY-backed child process, decodes its byte stream into
//! Unicode codepoints, interprets a VT100/ANSI escape-sequence subset, and
//! maintains the resulting screen state for consumption by a renderer:
//!
//! - `pty`: PTY creation and child process management
//! - `decoder`: incremental UTF-8 decoding across read boundaries
//! - `parser`: escape-sequence state machine producing semantic actions
//! - `core`: the cell grid with ring-based scrolling and frame snapshots
//! - `terminal`: executor applying parsed actions to the screen
//! - `session`: reader thread and the frame hand-off to the render side
//!
//! Rendering, font loading, and window management are external collaborators
//! reached only through the narrow seams in `glyph` and `session`.

pub mod core;
pub mod decoder;
pub mod glyph;
pub mod input;
pub mod parser;
pub mod pty;
pub mod session;
pub mod terminal;

pub use crate::core::{Cell, ClearMode, Cursor, Frame, Palette, Rgba, ScreenBuffer, ScreenConfig};
pub use decoder::{Decoded, Utf8Decoder};
pub use glyph::{CodepointGlyphs, GlyphRef, GlyphSource};
pub use input::{encode_key, Key, Modifiers};
pub use pty::{ExitStatus, PtyError, WindowSize};
pub use session::{Session, SessionConfig};
pub use terminal::Terminal;
