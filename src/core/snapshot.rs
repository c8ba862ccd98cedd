//! Frame snapshots
//!
//! An immutable, serializable copy of the screen in logical row order. The
//! ring layout is an implementation detail of [`ScreenBuffer`]; a [`Frame`]
//! is what renderers and the headless binary consume.

use serde::{Deserialize, Serialize};

use crate::glyph::GlyphRef;

use super::cell::Cell;
use super::screen::ScreenBuffer;

/// Cursor state as captured in a frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CursorSnapshot {
    pub col: usize,
    pub row: usize,
    pub visible: bool,
    pub glyph: Option<GlyphRef>,
}

/// A point-in-time copy of the visible grid, rows ordered top to bottom.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub cols: usize,
    pub rows: usize,
    pub grid: Vec<Vec<Cell>>,
    pub cursor: CursorSnapshot,
}

impl Frame {
    /// Capture the visible grid, flattening the ring into logical order.
    pub fn from_screen(screen: &ScreenBuffer) -> Self {
        let grid = (0..screen.rows())
            .map(|row| (0..screen.cols()).map(|col| *screen.cell(col, row)).collect())
            .collect();
        Self {
            cols: screen.cols(),
            rows: screen.rows(),
            grid,
            cursor: CursorSnapshot {
                col: screen.cursor().col,
                row: screen.cursor().row,
                visible: screen.cursor_visible(),
                glyph: screen.cursor_glyph(),
            },
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Render as plain text, one line per row with trailing blanks trimmed.
    /// Only meaningful when glyph ids are codepoints, as with
    /// [`crate::glyph::CodepointGlyphs`]; other ids render as blanks.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        for row in &self.grid {
            let mut line = String::new();
            for cell in row {
                let c = cell
                    .glyph
                    .filter(|_| cell.occupied)
                    .and_then(|g| char::from_u32(g.id()))
                    .unwrap_or(' ');
                line.push(c);
            }
            out.push_str(line.trim_end());
            out.push('\n');
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::screen::ScreenConfig;
    use crate::glyph::CodepointGlyphs;
    use std::sync::Arc;

    fn screen_with(text: &str) -> ScreenBuffer {
        let mut s = ScreenBuffer::new(20, 4, ScreenConfig::default(), Arc::new(CodepointGlyphs));
        for c in text.chars() {
            match c {
                '\n' => {
                    s.carriage_return();
                    s.linefeed();
                }
                c => s.put(c as u32),
            }
        }
        s
    }

    #[test]
    fn test_frame_captures_logical_order_after_scroll() {
        let s = screen_with("a\nb\nc\nd\ne\n");
        let frame = Frame::from_screen(&s);
        assert_eq!(frame.to_text(), "c\nd\ne\n\n");
    }

    #[test]
    fn test_frame_cursor_state() {
        let mut s = screen_with("hi");
        s.set_cursor_visible(false);
        let frame = Frame::from_screen(&s);
        assert_eq!(frame.cursor.col, 2);
        assert_eq!(frame.cursor.row, 0);
        assert!(!frame.cursor.visible);
        assert_eq!(frame.cursor.glyph, Some(GlyphRef::new(0x2588)));
    }

    #[test]
    fn test_json_round_trip() {
        let frame = Frame::from_screen(&screen_with("json"));
        let restored = Frame::from_json(&frame.to_json().unwrap()).unwrap();
        assert_eq!(restored, frame);
    }
}
