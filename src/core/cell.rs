//! Terminal cell
//!
//! A single position in the grid: an optional glyph reference (resolved
//! externally by codepoint, see [`crate::glyph`]) plus the colors that were
//! current when it was written.

use serde::{Deserialize, Serialize};

use crate::glyph::GlyphRef;

use super::color::Rgba;

/// A single cell in the terminal grid. The default cell is blank and
/// transparent; `occupied` tracks whether anything was ever printed here so
/// the renderer can skip untouched cells entirely.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Cell {
    /// Glyph to draw, if the font had one for the printed codepoint.
    pub glyph: Option<GlyphRef>,
    /// Foreground color at the time of printing.
    pub fg: Rgba,
    /// Background color at the time of printing.
    pub bg: Rgba,
    /// Whether this cell holds content (drives background drawing too).
    pub occupied: bool,
}

impl Cell {
    pub fn new(glyph: GlyphRef, fg: Rgba, bg: Rgba) -> Self {
        Self {
            glyph: Some(glyph),
            fg,
            bg,
            occupied: true,
        }
    }

    pub fn is_blank(&self) -> bool {
        !self.occupied
    }

    /// Reset to the blank default.
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
