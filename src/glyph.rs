//! Glyph resolution seam
//!
//! The core never rasterizes text. Cells store an opaque [`GlyphRef`] that an
//! external font subsystem resolves from a codepoint and later turns into
//! draw calls. The same subsystem supplies per-cell advance metrics, which
//! the window side uses to translate pixel dimensions into a grid size.

use serde::{Deserialize, Serialize};

/// Opaque handle to a renderable glyph, resolved externally by codepoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GlyphRef(u32);

impl GlyphRef {
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    pub fn id(&self) -> u32 {
        self.0
    }
}

/// External font collaborator.
///
/// Implementations are shared with the reader thread, so they must be
/// `Send + Sync`.
pub trait GlyphSource: Send + Sync {
    /// Resolve a codepoint to a glyph reference, or `None` if the font has
    /// no glyph for it.
    fn resolve(&self, codepoint: u32) -> Option<GlyphRef>;

    /// Advance metrics in pixels: (column advance, line advance).
    fn advance(&self) -> (u32, u32);
}

/// Identity glyph source: every codepoint resolves to a glyph reference
/// carrying the codepoint itself. Used by the headless runner and tests,
/// where no rasterizer exists and `Frame::to_text` wants the codepoints
/// back.
#[derive(Debug, Default, Clone, Copy)]
pub struct CodepointGlyphs;

impl GlyphSource for CodepointGlyphs {
    fn resolve(&self, codepoint: u32) -> Option<GlyphRef> {
        Some(GlyphRef::new(codepoint))
    }

    fn advance(&self) -> (u32, u32) {
        (8, 16)
    }
}

/// Translate window pixel dimensions into a terminal grid size using the
/// font's advance metrics. Degenerate windows clamp to a 1x1 grid.
pub fn grid_size(pixel_width: u32, pixel_height: u32, advance: (u32, u32)) -> (usize, usize) {
    let cols = (pixel_width / advance.0.max(1)).max(1) as usize;
    let rows = (pixel_height / advance.1.max(1)).max(1) as usize;
    (cols, rows)
}
