//! Screen buffer
//!
//! The terminal grid: `cols x (rows + 1)` cells indexed through the row ring,
//! a cursor clamped to the visible area, and the SGR color state. One writer
//! (the reader thread) mutates a buffer at a time; the cross-thread hand-off
//! lives in [`crate::session`].

use std::sync::Arc;

use crate::glyph::{GlyphRef, GlyphSource};

use super::cell::Cell;
use super::color::{Palette, Rgba};
use super::ring::RowRing;

/// Tab stops every 8 columns.
const TAB_SIZE: usize = 8;

/// Cursor position, 0-based, always within the visible grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
pub struct Cursor {
    pub col: usize,
    pub row: usize,
}

/// Range selector for clear operations, from the CSI `J`/`K` parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClearMode {
    /// From the cursor to the end of the screen/line (param 0).
    ToEnd,
    /// From the beginning of the screen/line through the cursor (param 1).
    FromStart,
    /// The whole screen/line (param 2).
    All,
}

impl ClearMode {
    pub fn from_param(param: u32) -> Option<Self> {
        match param {
            0 => Some(ClearMode::ToEnd),
            1 => Some(ClearMode::FromStart),
            2 => Some(ClearMode::All),
            _ => None,
        }
    }
}

/// Per-session screen configuration: the palette and default colors are
/// fixed for the buffer's lifetime; SGR 0/39/49 restore the defaults.
#[derive(Debug, Clone)]
pub struct ScreenConfig {
    pub palette: Palette,
    pub default_fg: Rgba,
    pub default_bg: Rgba,
    /// Codepoint whose glyph is drawn at the cursor position.
    pub cursor_codepoint: u32,
}

impl Default for ScreenConfig {
    fn default() -> Self {
        Self {
            palette: Palette::default(),
            default_fg: Rgba::from_u8(229, 229, 229, 255),
            default_bg: Rgba::from_u8(0, 0, 0, 255),
            cursor_codepoint: 0x2588, // full block
        }
    }
}

/// The terminal grid.
///
/// Storage holds one spare row beyond the visible grid so the ring cursor
/// can distinguish full from empty and scrolling can clear a fresh row in
/// place. Logical row `i` lives at physical slot `(top + i) % (rows + 1)`;
/// all access goes through [`RowRing`].
#[derive(Clone)]
pub struct ScreenBuffer {
    cols: usize,
    rows: usize,
    cells: Vec<Cell>,
    ring: RowRing,
    cursor: Cursor,
    cursor_visible: bool,
    cursor_glyph: Option<GlyphRef>,
    fg: Rgba,
    bg: Rgba,
    default_fg: Rgba,
    default_bg: Rgba,
    palette: Palette,
    glyphs: Arc<dyn GlyphSource>,
}

impl std::fmt::Debug for ScreenBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScreenBuffer")
            .field("cols", &self.cols)
            .field("rows", &self.rows)
            .field("cursor", &self.cursor)
            .field("top", &self.ring.top())
            .finish_non_exhaustive()
    }
}

impl ScreenBuffer {
    pub fn new(
        cols: usize,
        rows: usize,
        config: ScreenConfig,
        glyphs: Arc<dyn GlyphSource>,
    ) -> Self {
        assert!(cols > 0 && rows > 0, "degenerate grid {}x{}", cols, rows);
        let cursor_glyph = glyphs.resolve(config.cursor_codepoint);
        Self {
            cols,
            rows,
            cells: vec![Cell::default(); cols * (rows + 1)],
            ring: RowRing::new(rows),
            cursor: Cursor::default(),
            cursor_visible: true,
            cursor_glyph,
            fg: config.default_fg,
            bg: config.default_bg,
            default_fg: config.default_fg,
            default_bg: config.default_bg,
            palette: config.palette,
            glyphs,
        }
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    pub fn cursor_visible(&self) -> bool {
        self.cursor_visible
    }

    pub fn set_cursor_visible(&mut self, visible: bool) {
        self.cursor_visible = visible;
    }

    pub fn cursor_glyph(&self) -> Option<GlyphRef> {
        self.cursor_glyph
    }

    /// Physical slot of the logical first visible row. Exposed for tests of
    /// the ring invariant; rendering goes through [`Self::cell`].
    pub fn top_row(&self) -> usize {
        self.ring.top()
    }

    pub fn default_fg(&self) -> Rgba {
        self.default_fg
    }

    pub fn default_bg(&self) -> Rgba {
        self.default_bg
    }

    pub fn fg(&self) -> Rgba {
        self.fg
    }

    pub fn bg(&self) -> Rgba {
        self.bg
    }

    /// Cell at (col, logical row), ring-adjusted.
    pub fn cell(&self, col: usize, row: usize) -> &Cell {
        &self.cells[self.index(col, row)]
    }

    fn index(&self, col: usize, row: usize) -> usize {
        debug_assert!(col < self.cols && row < self.rows);
        self.ring.physical(row) * self.cols + col
    }

    fn clear_span(&mut self, row: usize, cols: std::ops::Range<usize>) {
        let base = self.ring.physical(row) * self.cols;
        for cell in &mut self.cells[base + cols.start..base + cols.end] {
            cell.clear();
        }
    }

    /// Print a codepoint at the cursor and advance.
    ///
    /// Codepoints outside the valid Unicode range are a protocol-contract
    /// violation upstream and abort the process; the decoder never produces
    /// them from well-formed UTF-8.
    pub fn put(&mut self, cp: u32) {
        if cp > 0x10ffff || (0xd800..0xe000).contains(&cp) {
            panic!("invalid Unicode codepoint: {}", cp);
        }
        match self.glyphs.resolve(cp) {
            Some(glyph) => {
                let idx = self.index(self.cursor.col, self.cursor.row);
                self.cells[idx] = Cell::new(glyph, self.fg, self.bg);
            }
            None => {
                tracing::warn!(codepoint = cp, "no glyph for codepoint");
            }
        }
        self.cursor.col += 1;
        self.normalize();
    }

    /// BS: move left one column, stopping at the margin.
    pub fn backspace(&mut self) {
        self.cursor.col = self.cursor.col.saturating_sub(1);
    }

    /// HT: advance to the next 8-column tab stop.
    pub fn tab(&mut self) {
        loop {
            self.cursor.col += 1;
            if self.cursor.col % TAB_SIZE == 0 {
                break;
            }
        }
        self.normalize();
    }

    /// CR: column to 0.
    pub fn carriage_return(&mut self) {
        self.cursor.col = 0;
    }

    /// LF: next row, scrolling on overflow.
    pub fn linefeed(&mut self) {
        self.cursor.row += 1;
        self.normalize();
    }

    /// Wrap the cursor at the right margin and scroll past the bottom. The
    /// scroll is the ring advance: the spare slot becomes the new last line
    /// and is cleared; nothing else moves.
    fn normalize(&mut self) {
        if self.cursor.col >= self.cols {
            self.cursor.col = 0;
            self.cursor.row += 1;
        }
        if self.cursor.row >= self.rows {
            self.ring.advance();
            self.clear_span(self.rows - 1, 0..self.cols);
            self.cursor.row = self.rows - 1;
        }
    }

    /// CSI A. `n == 0` is normalized to 1; clamps at the top.
    pub fn move_up(&mut self, n: u32) {
        let n = n.max(1) as usize;
        self.cursor.row = self.cursor.row.saturating_sub(n);
    }

    /// CSI B. `n == 0` is normalized to 1; clamps at the bottom.
    pub fn move_down(&mut self, n: u32) {
        let n = n.max(1) as usize;
        self.cursor.row = (self.cursor.row + n).min(self.rows - 1);
    }

    /// CSI C. `n == 0` is normalized to 1; clamps at the right margin.
    pub fn move_right(&mut self, n: u32) {
        let n = n.max(1) as usize;
        self.cursor.col = (self.cursor.col + n).min(self.cols - 1);
    }

    /// CSI D. `n == 0` is normalized to 1; clamps at the left margin.
    pub fn move_left(&mut self, n: u32) {
        let n = n.max(1) as usize;
        self.cursor.col = self.cursor.col.saturating_sub(n);
    }

    /// CSI H: 1-based coordinates; 0 clamps to 1, oversize clamps to the
    /// last row/column.
    pub fn move_to(&mut self, row: u32, col: u32) {
        self.cursor.row = (row.max(1) as usize - 1).min(self.rows - 1);
        self.cursor.col = (col.max(1) as usize - 1).min(self.cols - 1);
    }

    /// CSI J: clear a cursor-relative region of the screen. Ranges are
    /// computed in logical rows, so a range that wraps past the physical end
    /// of storage is handled by the ring mapping row by row.
    pub fn clear_screen(&mut self, mode: ClearMode) {
        match mode {
            ClearMode::ToEnd => {
                self.clear_span(self.cursor.row, self.cursor.col..self.cols);
                for row in self.cursor.row + 1..self.rows {
                    self.clear_span(row, 0..self.cols);
                }
            }
            ClearMode::FromStart => {
                for row in 0..self.cursor.row {
                    self.clear_span(row, 0..self.cols);
                }
                self.clear_span(self.cursor.row, 0..self.cursor.col + 1);
            }
            ClearMode::All => {
                for row in 0..self.rows {
                    self.clear_span(row, 0..self.cols);
                }
            }
        }
    }

    /// CSI K: clear a cursor-relative span of the current line.
    pub fn clear_line(&mut self, mode: ClearMode) {
        match mode {
            ClearMode::ToEnd => self.clear_span(self.cursor.row, self.cursor.col..self.cols),
            ClearMode::FromStart => self.clear_span(self.cursor.row, 0..self.cursor.col + 1),
            ClearMode::All => self.clear_span(self.cursor.row, 0..self.cols),
        }
    }

    /// Reallocate to the new geometry. Cursor and ring return to origin and
    /// all content is discarded; there is no reflow.
    pub fn resize(&mut self, cols: usize, rows: usize) {
        assert!(cols > 0 && rows > 0, "degenerate grid {}x{}", cols, rows);
        self.cols = cols;
        self.rows = rows;
        self.cells = vec![Cell::default(); cols * (rows + 1)];
        self.ring.reset(rows);
        self.cursor = Cursor::default();
    }

    /// SGR 30-37/90-97: foreground from the palette.
    pub fn set_fg_indexed(&mut self, index: usize) {
        self.fg = self.palette.get(index);
    }

    /// SGR 40-47/100-107: background from the palette.
    pub fn set_bg_indexed(&mut self, index: usize) {
        self.bg = self.palette.get(index);
    }

    /// SGR 39 (and half of SGR 0).
    pub fn reset_fg(&mut self) {
        self.fg = self.default_fg;
    }

    /// SGR 49 (and half of SGR 0).
    pub fn reset_bg(&mut self) {
        self.bg = self.default_bg;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::glyph::CodepointGlyphs;
    use proptest::prelude::*;

    fn screen(cols: usize, rows: usize) -> ScreenBuffer {
        ScreenBuffer::new(cols, rows, ScreenConfig::default(), Arc::new(CodepointGlyphs))
    }

    fn put_str(s: &mut ScreenBuffer, text: &str) {
        for c in text.chars() {
            s.put(c as u32);
        }
    }

    fn cell_char(s: &ScreenBuffer, col: usize, row: usize) -> Option<char> {
        s.cell(col, row)
            .glyph
            .and_then(|g| char::from_u32(g.id()))
            .filter(|_| s.cell(col, row).occupied)
    }

    #[test]
    fn test_put_advances_cursor() {
        let mut s = screen(80, 24);
        put_str(&mut s, "Hi");
        assert_eq!(s.cursor(), Cursor { col: 2, row: 0 });
        assert_eq!(cell_char(&s, 0, 0), Some('H'));
        assert_eq!(cell_char(&s, 1, 0), Some('i'));
    }

    #[test]
    fn test_wrap_at_right_margin() {
        let mut s = screen(80, 24);
        s.move_to(1, 80); // col 79
        s.put(b'X' as u32);
        assert_eq!(s.cursor(), Cursor { col: 0, row: 1 });
        assert_eq!(cell_char(&s, 79, 0), Some('X'));
    }

    #[test]
    fn test_linefeed_scrolls_at_bottom() {
        let mut s = screen(80, 24);
        put_str(&mut s, "top");
        for _ in 0..24 {
            s.linefeed();
        }
        // 25 lines on a 24-row grid: exactly one scroll
        assert_eq!(s.top_row(), 1);
        assert_eq!(s.cursor().row, 23);
        // The original first line is no longer visible
        assert_eq!(cell_char(&s, 0, 0), None);
    }

    #[test]
    fn test_scroll_advances_top_by_one_per_overflow() {
        let mut s = screen(10, 4);
        for i in 0..12 {
            put_str(&mut s, &format!("l{}", i));
            s.carriage_return();
            s.linefeed();
        }
        // 12 linefeeds on a 4-row grid scroll 9 times, mod 5 slots
        assert_eq!(s.top_row(), 9 % 5);
        // The 3 most recent lines are visible above the fresh blank row
        assert_eq!(cell_char(&s, 1, 0), Some('9'));
        assert_eq!(cell_char(&s, 1, 1), Some('1'));
        assert_eq!(cell_char(&s, 2, 1), Some('0'));
        assert_eq!(cell_char(&s, 2, 2), Some('1'));
        assert_eq!(cell_char(&s, 0, 3), None);
    }

    #[test]
    fn test_tab_stops() {
        let mut s = screen(80, 24);
        s.tab();
        assert_eq!(s.cursor().col, 8);
        s.put(b'a' as u32);
        s.tab();
        assert_eq!(s.cursor().col, 16);
    }

    #[test]
    fn test_backspace_stops_at_margin() {
        let mut s = screen(80, 24);
        s.backspace();
        assert_eq!(s.cursor().col, 0);
        put_str(&mut s, "ab");
        s.backspace();
        assert_eq!(s.cursor().col, 1);
    }

    #[test]
    fn test_moves_clamp_and_normalize_zero() {
        let mut s = screen(80, 24);
        s.move_down(0); // 0 means 1
        assert_eq!(s.cursor().row, 1);
        s.move_up(100);
        assert_eq!(s.cursor().row, 0);
        s.move_right(200);
        assert_eq!(s.cursor().col, 79);
        s.move_left(0);
        assert_eq!(s.cursor().col, 78);
        s.move_down(100);
        assert_eq!(s.cursor().row, 23);
    }

    #[test]
    fn test_move_to_clamps() {
        let mut s = screen(80, 24);
        s.move_to(0, 0);
        assert_eq!(s.cursor(), Cursor { col: 0, row: 0 });
        s.move_to(999, 999);
        assert_eq!(s.cursor(), Cursor { col: 79, row: 23 });
        s.move_to(10, 5);
        assert_eq!(s.cursor(), Cursor { col: 4, row: 9 });
    }

    #[test]
    fn test_clear_line_modes() {
        let mut s = screen(10, 3);
        put_str(&mut s, "0123456789");
        // Wrap moved us to row 1; go back and sit on col 4
        s.move_to(1, 5);
        s.clear_line(ClearMode::ToEnd);
        assert_eq!(cell_char(&s, 3, 0), Some('3'));
        assert_eq!(cell_char(&s, 4, 0), None);
        assert_eq!(cell_char(&s, 9, 0), None);

        let mut s = screen(10, 3);
        put_str(&mut s, "0123456789");
        s.move_to(1, 5);
        s.clear_line(ClearMode::FromStart);
        // Cursor cell is included in the cleared range
        assert_eq!(cell_char(&s, 4, 0), None);
        assert_eq!(cell_char(&s, 0, 0), None);
        assert_eq!(cell_char(&s, 5, 0), Some('5'));

        let mut s = screen(10, 3);
        put_str(&mut s, "0123456789");
        s.move_to(1, 5);
        s.clear_line(ClearMode::All);
        for col in 0..10 {
            assert_eq!(cell_char(&s, col, 0), None);
        }
    }

    #[test]
    fn test_clear_screen_handles_ring_wraparound() {
        let mut s = screen(4, 3);
        // Scroll twice so logical rows wrap through physical slot 0
        for _ in 0..5 {
            put_str(&mut s, "xxxx");
        }
        assert!(s.top_row() > 0);
        s.move_to(2, 1);
        s.clear_screen(ClearMode::ToEnd);
        // Row 1 from cursor and all of row 2 are cleared; row 0 survives
        assert_eq!(cell_char(&s, 0, 0), Some('x'));
        for col in 0..4 {
            assert_eq!(cell_char(&s, col, 1), None);
            assert_eq!(cell_char(&s, col, 2), None);
        }
    }

    #[test]
    fn test_clear_screen_from_start_and_all() {
        let mut s = screen(4, 3);
        for _ in 0..3 {
            put_str(&mut s, "yyyy");
        }
        s.move_to(2, 2);
        s.clear_screen(ClearMode::FromStart);
        assert_eq!(cell_char(&s, 0, 0), None);
        assert_eq!(cell_char(&s, 1, 1), None); // cursor cell included
        assert_eq!(cell_char(&s, 2, 1), Some('y'));

        s.clear_screen(ClearMode::All);
        for row in 0..3 {
            for col in 0..4 {
                assert_eq!(cell_char(&s, col, row), None);
            }
        }
    }

    #[test]
    fn test_resize_resets_everything() {
        let mut s = screen(80, 24);
        put_str(&mut s, "content");
        for _ in 0..30 {
            s.linefeed();
        }
        assert!(s.top_row() > 0);
        s.resize(100, 30);
        assert_eq!(s.cols(), 100);
        assert_eq!(s.rows(), 30);
        assert_eq!(s.cursor(), Cursor { col: 0, row: 0 });
        assert_eq!(s.top_row(), 0);
        for row in 0..30 {
            for col in 0..100 {
                assert!(s.cell(col, row).is_blank());
            }
        }
    }

    #[test]
    fn test_sgr_colors_applied_to_cells() {
        let palette = Palette::default();
        let mut s = screen(80, 24);
        s.set_fg_indexed(1);
        s.put(b'A' as u32);
        assert_eq!(s.cell(0, 0).fg, palette.get(1));
        s.reset_fg();
        s.reset_bg();
        s.put(b'B' as u32);
        assert_eq!(s.cell(1, 0).fg, s.default_fg());
        assert_eq!(s.cell(1, 0).bg, s.default_bg());
    }

    #[test]
    #[should_panic(expected = "invalid Unicode codepoint")]
    fn test_surrogate_codepoint_is_fatal() {
        let mut s = screen(80, 24);
        s.put(0xd800);
    }

    #[test]
    #[should_panic(expected = "invalid Unicode codepoint")]
    fn test_out_of_range_codepoint_is_fatal() {
        let mut s = screen(80, 24);
        s.put(0x110000);
    }

    proptest! {
        /// Any sequence of prints and cursor operations keeps the cursor
        /// inside the visible grid and the ring top inside its slot range.
        #[test]
        fn prop_cursor_always_in_bounds(ops in proptest::collection::vec(0u8..8, 1..200)) {
            let mut s = screen(17, 5);
            for op in ops {
                match op {
                    0 => s.put(b'x' as u32),
                    1 => s.linefeed(),
                    2 => s.carriage_return(),
                    3 => s.tab(),
                    4 => s.backspace(),
                    5 => s.move_up(3),
                    6 => s.move_down(3),
                    7 => s.move_right(7),
                    _ => unreachable!(),
                }
                prop_assert!(s.cursor().col < s.cols());
                prop_assert!(s.cursor().row < s.rows());
                prop_assert!(s.top_row() <= s.rows());
            }
        }

        /// Printing past the bottom advances the ring top exactly once per
        /// line of overflow, never more.
        #[test]
        fn prop_top_advances_once_per_overflow(extra in 0usize..40) {
            let rows = 6;
            let mut s = screen(10, rows);
            for _ in 0..rows + extra {
                s.put(b'l' as u32);
                s.carriage_return();
                s.linefeed();
            }
            // First `rows` linefeeds fill the grid (the last one scrolls once).
            prop_assert_eq!(s.top_row(), (extra + 1) % (rows + 1));
        }
    }
}
