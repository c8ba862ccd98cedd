//! Row ring
//!
//! Scrolling is an O(1) pointer update: row storage holds `rows + 1` slots
//! and `top` marks the physical slot of the logical first visible row. The
//! spare slot lets a full ring be distinguished from an empty one and gives
//! scrolling a fresh row to clear without moving memory. All wraparound
//! arithmetic lives here so callers never index physical storage directly.

use serde::{Deserialize, Serialize};

/// Ring cursor over `rows + 1` physical row slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowRing {
    top: usize,
    rows: usize,
}

impl RowRing {
    pub fn new(rows: usize) -> Self {
        Self { top: 0, rows }
    }

    /// Number of visible rows.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of physical row slots (`rows + 1`).
    pub fn slots(&self) -> usize {
        self.rows + 1
    }

    /// Physical slot of the logical first visible row.
    pub fn top(&self) -> usize {
        self.top
    }

    /// Map a logical row index to its physical slot.
    pub fn physical(&self, logical: usize) -> usize {
        debug_assert!(logical < self.slots());
        (self.top + logical) % self.slots()
    }

    /// Scroll one line: the old top row leaves the visible window and the
    /// spare slot becomes the new last visible row.
    pub fn advance(&mut self) {
        self.top = (self.top + 1) % self.slots();
    }

    /// Reset to origin with a new row count (used by resize).
    pub fn reset(&mut self, rows: usize) {
        self.top = 0;
        self.rows = rows;
    }
}
