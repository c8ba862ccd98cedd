//! Parser output types

/// Upper bound on parameters kept per CSI sequence. Sequences carrying more
/// are truncated rather than reallocated; real traffic stays far below this.
pub const MAX_CSI_PARAMS: usize = 32;

/// Numeric parameters of a CSI sequence, fixed capacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CsiParams {
    values: [u32; MAX_CSI_PARAMS],
    len: usize,
    truncated: bool,
}

impl Default for CsiParams {
    fn default() -> Self {
        Self {
            values: [0; MAX_CSI_PARAMS],
            len: 0,
            truncated: false,
        }
    }
}

impl CsiParams {
    pub fn push(&mut self, value: u32) {
        if self.len == MAX_CSI_PARAMS {
            self.truncated = true;
            return;
        }
        self.values[self.len] = value;
        self.len += 1;
    }

    pub fn as_slice(&self) -> &[u32] {
        &self.values[..self.len]
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Whether parameters beyond capacity were dropped.
    pub fn truncated(&self) -> bool {
        self.truncated
    }

    /// Parameter at `index`, or `default` when absent.
    pub fn get_or(&self, index: usize, default: u32) -> u32 {
        self.as_slice().get(index).copied().unwrap_or(default)
    }
}

/// A complete CSI sequence as recognized on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CsiSequence {
    /// Introduced with a `?` private marker.
    pub private: bool,
    pub params: CsiParams,
    /// Final byte in `0x40..=0x7e`, selects the operation.
    pub final_byte: u8,
}

/// One unit of parsed terminal input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Printable codepoint for the grid.
    Print(u32),
    Backspace,
    Tab,
    Linefeed,
    CarriageReturn,
    Csi(CsiSequence),
}
