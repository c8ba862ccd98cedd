//! CSI state machine
//!
//! States driven one codepoint at a time: ground text, escape seen, CSI
//! parameter collection, and a discard state for malformed CSI bodies,
//! which are consumed through their final byte without emitting anything.
//! Escape sequences other than CSI are consumed and dropped.

use super::actions::{Action, CsiParams, CsiSequence};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Ground,
    Escape,
    Csi,
    Discard,
}

/// Streaming escape sequence parser. One instance per byte stream, fed
/// after UTF-8 decoding so multi-byte text passes through as single
/// codepoints.
#[derive(Debug)]
pub struct Parser {
    state: State,
    params: CsiParams,
    /// Digits accumulated for the parameter being read.
    current: u32,
    /// Whether `current` has seen at least one digit.
    in_number: bool,
    private: bool,
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

impl Parser {
    pub fn new() -> Self {
        Self {
            state: State::Ground,
            params: CsiParams::default(),
            current: 0,
            in_number: false,
            private: false,
        }
    }

    /// Advance the machine by one codepoint, yielding at most one action.
    pub fn feed(&mut self, cp: u32) -> Option<Action> {
        match self.state {
            State::Ground => self.ground(cp),
            State::Escape => self.escape(cp),
            State::Csi => self.csi(cp),
            State::Discard => self.discard(cp),
        }
    }

    fn ground(&mut self, cp: u32) -> Option<Action> {
        match cp {
            0x1b => {
                self.state = State::Escape;
                None
            }
            // BEL is the only codepoint swallowed outright
            0x07 => None,
            0x08 => Some(Action::Backspace),
            0x09 => Some(Action::Tab),
            0x0a => Some(Action::Linefeed),
            0x0d => Some(Action::CarriageReturn),
            // Everything else is a print; the screen decides whether the
            // font has a glyph for it
            cp => Some(Action::Print(cp)),
        }
    }

    fn escape(&mut self, cp: u32) -> Option<Action> {
        match cp {
            u if u == '[' as u32 => {
                self.state = State::Csi;
                self.params = CsiParams::default();
                self.current = 0;
                self.in_number = false;
                self.private = false;
                None
            }
            // A second ESC restarts the sequence
            0x1b => None,
            _ => {
                tracing::trace!(codepoint = cp, "unsupported escape, dropped");
                self.state = State::Ground;
                None
            }
        }
    }

    fn csi(&mut self, cp: u32) -> Option<Action> {
        match cp {
            0x30..=0x39 => {
                let digit = cp - 0x30;
                self.current = self.current.saturating_mul(10).saturating_add(digit);
                self.in_number = true;
                None
            }
            u if u == ';' as u32 => {
                // An empty slot still contributes a zero parameter
                self.params.push(self.current);
                self.current = 0;
                self.in_number = false;
                None
            }
            u if u == '?' as u32 => {
                // Valid anywhere in the body; digits seen so far become a
                // finished parameter, as in `ESC [ 1 ? 25 l`
                if self.in_number {
                    self.params.push(self.current);
                    self.current = 0;
                    self.in_number = false;
                }
                self.private = true;
                None
            }
            0x1b => {
                self.state = State::Escape;
                None
            }
            0x40..=0x7e => {
                if self.in_number || !self.params.is_empty() {
                    self.params.push(self.current);
                }
                if self.params.truncated() {
                    tracing::warn!(final_byte = cp as u8, "csi parameter list truncated");
                }
                self.state = State::Ground;
                Some(Action::Csi(CsiSequence {
                    private: self.private,
                    params: self.params,
                    final_byte: cp as u8,
                }))
            }
            _ => {
                tracing::trace!(codepoint = cp, "malformed csi, discarding sequence");
                self.state = State::Discard;
                None
            }
        }
    }

    /// Swallow the rest of a malformed CSI body so its bytes never reach
    /// the grid as text.
    fn discard(&mut self, cp: u32) -> Option<Action> {
        match cp {
            0x1b => self.state = State::Escape,
            0x40..=0x7e => self.state = State::Ground,
            _ => {}
        }
        None
    }
}
