//! Terminal executor
//!
//! Owns one screen plus the decoder and parser for its byte stream, and maps
//! parsed [`Action`]s onto screen operations. This is the single entry point
//! for child output: the session reader thread feeds raw PTY bytes in and
//! takes frames out.

use std::sync::Arc;

use crate::core::{ClearMode, Frame, ScreenBuffer, ScreenConfig};
use crate::decoder::{Decoded, Utf8Decoder};
use crate::glyph::GlyphSource;
use crate::parser::{Action, CsiSequence, Parser};

/// A terminal: decoder, parser, and screen glued together.
pub struct Terminal {
    screen: ScreenBuffer,
    parser: Parser,
    decoder: Utf8Decoder,
}

impl Terminal {
    pub fn new(
        cols: usize,
        rows: usize,
        config: ScreenConfig,
        glyphs: Arc<dyn GlyphSource>,
    ) -> Self {
        Self {
            screen: ScreenBuffer::new(cols, rows, config, glyphs),
            parser: Parser::new(),
            decoder: Utf8Decoder::new(),
        }
    }

    pub fn screen(&self) -> &ScreenBuffer {
        &self.screen
    }

    pub fn screen_mut(&mut self) -> &mut ScreenBuffer {
        &mut self.screen
    }

    pub fn frame(&self) -> Frame {
        Frame::from_screen(&self.screen)
    }

    /// Feed a chunk of raw child output. Chunk boundaries are arbitrary;
    /// decoder and parser state survive across calls.
    pub fn process_bytes(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            match self.decoder.feed(byte) {
                Decoded::Codepoint(cp) => {
                    if let Some(action) = self.parser.feed(cp) {
                        self.apply(action);
                    }
                }
                Decoded::Invalid => {
                    tracing::warn!(byte, "invalid utf-8 byte dropped");
                }
                Decoded::None => {}
            }
        }
    }

    /// Discard all content and adopt the new geometry. Parser and decoder
    /// state carry over so a sequence split across a resize still parses.
    pub fn resize(&mut self, cols: usize, rows: usize) {
        self.screen.resize(cols, rows);
    }

    fn apply(&mut self, action: Action) {
        match action {
            Action::Print(cp) => self.screen.put(cp),
            Action::Backspace => self.screen.backspace(),
            Action::Tab => self.screen.tab(),
            Action::Linefeed => self.screen.linefeed(),
            Action::CarriageReturn => self.screen.carriage_return(),
            Action::Csi(seq) => self.dispatch_csi(seq),
        }
    }

    fn dispatch_csi(&mut self, seq: CsiSequence) {
        if seq.private {
            tracing::trace!(final_byte = seq.final_byte, "private csi ignored");
            return;
        }
        let params = seq.params;
        match seq.final_byte {
            b'A' => self.screen.move_up(params.get_or(0, 1)),
            b'B' => self.screen.move_down(params.get_or(0, 1)),
            b'C' => self.screen.move_right(params.get_or(0, 1)),
            b'D' => self.screen.move_left(params.get_or(0, 1)),
            b'H' => self.screen.move_to(params.get_or(0, 1), params.get_or(1, 1)),
            b'J' => match ClearMode::from_param(params.get_or(0, 0)) {
                Some(mode) => self.screen.clear_screen(mode),
                None => tracing::trace!(mode = params.get_or(0, 0), "unknown clear mode"),
            },
            b'K' => match ClearMode::from_param(params.get_or(0, 0)) {
                Some(mode) => self.screen.clear_line(mode),
                None => tracing::trace!(mode = params.get_or(0, 0), "unknown clear mode"),
            },
            b'm' => self.sgr(params.as_slice()),
            other => {
                tracing::trace!(final_byte = other, "unsupported csi ignored");
            }
        }
    }

    /// Select Graphic Rendition. An empty parameter list is a no-op; the
    /// reset form arrives as an explicit zero.
    fn sgr(&mut self, params: &[u32]) {
        for &param in params {
            match param {
                0 => {
                    self.screen.reset_fg();
                    self.screen.reset_bg();
                }
                30..=37 => self.screen.set_fg_indexed(param as usize - 30),
                90..=97 => self.screen.set_fg_indexed(param as usize - 90 + 8),
                40..=47 => self.screen.set_bg_indexed(param as usize - 40),
                100..=107 => self.screen.set_bg_indexed(param as usize - 100 + 8),
                39 => self.screen.reset_fg(),
                49 => self.screen.reset_bg(),
                other => {
                    tracing::trace!(param = other, "unsupported sgr ignored");
                }
            }
        }
    }
}
