//! Colors and the 16-entry ANSI palette
//!
//! The core works in normalized RGBA so the renderer can hand values straight
//! to the GPU. The palette is an explicit value passed in at screen
//! construction, never process-global state, so independent sessions and
//! tests can carry distinct palettes.

use serde::{Deserialize, Serialize};

/// A normalized RGBA color, each channel in `[0.0, 1.0]`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Rgba {
    /// Fully transparent black, the color of an untouched cell.
    pub const TRANSPARENT: Rgba = Rgba {
        r: 0.0,
        g: 0.0,
        b: 0.0,
        a: 0.0,
    };

    pub fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Normalize 8-bit channels into `[0.0, 1.0]`.
    pub fn from_u8(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self {
            r: r as f32 / 255.0,
            g: g as f32 / 255.0,
            b: b as f32 / 255.0,
            a: a as f32 / 255.0,
        }
    }
}

/// The 16 fixed ANSI colors: entries 0-7 are addressed by SGR 30-37/40-47,
/// entries 8-15 by the bright variants 90-97/100-107.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Palette([Rgba; 16]);

impl Palette {
    pub fn new(entries: [Rgba; 16]) -> Self {
        Self(entries)
    }

    pub fn get(&self, index: usize) -> Rgba {
        self.0[index]
    }
}

impl Default for Palette {
    /// Typical xterm defaults.
    fn default() -> Self {
        Self([
            Rgba::from_u8(0, 0, 0, 255),       // black
            Rgba::from_u8(205, 0, 0, 255),     // red
            Rgba::from_u8(0, 205, 0, 255),     // green
            Rgba::from_u8(205, 205, 0, 255),   // yellow
            Rgba::from_u8(0, 0, 238, 255),     // blue
            Rgba::from_u8(205, 0, 205, 255),   // magenta
            Rgba::from_u8(0, 205, 205, 255),   // cyan
            Rgba::from_u8(229, 229, 229, 255), // white
            Rgba::from_u8(127, 127, 127, 255), // bright black
            Rgba::from_u8(255, 0, 0, 255),     // bright red
            Rgba::from_u8(0, 255, 0, 255),     // bright green
            Rgba::from_u8(255, 255, 0, 255),   // bright yellow
            Rgba::from_u8(92, 92, 255, 255),   // bright blue
            Rgba::from_u8(255, 0, 255, 255),   // bright magenta
            Rgba::from_u8(0, 255, 255, 255),   // bright cyan
            Rgba::from_u8(255, 255, 255, 255), // bright white
        ])
    }
}
