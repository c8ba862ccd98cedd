//! Screen model
//!
//! The terminal grid and its supporting types: cells, colors, the scroll
//! ring, and serializable frame snapshots for the render side.

mod cell;
mod color;
mod ring;
mod screen;
mod snapshot;

pub use cell::Cell;
pub use color::{Palette, Rgba};
pub use ring::RowRing;
pub use screen::{ClearMode, Cursor, ScreenBuffer, ScreenConfig};
pub use snapshot::{CursorSnapshot, Frame};
