//! Escape sequence parser
//!
//! Turns the decoded codepoint stream into [`Action`]s: printable text,
//! the handled C0 controls, and CSI sequences with their parameters. The
//! parser only recognizes structure; what each sequence does to the screen
//! is decided by [`crate::terminal::Terminal`].

mod actions;
mod state;

pub use actions::{Action, CsiParams, CsiSequence, MAX_CSI_PARAMS};
pub use state::Parser;
