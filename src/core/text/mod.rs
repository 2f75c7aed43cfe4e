//! Text helpers (ANSI stripping, width calculations).
//!
//! These helpers are pure (string in/string out) so nodes can depend on them without importing
//! anything from the render layer.

pub mod ansi;
pub mod width;

pub use ansi::strip_ansi;
pub use width::{grapheme_width, visible_width};
