//! Terminal UI toolkit: ANSI styles, a diffing screen buffer, nodes, and a CSS engine.
//!
//! Invariant: single output gate: only `core::output::OutputGate::flush(..)` writes to the
//! terminal.
//!
//! # Public API Overview
//! - Compose [`Style`]s and parse them back from SGR sequences.
//! - Draw [`Node`]s such as [`Text`] into a [`Buffer`] and write only the changed cells.
//! - Tokenize and parse CSS into a [`Stylesheet`], then read node [`Properties`] and styles
//!   out of its declarations.
//! - Drive a real terminal through [`ProcessTerminal`], or render headless into a
//!   [`MemoryTerminal`].

pub mod config;
pub mod error;
pub mod logging;

pub mod core;
pub mod css;
pub mod platform;
pub mod render;
pub mod widgets;

/// Error types.
pub use crate::error::{CssError, StyleError, StylesheetError};

/// Styling primitives.
pub use crate::core::style::{Attr, Attrs, ColorCode, Style};

/// Geometry and the node contract.
pub use crate::core::geometry::Rect;
pub use crate::core::node::{Node, Properties, Size};

/// Screen buffer.
pub use crate::render::{Buffer, BufferView, Pixel};

/// Built-in nodes.
pub use crate::widgets::Text;

/// CSS parsing and the stylesheet object model.
pub use crate::css::{
    parse_declaration, parse_rule, parse_rule_list, parse_stylesheet, Declaration, Rule,
    Stylesheet,
};

/// Terminal interfaces and implementations.
pub use crate::core::output::{OutputGate, TerminalCmd};
pub use crate::core::terminal::{Terminal, TerminalGuard};
pub use crate::platform::MemoryTerminal;
#[cfg(unix)]
pub use crate::platform::ProcessTerminal;

/// Visible width helper that ignores ANSI control sequences.
pub use crate::core::text::width::visible_width;
