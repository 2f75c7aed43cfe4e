//! Built-in nodes.

pub mod text;

pub use text::Text;
