//! Core interfaces and types.

pub mod geometry;
pub mod node;
pub mod output;
pub mod style;
pub mod terminal;
pub mod text;
