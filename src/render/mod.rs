//! Rendering pipeline: cells, the screen buffer, and its diff renderer.

pub mod buffer;
pub mod pixel;

pub use buffer::{Buffer, BufferView};
pub use pixel::Pixel;
