//! Node trait and sizing properties.

use std::fmt;
use std::sync::Arc;

use crate::core::geometry::Rect;
use crate::render::Buffer;

pub type SizeFn = Arc<dyn Fn(usize) -> usize + Send + Sync>;

/// How much of the available space along one axis a node wants.
#[derive(Clone)]
pub enum Size {
    /// An exact number of cells.
    Cells(usize),
    /// A fraction of the available cells; `1.0` fills the axis.
    Fraction(f32),
    /// Computed from the available cells.
    Computed(SizeFn),
    /// Just enough for the node's content.
    FitContent,
}

impl Size {
    pub fn computed(f: impl Fn(usize) -> usize + Send + Sync + 'static) -> Self {
        Size::Computed(Arc::new(f))
    }

    /// Resolve against the available cells. The result never exceeds `available`.
    pub fn resolve(&self, available: usize, content: usize) -> usize {
        let cells = match self {
            Size::Cells(cells) => *cells,
            Size::Fraction(fraction) => {
                let fraction = if fraction.is_finite() {
                    fraction.max(0.0)
                } else {
                    0.0
                };
                (available as f64 * f64::from(fraction)).floor() as usize
            }
            Size::Computed(f) => f(available),
            Size::FitContent => content,
        };
        cells.min(available)
    }
}

impl Default for Size {
    fn default() -> Self {
        Size::Fraction(1.0)
    }
}

impl fmt::Debug for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Size::Cells(cells) => f.debug_tuple("Cells").field(cells).finish(),
            Size::Fraction(fraction) => f.debug_tuple("Fraction").field(fraction).finish(),
            Size::Computed(_) => f.write_str("Computed(..)"),
            Size::FitContent => f.write_str("FitContent"),
        }
    }
}

impl PartialEq for Size {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Size::Cells(a), Size::Cells(b)) => a == b,
            (Size::Fraction(a), Size::Fraction(b)) => a == b,
            (Size::Computed(a), Size::Computed(b)) => Arc::ptr_eq(a, b),
            (Size::FitContent, Size::FitContent) => true,
            _ => false,
        }
    }
}

/// Layout properties shared by every node. Both axes fill their space by default.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Properties {
    pub width: Size,
    pub height: Size,
}

/// Something that draws itself into a region of a [`Buffer`].
pub trait Node {
    fn properties(&self) -> &Properties;

    /// Unclipped `(width, height)` of the node's content.
    fn content_size(&self) -> (usize, usize) {
        (0, 0)
    }

    /// The region this node occupies within `available`, anchored at its top-left corner.
    fn layout(&self, available: Rect) -> Rect {
        let (content_width, content_height) = self.content_size();
        let props = self.properties();
        Rect::sized(
            available.left,
            available.top,
            props.width.resolve(available.width(), content_width),
            props.height.resolve(available.height(), content_height),
        )
    }

    /// Draw into `rect`. Nodes never write outside `rect` or the buffer.
    fn render(&mut self, rect: Rect, buffer: &mut Buffer);
}

#[cfg(test)]
mod tests {
    use super::{Properties, Size};

    #[test]
    fn sizes_resolve_and_clamp() {
        assert_eq!(Size::Cells(5).resolve(3, 0), 3);
        assert_eq!(Size::Fraction(0.5).resolve(9, 0), 4);
        assert_eq!(Size::Fraction(-1.0).resolve(9, 0), 0);
        assert_eq!(Size::FitContent.resolve(10, 7), 7);
        assert_eq!(Size::computed(|available| available / 3).resolve(12, 0), 4);
        assert_eq!(Size::computed(|available| available * 2).resolve(12, 0), 12);
    }

    #[test]
    fn default_properties_fill_both_axes() {
        let props = Properties::default();
        assert_eq!(props.width, Size::Fraction(1.0));
        assert_eq!(props.height, Size::Fraction(1.0));
    }
}
