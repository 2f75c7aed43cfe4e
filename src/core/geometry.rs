//! Cell-space rectangles.

/// A rectangle in cell coordinates. `right` and `bottom` are exclusive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Rect {
    pub left: usize,
    pub top: usize,
    pub right: usize,
    pub bottom: usize,
}

impl Rect {
    pub fn new(left: usize, top: usize, right: usize, bottom: usize) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// A rectangle from its origin and size.
    pub fn sized(left: usize, top: usize, width: usize, height: usize) -> Self {
        Self::new(left, top, left + width, top + height)
    }

    /// The full area of a `width` x `height` surface.
    pub fn of_size(width: usize, height: usize) -> Self {
        Self::new(0, 0, width, height)
    }

    /// Left, top, right and bottom, in that order.
    pub fn points(&self) -> (usize, usize, usize, usize) {
        (self.left, self.top, self.right, self.bottom)
    }

    pub fn width(&self) -> usize {
        self.right.saturating_sub(self.left)
    }

    pub fn height(&self) -> usize {
        self.bottom.saturating_sub(self.top)
    }

    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }

    pub fn contains(&self, col: usize, row: usize) -> bool {
        (self.left..self.right).contains(&col) && (self.top..self.bottom).contains(&row)
    }

    /// Shrink the rectangle so it lies within a `width` x `height` surface.
    pub fn clamp_to(&self, width: usize, height: usize) -> Rect {
        let left = self.left.min(width);
        let top = self.top.min(height);
        Rect {
            left,
            top,
            right: self.right.clamp(left, width),
            bottom: self.bottom.clamp(top, height),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Rect;

    #[test]
    fn height_uses_vertical_edges() {
        let rect = Rect::new(2, 1, 10, 4);
        assert_eq!(rect.width(), 8);
        assert_eq!(rect.height(), 3);
        assert_eq!(rect.points(), (2, 1, 10, 4));
    }

    #[test]
    fn clamp_keeps_rect_inside_surface() {
        let rect = Rect::new(5, 5, 50, 50).clamp_to(20, 10);
        assert_eq!(rect, Rect::new(5, 5, 20, 10));
        let outside = Rect::new(30, 30, 40, 40).clamp_to(20, 10);
        assert!(outside.is_empty());
    }

    #[test]
    fn inverted_rect_is_empty() {
        assert!(Rect::new(5, 5, 2, 9).is_empty());
    }

    #[test]
    fn contains_excludes_right_and_bottom_edges() {
        let rect = Rect::new(2, 1, 4, 3);
        assert!(rect.contains(2, 1));
        assert!(rect.contains(3, 2));
        assert!(!rect.contains(4, 2));
        assert!(!rect.contains(3, 3));
        assert!(!rect.contains(1, 1));
        assert!(!Rect::new(5, 5, 2, 9).contains(5, 5));
    }
}
