//! A single terminal cell.

use std::fmt;

use crate::core::style::Style;

/// A grapheme and the style it is drawn with.
///
/// An empty symbol marks the trailing half of a wide grapheme in the cell to its left.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Pixel {
    pub symbol: String,
    pub style: Style,
}

impl Pixel {
    pub fn new(symbol: impl Into<String>, style: Style) -> Self {
        Self {
            symbol: symbol.into(),
            style,
        }
    }

    /// Replace the symbol, and the style when one is given.
    pub fn set(&mut self, symbol: impl Into<String>, style: Option<Style>) {
        self.symbol = symbol.into();
        if let Some(style) = style {
            self.style = style;
        }
    }

    pub fn is_continuation(&self) -> bool {
        self.symbol.is_empty()
    }
}

impl fmt::Display for Pixel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}\x1b[0m", self.style, self.symbol)
    }
}

#[cfg(test)]
mod tests {
    use super::Pixel;
    use crate::core::style::{ColorCode, Style};

    #[test]
    fn display_wraps_symbol_in_style_and_reset() {
        let pixel = Pixel::new("x", Style::default().fg(ColorCode::GREEN));
        assert_eq!(pixel.to_string(), "\x1b[32mx\x1b[0m");
    }

    #[test]
    fn set_without_style_keeps_existing_style() {
        let style = Style::default().bold();
        let mut pixel = Pixel::new("a", style);
        pixel.set("b", None);
        assert_eq!(pixel, Pixel::new("b", style));
        pixel.set("c", Some(Style::default()));
        assert_eq!(pixel.style, Style::default());
    }
}
