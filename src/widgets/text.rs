//! Text node.

use unicode_segmentation::UnicodeSegmentation;

use crate::core::geometry::Rect;
use crate::core::node::{Node, Properties};
use crate::core::style::Style;
use crate::core::text::{grapheme_width, strip_ansi, visible_width};
use crate::core::text::width::TAB_WIDTH;
use crate::render::Buffer;

/// Plain text laid out one grapheme per cell, clipped to its rect.
///
/// Escape sequences in the text are dropped; the node's [`Style`] applies to every cell it
/// draws.
#[derive(Debug, Clone, Default)]
pub struct Text {
    text: String,
    style: Style,
    properties: Properties,
}

impl Text {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_properties(properties: Properties) -> Self {
        Self {
            properties,
            ..Self::default()
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn style(&self) -> Style {
        self.style
    }

    pub fn set_style(&mut self, style: Style) {
        self.style = style;
    }

    pub fn properties_mut(&mut self) -> &mut Properties {
        &mut self.properties
    }

    /// Append `parts` joined by `sep`, separated from existing text by `sep` as well.
    pub fn write<S: AsRef<str>>(&mut self, parts: &[S], sep: &str) {
        if !self.text.is_empty() {
            self.text.push_str(sep);
        }
        for (idx, part) in parts.iter().enumerate() {
            if idx > 0 {
                self.text.push_str(sep);
            }
            self.text.push_str(part.as_ref());
        }
    }

    pub fn clear(&mut self) {
        self.text.clear();
    }

    fn visible_lines(&self) -> Vec<String> {
        strip_ansi(&self.text)
            .split('\n')
            .map(|line| line.replace('\t', &" ".repeat(TAB_WIDTH)))
            .collect()
    }
}

impl Node for Text {
    fn properties(&self) -> &Properties {
        &self.properties
    }

    fn content_size(&self) -> (usize, usize) {
        if self.text.is_empty() {
            return (0, 0);
        }
        let lines = self.visible_lines();
        let width = lines.iter().map(|line| visible_width(line)).max().unwrap_or(0);
        (width, lines.len())
    }

    fn render(&mut self, rect: Rect, buffer: &mut Buffer) {
        let area = rect.clamp_to(buffer.width(), buffer.height());
        if area.is_empty() {
            return;
        }

        for (row, line) in (area.top..area.bottom).zip(self.visible_lines()) {
            let mut col = area.left;
            for grapheme in line.graphemes(true) {
                let width = grapheme_width(grapheme);
                if width == 0 {
                    continue;
                }
                if col + width > area.right {
                    break;
                }
                buffer.set(col, row, grapheme, self.style);
                for filler in 1..width {
                    buffer.set(col + filler, row, "", self.style);
                }
                col += width;
            }
        }
    }
}
