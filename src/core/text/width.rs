//! Grapheme width and visible width helpers.

use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

use super::ansi::strip_ansi;

pub const TAB_WIDTH: usize = 4;

/// Terminal columns taken by a single grapheme cluster.
pub fn grapheme_width(grapheme: &str) -> usize {
    if grapheme == "\t" {
        return TAB_WIDTH;
    }
    // Clusters like flags or ZWJ emoji report their parts' widths; a cell holds at most two.
    UnicodeWidthStr::width(grapheme).min(2)
}

/// Columns taken by `input` once escape sequences are removed.
pub fn visible_width(input: &str) -> usize {
    if input.is_empty() {
        return 0;
    }
    strip_ansi(input).graphemes(true).map(grapheme_width).sum()
}

#[cfg(test)]
mod tests {
    use super::{grapheme_width, visible_width};

    #[test]
    fn ansi_ignored_in_width() {
        assert_eq!(visible_width("hi\x1b[31m!!\x1b[0m"), 4);
    }

    #[test]
    fn wide_graphemes_take_two_columns() {
        assert_eq!(grapheme_width("界"), 2);
        assert_eq!(visible_width("a界b"), 4);
    }

    #[test]
    fn combining_marks_do_not_add_width() {
        assert_eq!(visible_width("e\u{301}"), 1);
    }
}
