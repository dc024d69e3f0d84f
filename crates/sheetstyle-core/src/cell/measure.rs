//! Approximate text dimensions used by AutoFit
//!
//! Widths and heights derive from the font size through empirically fitted
//! constants, not real font metrics.

use crate::style::{character_height, character_width};

/// Width needed to show `text_len` characters in a row of `row_height`
///
/// When the row is tall enough for several lines the width is divided
/// between them.
pub fn required_width(text_len: usize, font_size: f64, row_height: f64) -> f64 {
    if text_len == 0 {
        return 0.0;
    }

    let char_height = character_height(font_size);
    let mut line_count = 0.0;
    if char_height > 0.0 {
        line_count = (row_height / char_height).floor();
    }
    if line_count <= 0.0 {
        line_count = 1.0;
    }

    let width = character_width(font_size) * text_len as f64;
    if line_count > 1.0 {
        width / line_count
    } else {
        width
    }
}

/// Height needed to show `text_len` characters wrapped in `column_width`
///
/// Without wrapping, or when the text fits on one line, no extra height is
/// required and 0 is returned.
pub fn required_height(text_len: usize, font_size: f64, column_width: f64, wrap: bool) -> f64 {
    if !wrap || text_len == 0 || column_width <= 0.0 {
        return 0.0;
    }

    let width = character_width(font_size) * text_len as f64;
    if column_width >= width {
        return 0.0;
    }
    let line_count = (width / column_width).ceil();
    character_height(font_size) * line_count
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_width() {
        assert_eq!(required_width(0, 11.0, 15.0), 0.0);

        let one_line = required_width(10, 11.0, 15.0);
        assert!((one_line - character_width(11.0) * 10.0).abs() < 1e-9);

        let tall_row = character_height(11.0) * 2.5;
        let two_lines = required_width(10, 11.0, tall_row);
        assert!((two_lines - one_line / 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_required_height() {
        assert_eq!(required_height(100, 11.0, 10.0, false), 0.0);
        assert_eq!(required_height(1, 11.0, 10.0, true), 0.0);

        let width = character_width(11.0) * 100.0;
        let height = required_height(100, 11.0, width / 2.5, true);
        assert!((height - character_height(11.0) * 3.0).abs() < 1e-9);
    }
}
