//! Line counting and gutter sizing for the code editor

// ─────────────────────────────────────────────────────────────────────────────
// Helper Functions
// ─────────────────────────────────────────────────────────────────────────────

/// Count the number of lines in the given text.
///
/// Returns at least 1 for empty text (representing a single empty line).
pub fn count_lines(text: &str) -> usize {
    if text.is_empty() {
        1
    } else {
        text.chars().filter(|&c| c == '\n').count() + 1
    }
}

/// Number of decimal digits needed to print `line_count`.
pub fn digit_count(line_count: usize) -> usize {
    let mut digits = 1;
    let mut rest = line_count / 10;
    while rest > 0 {
        digits += 1;
        rest /= 10;
    }
    digits
}

/// Width of the line-number gutter in points.
///
/// Monospace digits are roughly 0.6 em wide; padding keeps numbers off the
/// separator.
pub fn gutter_width(line_count: usize, font_size: f32) -> f32 {
    let char_width = font_size * 0.6;
    (char_width * digit_count(line_count) as f32 + 20.0).max(30.0)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_lines_empty() {
        assert_eq!(count_lines(""), 1);
    }

    #[test]
    fn test_count_lines_multiple_lines() {
        assert_eq!(count_lines("Line 1\nLine 2\nLine 3"), 3);
    }

    #[test]
    fn test_count_lines_trailing_newline() {
        assert_eq!(count_lines("Line 1\n"), 2);
    }

    #[test]
    fn test_digit_count() {
        assert_eq!(digit_count(0), 1);
        assert_eq!(digit_count(9), 1);
        assert_eq!(digit_count(10), 2);
        assert_eq!(digit_count(999), 3);
        assert_eq!(digit_count(1000), 4);
    }

    #[test]
    fn test_gutter_grows_with_digits() {
        let narrow = gutter_width(9, 12.0);
        let wide = gutter_width(10_000, 12.0);
        assert!(wide > narrow);
        assert!(gutter_width(1, 1.0) >= 30.0);
    }
}
