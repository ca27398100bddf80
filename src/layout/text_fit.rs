//! Font size fitting for fixed widget rectangles.

use crate::fonts::FontMetrics;

/// Line height as a multiple of the first line's ascent-to-descent span.
pub const LINE_SPACING: f32 = 1.5;

/// Largest integer size at most `start_size` at which `text` fits `width` x `height`.
///
/// Each non-empty line wraps into `ceil(line_width / width)` rows (at least
/// one). A size is accepted when the rows available, `floor(height /
/// line_height)`, exceed the rows required. The search walks down one point
/// at a time and bottoms out at 1. Blank text returns `start_size` as is.
///
/// # Examples
///
/// ```
/// use pdf_filler::fonts::FontRegistry;
/// use pdf_filler::layout::fit_font_size;
///
/// let fonts = FontRegistry::default();
/// let helvetica = fonts.resolve(None).unwrap();
/// let size = fit_font_size("First line\r\nSecond line", 120.0, 60.0, helvetica.as_ref(), 12);
/// assert!((1..=12).contains(&size));
/// ```
pub fn fit_font_size<M: FontMetrics + ?Sized>(
    text: &str,
    width: f32,
    height: f32,
    metrics: &M,
    start_size: u32,
) -> u32 {
    if text.trim().is_empty() {
        return start_size;
    }

    let lines = split_lines(text);
    let Some(first) = lines.first() else {
        return start_size;
    };

    let mut size = start_size.max(1);
    while size > 1 {
        let pts = size as f32;
        let rows_required = lines
            .iter()
            .map(|line| wrapped_rows(metrics.width(line, pts), width))
            .fold(0usize, usize::saturating_add);

        let line_height = LINE_SPACING * (metrics.ascent(first, pts) - metrics.descent(first, pts));
        // No vertical extent means nothing constrains the size.
        if line_height <= 0.0 {
            return size;
        }
        let rows_available = (height / line_height).floor();

        if rows_available > rows_required as f32 {
            return size;
        }
        size -= 1;
    }
    size
}

/// Largest integer size at most `start_size` at which `text` fits on one line.
///
/// Used for text drawn directly on the page, where there is no wrapping and
/// no extra line spacing: the advance width must fit `width` and the
/// ascent-to-descent span must fit `height`. Bottoms out at 1.
pub fn fit_single_line<M: FontMetrics + ?Sized>(
    text: &str,
    width: f32,
    height: f32,
    metrics: &M,
    start_size: u32,
) -> u32 {
    let mut size = start_size.max(1);
    while size > 1 {
        let pts = size as f32;
        let fits_width = metrics.width(text, pts) <= width;
        let fits_height = metrics.ascent(text, pts) - metrics.descent(text, pts) <= height;
        if fits_width && fits_height {
            break;
        }
        size -= 1;
    }
    size
}

/// Split on `\r\n` or `\n`, dropping empty lines.
pub fn split_lines(text: &str) -> Vec<&str> {
    text.split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .filter(|line| !line.is_empty())
        .collect()
}

fn wrapped_rows(line_width: f32, box_width: f32) -> usize {
    let rows = (line_width / box_width).ceil();
    if rows.is_nan() {
        return 1;
    }
    // Float to int casts saturate, so an infinite row count stays finite.
    (rows as usize).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Every character is `advance` wide at size 12; lines are `span` tall at size 12.
    struct Scaled {
        advance: f32,
        span: f32,
    }

    impl FontMetrics for Scaled {
        fn width(&self, text: &str, size: f32) -> f32 {
            text.chars().count() as f32 * self.advance * size / 12.0
        }
        fn ascent(&self, _text: &str, size: f32) -> f32 {
            self.span * 0.75 * size / 12.0
        }
        fn descent(&self, _text: &str, size: f32) -> f32 {
            -self.span * 0.25 * size / 12.0
        }
    }

    #[test]
    fn test_split_lines() {
        assert_eq!(split_lines("a\r\n\r\nb\nc\r\n"), vec!["a", "b", "c"]);
        assert!(split_lines("").is_empty());
    }

    #[test]
    fn test_blank_text_keeps_start_size() {
        let m = Scaled { advance: 10.0, span: 10.0 };
        assert_eq!(fit_font_size("", 10.0, 10.0, &m, 9), 9);
        assert_eq!(fit_font_size(" \r\n ", 10.0, 10.0, &m, 9), 9);
    }

    #[test]
    fn test_fits_at_start_size() {
        let m = Scaled { advance: 5.0, span: 10.0 };
        // At 12: one row needed, lines 15 tall, floor(100/15) = 6 rows.
        assert_eq!(fit_font_size("short", 200.0, 100.0, &m, 12), 12);
    }

    #[test]
    fn test_shrinks_until_rows_fit() {
        let m = Scaled { advance: 10.0, span: 10.0 };
        // Two rows needed up to size 24; three rows of 1.25*size must fit 40.
        assert_eq!(fit_font_size("AAAAAAAAAA\r\nBB", 200.0, 40.0, &m, 12), 10);
    }

    #[test]
    fn test_floor_is_one() {
        let m = Scaled { advance: 10.0, span: 10.0 };
        assert_eq!(fit_font_size("X", 1.0, 1.0, &m, 12), 1);
        assert_eq!(fit_font_size("X", 0.0, 0.0, &m, 12), 1);
    }

    #[test]
    fn test_zero_start_size_is_treated_as_one() {
        let m = Scaled { advance: 10.0, span: 10.0 };
        assert_eq!(fit_font_size("X", 100.0, 100.0, &m, 0), 1);
    }

    #[test]
    fn test_single_line_fit() {
        let m = Scaled { advance: 10.0, span: 12.0 };
        // Width: 5 chars * 10 * s/12 <= 40 -> s <= 9.6
        assert_eq!(fit_single_line("ABCDE", 40.0, 100.0, &m, 12), 9);
        // Height: 12 * s/12 <= 6 -> s <= 6
        assert_eq!(fit_single_line("A", 400.0, 6.0, &m, 12), 6);
        assert_eq!(fit_single_line("A", 400.0, 400.0, &m, 12), 12);
    }
}
