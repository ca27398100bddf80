//! Anchor resolution for content boxes inside widget rectangles.

use crate::geometry::{Point, Rect};
use crate::policy::{HorizontalAlign, Justification, VerticalBand};

/// Bottom-left corner at which a `content_width` x `content_height` box is
/// drawn inside `frame` under `mode`.
///
/// In each dimension where the content is at least as large as the frame,
/// the anchor collapses to the frame origin. Nothing is clipped.
///
/// Horizontally, `Left` is pinned to the frame's left edge; `Middle` and
/// `Right` center or right-align narrower content. Vertically, the bottom
/// band sits on the frame's bottom edge, the top band hugs the top edge and
/// the center band is centered.
///
/// # Examples
///
/// ```
/// use pdf_filler::geometry::{Point, Rect};
/// use pdf_filler::layout::resolve_anchor;
/// use pdf_filler::policy::Justification;
///
/// let frame = Rect::new(100.0, 200.0, 80.0, 40.0);
/// let anchor = resolve_anchor(Justification::CenterMiddle, &frame, 40.0, 20.0);
/// assert_eq!(anchor, Point::new(120.0, 210.0));
/// ```
pub fn resolve_anchor(mode: Justification, frame: &Rect, content_width: f32, content_height: f32) -> Point {
    let x = if content_width >= frame.width {
        frame.x
    } else {
        let slack = frame.width - content_width;
        match mode.align() {
            HorizontalAlign::Left => frame.x,
            HorizontalAlign::Middle => frame.x + slack / 2.0,
            HorizontalAlign::Right => frame.x + slack,
        }
    };

    let y = if content_height >= frame.height {
        frame.y
    } else {
        let slack = frame.height - content_height;
        match mode.band() {
            VerticalBand::Bottom => frame.y,
            VerticalBand::Center => frame.y + slack / 2.0,
            VerticalBand::Top => frame.y + slack,
        }
    };

    Point::new(x, y)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame() -> Rect {
        Rect::new(10.0, 20.0, 100.0, 50.0)
    }

    #[test]
    fn test_bottom_band() {
        let f = frame();
        assert_eq!(resolve_anchor(Justification::BottomLeft, &f, 40.0, 10.0), Point::new(10.0, 20.0));
        assert_eq!(resolve_anchor(Justification::BottomMiddle, &f, 40.0, 10.0), Point::new(40.0, 20.0));
        assert_eq!(resolve_anchor(Justification::BottomRight, &f, 40.0, 10.0), Point::new(70.0, 20.0));
    }

    #[test]
    fn test_top_band() {
        let f = frame();
        assert_eq!(resolve_anchor(Justification::TopLeft, &f, 40.0, 10.0), Point::new(10.0, 60.0));
        assert_eq!(resolve_anchor(Justification::TopMiddle, &f, 40.0, 10.0), Point::new(40.0, 60.0));
        assert_eq!(resolve_anchor(Justification::TopRight, &f, 40.0, 10.0), Point::new(70.0, 60.0));
    }

    #[test]
    fn test_center_band() {
        let f = frame();
        assert_eq!(resolve_anchor(Justification::CenterLeft, &f, 40.0, 10.0), Point::new(10.0, 40.0));
        assert_eq!(resolve_anchor(Justification::CenterMiddle, &f, 40.0, 10.0), Point::new(40.0, 40.0));
        assert_eq!(resolve_anchor(Justification::CenterRight, &f, 40.0, 10.0), Point::new(70.0, 40.0));
    }

    #[test]
    fn test_oversized_content_collapses_to_origin() {
        let f = frame();
        for mode in Justification::ALL {
            assert_eq!(resolve_anchor(mode, &f, 100.0, 50.0), Point::new(10.0, 20.0));
            assert_eq!(resolve_anchor(mode, &f, 500.0, 500.0), Point::new(10.0, 20.0));
        }
    }

    #[test]
    fn test_collapse_is_per_dimension() {
        let f = frame();
        // Too wide, short enough to move vertically.
        assert_eq!(resolve_anchor(Justification::TopRight, &f, 120.0, 10.0), Point::new(10.0, 60.0));
        // Too tall, narrow enough to move horizontally.
        assert_eq!(resolve_anchor(Justification::CenterMiddle, &f, 40.0, 60.0), Point::new(40.0, 20.0));
    }
}
