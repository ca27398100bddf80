//! Anchor resolution bounds for all nine justification modes.

use pdf_filler::geometry::{Point, Rect};
use pdf_filler::layout::resolve_anchor;
use pdf_filler::policy::Justification;
use proptest::prelude::*;

fn any_mode() -> impl Strategy<Value = Justification> {
    prop::sample::select(Justification::ALL.to_vec())
}

#[test]
fn test_corners_of_a_box() {
    let frame = Rect::new(10.0, 20.0, 100.0, 50.0);
    assert_eq!(resolve_anchor(Justification::BottomLeft, &frame, 20.0, 10.0), Point::new(10.0, 20.0));
    assert_eq!(resolve_anchor(Justification::BottomRight, &frame, 20.0, 10.0), Point::new(90.0, 20.0));
    assert_eq!(resolve_anchor(Justification::TopLeft, &frame, 20.0, 10.0), Point::new(10.0, 60.0));
    assert_eq!(resolve_anchor(Justification::TopMiddle, &frame, 20.0, 10.0), Point::new(50.0, 60.0));
    assert_eq!(resolve_anchor(Justification::CenterRight, &frame, 20.0, 10.0), Point::new(90.0, 40.0));
}

#[test]
fn test_oversized_content_collapses_to_origin() {
    let frame = Rect::new(5.0, 5.0, 40.0, 40.0);
    for mode in Justification::ALL {
        assert_eq!(resolve_anchor(mode, &frame, 40.0, 400.0), resolve_anchor(mode, &frame, 40.0, 41.0));
        let anchor = resolve_anchor(mode, &frame, 80.0, 80.0);
        assert_eq!(anchor, Point::new(5.0, 5.0));
    }
}

proptest! {
    #[test]
    fn prop_smaller_content_stays_inside(
        mode in any_mode(),
        x in -500.0f32..500.0,
        y in -500.0f32..500.0,
        width in 1.0f32..400.0,
        height in 1.0f32..400.0,
        content_w_ratio in 0.0f32..0.99,
        content_h_ratio in 0.0f32..0.99,
    ) {
        let frame = Rect::new(x, y, width, height);
        let content_w = width * content_w_ratio;
        let content_h = height * content_h_ratio;
        let anchor = resolve_anchor(mode, &frame, content_w, content_h);

        let eps = 1e-3;
        prop_assert!(anchor.x >= x - eps && anchor.x + content_w <= x + width + eps);
        prop_assert!(anchor.y >= y - eps && anchor.y + content_h <= y + height + eps);
    }

    #[test]
    fn prop_oversized_dimension_is_origin(
        mode in any_mode(),
        width in 1.0f32..400.0,
        height in 1.0f32..400.0,
        extra in 0.0f32..100.0,
    ) {
        let frame = Rect::new(3.0, 7.0, width, height);
        let wide = resolve_anchor(mode, &frame, width + extra, height / 2.0);
        prop_assert_eq!(wide.x, 3.0);
        let tall = resolve_anchor(mode, &frame, width / 2.0, height + extra);
        prop_assert_eq!(tall.y, 7.0);
    }
}
