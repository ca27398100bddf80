//! Sizing and placement of field content inside widget rectangles.

pub mod placement;
pub mod text_fit;

pub use placement::resolve_anchor;
pub use text_fit::{fit_font_size, fit_single_line, split_lines, LINE_SPACING};
