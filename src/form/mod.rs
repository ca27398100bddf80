//! Form surface: the primitives the populator drives.
//!
//! [`FormSurface`] is the seam between the decision logic in
//! [`crate::populate`] and a concrete document. [`AcroFormDocument`]
//! implements it over `lopdf`.

pub mod acroform;
pub mod appearance;

use std::sync::Arc;

use crate::error::Result;
use crate::fonts::PdfFont;
use crate::geometry::Rect;
use crate::policy::{FontColor, HorizontalAlign};
use crate::writer::image_handler::{ImageData, ImagePlacement};

pub use acroform::AcroFormDocument;
pub use appearance::{DefaultAppearance, FieldFlags};

/// Geometry of a field's first widget.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Widget {
    /// Widget rectangle in page space
    pub rect: Rect,
    /// 1-based page number
    pub page: u32,
}

/// Font size written into a field's default appearance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontSize {
    /// Viewer picks the size (`0 Tf`)
    Auto,
    /// Fixed point size
    Fixed(u32),
}

impl FontSize {
    /// Policy size where 0 means autoscale.
    pub fn from_policy(size: u32) -> Self {
        if size == 0 {
            FontSize::Auto
        } else {
            FontSize::Fixed(size)
        }
    }

    /// Value for the `Tf` operand.
    pub fn points(self) -> f32 {
        match self {
            FontSize::Auto => 0.0,
            FontSize::Fixed(size) => size as f32,
        }
    }
}

/// A single line of text drawn on the page content.
#[derive(Debug, Clone)]
pub struct TextBlock {
    /// Text to draw
    pub text: String,
    /// Font to draw with
    pub font: Arc<PdfFont>,
    /// Point size
    pub size: f32,
    /// Fill color
    pub color: FontColor,
    /// Start of the baseline, x
    pub x: f32,
    /// Start of the baseline, y
    pub baseline: f32,
}

/// Field lookups and output primitives over a live form.
///
/// Field names are full names and match exactly. Only the first widget of a
/// field is ever used.
pub trait FormSurface {
    /// Whether the form has a terminal field called `name`.
    fn has_field(&self, name: &str) -> bool;

    /// Rectangle and page of the field's first widget, read from the document now.
    ///
    /// Fails with `MissingWidgetGeometry` when the field has no widget or the
    /// widget is not on any page.
    fn widget(&self, name: &str) -> Result<Widget>;

    /// Set the field value.
    fn set_text_value(&mut self, name: &str, value: &str) -> Result<()>;

    /// Set the field font, keeping its current size.
    fn set_font(&mut self, name: &str, font: &PdfFont) -> Result<()>;

    /// Set the field font size.
    fn set_font_size(&mut self, name: &str, size: FontSize) -> Result<()>;

    /// Set the field text color.
    fn set_color(&mut self, name: &str, color: FontColor) -> Result<()>;

    /// Mark the field read-only.
    fn set_read_only(&mut self, name: &str) -> Result<()>;

    /// Set horizontal quadding.
    fn set_justification(&mut self, name: &str, align: HorizontalAlign) -> Result<()>;

    /// Remove the field and its widgets from the form and the pages.
    fn remove_field(&mut self, name: &str) -> Result<()>;

    /// Draw an image on page `page` (1-based).
    fn draw_image_at(&mut self, page: u32, image: &ImageData, placement: &ImagePlacement) -> Result<()>;

    /// Draw one line of text on page `page` (1-based).
    fn draw_text_block_at(&mut self, page: u32, block: &TextBlock) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_font_size_from_policy() {
        assert_eq!(FontSize::from_policy(0), FontSize::Auto);
        assert_eq!(FontSize::from_policy(11), FontSize::Fixed(11));
        assert_eq!(FontSize::Auto.points(), 0.0);
        assert_eq!(FontSize::Fixed(11).points(), 11.0);
    }
}
