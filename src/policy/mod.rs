//! Declarative per-field rules.
//!
//! A [`FieldPolicy`] says what to do with a record field: whether a value
//! is required, how it is rendered (single-line text, multi-line text, image
//! or deferred 3D asset) and which font, color and justification apply.
//!
//! ```
//! use pdf_filler::policy::{FieldPolicy, FontColor, FontStyle, Justification};
//!
//! let policy = FieldPolicy::required().with_font(
//!     FontStyle::new()
//!         .with_type("helvetica-bold")
//!         .with_size(14)
//!         .with_color(FontColor::Yellow)
//!         .with_justification(Justification::CenterMiddle)
//!         .with_warning("gt:100"),
//! );
//! assert!(policy.font.is_some());
//! ```

pub mod justification;
pub mod warning;

use std::str::FromStr;

use serde::Deserialize;

pub use justification::{HorizontalAlign, Justification, VerticalBand};
pub use warning::WarningExpression;

/// What happens when a field has no value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum Presence {
    /// Missing value aborts the pass
    Required,
    /// Missing value removes the widget
    Optional,
    /// Missing value shows the not-available marker
    NotAvailable,
    /// Field is never touched
    Ignore,
}

/// How a present value is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub enum ContentKind {
    /// Single-line text in the widget or on the page canvas
    #[default]
    Text,
    /// Wrapped text in a multi-line widget, size fitted to the rectangle
    MultiLine,
    /// Value is an image path; the image replaces the widget
    Image,
    /// Value is a U3D/PRC path stamped in the deferred pass
    ThreeD,
}

/// Text color choices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(from = "String")]
pub enum FontColor {
    /// 0 g
    #[default]
    Black,
    /// 1 0 0 rg
    Red,
    /// 1 1 0 rg
    Yellow,
    /// 1 g
    White,
}

impl FontColor {
    /// DeviceRGB components.
    pub fn rgb(self) -> [f32; 3] {
        match self {
            FontColor::Black => [0.0, 0.0, 0.0],
            FontColor::Red => [1.0, 0.0, 0.0],
            FontColor::Yellow => [1.0, 1.0, 0.0],
            FontColor::White => [1.0, 1.0, 1.0],
        }
    }
}

impl FromStr for FontColor {
    type Err = std::convert::Infallible;

    /// Unknown names fall back to black.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_lowercase().as_str() {
            "red" => FontColor::Red,
            "yellow" => FontColor::Yellow,
            "white" => FontColor::White,
            _ => FontColor::Black,
        })
    }
}

impl From<String> for FontColor {
    fn from(s: String) -> Self {
        s.parse().unwrap_or_default()
    }
}

/// Font override for a text field.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct FontStyle {
    /// Registry name; `None` uses the configured default font
    #[serde(rename = "type")]
    pub font_type: Option<String>,
    /// Point size; 0 means autoscale
    pub size: u32,
    /// Text color
    pub color: FontColor,
    /// Placement of the text in the widget rectangle
    pub justification: Justification,
    /// Switches to the warning color when it matches the value
    pub warning: Option<WarningExpression>,
}

impl FontStyle {
    /// Default font, autoscaled, black, top-left.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the font type name. Blank names clear it.
    pub fn with_type(mut self, font_type: impl Into<String>) -> Self {
        let name = font_type.into().trim().to_lowercase();
        self.font_type = (!name.is_empty()).then_some(name);
        self
    }

    /// Set a fixed size (0 = autoscale).
    pub fn with_size(mut self, size: u32) -> Self {
        self.size = size;
        self
    }

    /// Set the color.
    pub fn with_color(mut self, color: FontColor) -> Self {
        self.color = color;
        self
    }

    /// Set the justification.
    pub fn with_justification(mut self, justification: Justification) -> Self {
        self.justification = justification;
        self
    }

    /// Attach a warning expression.
    pub fn with_warning(mut self, expression: impl Into<WarningExpression>) -> Self {
        self.warning = Some(expression.into());
        self
    }

    /// Whether the size is left to the renderer or fitter.
    pub fn is_autoscale(&self) -> bool {
        self.size == 0
    }
}

/// Rule attached to one record field.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct FieldPolicy {
    /// `None` when the field declares no presence rule
    pub presence: Option<Presence>,
    /// Rendering kind
    pub content: ContentKind,
    /// Font override; `None` keeps the default font at autoscale
    pub font: Option<FontStyle>,
    /// Image placement, independent from the text justification
    pub image_justification: Justification,
}

impl Default for FieldPolicy {
    fn default() -> Self {
        Self {
            presence: None,
            content: ContentKind::Text,
            font: None,
            image_justification: Justification::BottomLeft,
        }
    }
}

impl FieldPolicy {
    /// A policy with a presence rule and defaults elsewhere.
    pub fn with_presence(presence: Presence) -> Self {
        Self {
            presence: Some(presence),
            ..Self::default()
        }
    }

    /// Missing value aborts the pass.
    pub fn required() -> Self {
        Self::with_presence(Presence::Required)
    }

    /// Missing value removes the widget.
    pub fn optional() -> Self {
        Self::with_presence(Presence::Optional)
    }

    /// Missing value shows "N/A".
    pub fn not_available() -> Self {
        Self::with_presence(Presence::NotAvailable)
    }

    /// Never touch the field.
    pub fn ignored() -> Self {
        Self::with_presence(Presence::Ignore)
    }

    /// Render as wrapped text.
    pub fn multi_line(mut self) -> Self {
        self.content = ContentKind::MultiLine;
        self
    }

    /// Render the value as an image path.
    pub fn image(mut self) -> Self {
        self.content = ContentKind::Image;
        self
    }

    /// Defer the value as a 3D asset path.
    pub fn three_d(mut self) -> Self {
        self.content = ContentKind::ThreeD;
        self
    }

    /// Attach a font override.
    pub fn with_font(mut self, style: FontStyle) -> Self {
        self.font = Some(style);
        self
    }

    /// Set image placement.
    pub fn with_image_justification(mut self, justification: Justification) -> Self {
        self.image_justification = justification;
        self
    }

    /// True for [`Presence::Ignore`].
    pub fn is_ignored(&self) -> bool {
        self.presence == Some(Presence::Ignore)
    }
}
