//! Configuration for form population.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::deferred::ThreeDDefaults;
use crate::error::Result;
use crate::policy::FontColor;

/// How multi-line fields without an explicit size are sized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub enum MultiLineSizing {
    /// One size for every multi-line field: the smallest size any of them needs
    #[default]
    Aligned,
    /// Each field fitted on its own
    PerField,
    /// Always this size
    Fixed(u32),
}

/// Baseline placement for text drawn on the page canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub enum VerticalAdjustment {
    /// Baseline sits `descent` above the resolved anchor
    #[default]
    Geometric,
    /// Center band is pulled down by `(text width / box width) * ascent`
    /// below the rectangle's vertical center; other bands as `Geometric`
    WidthRatioAscent,
}

/// Population settings.
///
/// Every field has a default, so a JSON file only needs the keys it changes:
///
/// ```
/// use pdf_filler::config::{FillConfig, MultiLineSizing};
///
/// let config: FillConfig = serde_json::from_str(r#"{"multi_line_sizing": "PerField"}"#).unwrap();
/// assert_eq!(config.multi_line_sizing, MultiLineSizing::PerField);
/// assert_eq!(config.not_available_marker, "N/A");
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct FillConfig {
    /// Registry name used when a policy names no font
    pub default_font: String,
    /// Folder scanned for TrueType/OpenType fonts
    pub font_folder: PathBuf,
    /// Starting size for multi-line fitting
    pub multi_line_start_size: u32,
    /// Starting size for autoscaled canvas text
    pub canvas_start_size: u32,
    /// Multi-line sizing strategy
    pub multi_line_sizing: MultiLineSizing,
    /// Canvas text baseline strategy
    pub vertical_adjustment: VerticalAdjustment,
    /// Color used when a warning expression matches
    pub warning_color: FontColor,
    /// Value written into empty `NotAvailable` fields
    pub not_available_marker: String,
    /// 3D annotation appearance
    pub three_d: ThreeDDefaults,
}

impl Default for FillConfig {
    fn default() -> Self {
        Self {
            default_font: "helvetica".to_string(),
            font_folder: PathBuf::from("Fonts"),
            multi_line_start_size: 9,
            canvas_start_size: 12,
            multi_line_sizing: MultiLineSizing::default(),
            vertical_adjustment: VerticalAdjustment::default(),
            warning_color: FontColor::Red,
            not_available_marker: "N/A".to_string(),
            three_d: ThreeDDefaults::default(),
        }
    }
}

impl FillConfig {
    /// Create configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a JSON configuration file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Set the default font.
    pub fn with_default_font(mut self, name: impl Into<String>) -> Self {
        self.default_font = name.into().to_lowercase();
        self
    }

    /// Set the font folder.
    pub fn with_font_folder(mut self, folder: impl Into<PathBuf>) -> Self {
        self.font_folder = folder.into();
        self
    }

    /// Set the multi-line starting size.
    pub fn with_multi_line_start_size(mut self, size: u32) -> Self {
        self.multi_line_start_size = size;
        self
    }

    /// Set the canvas starting size.
    pub fn with_canvas_start_size(mut self, size: u32) -> Self {
        self.canvas_start_size = size;
        self
    }

    /// Set the multi-line sizing strategy.
    pub fn with_multi_line_sizing(mut self, sizing: MultiLineSizing) -> Self {
        self.multi_line_sizing = sizing;
        self
    }

    /// Set the canvas baseline strategy.
    pub fn with_vertical_adjustment(mut self, adjustment: VerticalAdjustment) -> Self {
        self.vertical_adjustment = adjustment;
        self
    }

    /// Set the warning color.
    pub fn with_warning_color(mut self, color: FontColor) -> Self {
        self.warning_color = color;
        self
    }

    /// Set the not-available marker.
    pub fn with_not_available_marker(mut self, marker: impl Into<String>) -> Self {
        self.not_available_marker = marker.into();
        self
    }

    /// Set the 3D defaults.
    pub fn with_three_d(mut self, defaults: ThreeDDefaults) -> Self {
        self.three_d = defaults;
        self
    }
}
