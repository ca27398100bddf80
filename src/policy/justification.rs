//! Nine-way justification shared by text and image placement.

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use crate::error::Error;

/// Vertical band of a [`Justification`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VerticalBand {
    /// Content hugs the top edge
    Top,
    /// Content is centered vertically
    Center,
    /// Content sits on the bottom edge
    Bottom,
}

/// Horizontal alignment of a [`Justification`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HorizontalAlign {
    /// Flush left
    Left,
    /// Centered
    Middle,
    /// Flush right
    Right,
}

impl HorizontalAlign {
    /// AcroForm quadding value (`/Q`).
    pub fn quadding(self) -> i64 {
        match self {
            HorizontalAlign::Left => 0,
            HorizontalAlign::Middle => 1,
            HorizontalAlign::Right => 2,
        }
    }
}

/// {Top, Center, Bottom} x {Left, Middle, Right}.
///
/// The discriminants are the legacy integer codes (`TopLeft = 0` through
/// `BottomRight = 8`), accepted by [`Justification::try_from`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(try_from = "JustificationRepr")]
pub enum Justification {
    /// Top band, left
    #[default]
    TopLeft = 0,
    /// Top band, centered
    TopMiddle = 1,
    /// Top band, right
    TopRight = 2,
    /// Vertical center, left
    CenterLeft = 3,
    /// Vertical center, centered
    CenterMiddle = 4,
    /// Vertical center, right
    CenterRight = 5,
    /// Bottom band, left
    BottomLeft = 6,
    /// Bottom band, centered
    BottomMiddle = 7,
    /// Bottom band, right
    BottomRight = 8,
}

impl Justification {
    /// All nine modes in code order.
    pub const ALL: [Justification; 9] = [
        Justification::TopLeft,
        Justification::TopMiddle,
        Justification::TopRight,
        Justification::CenterLeft,
        Justification::CenterMiddle,
        Justification::CenterRight,
        Justification::BottomLeft,
        Justification::BottomMiddle,
        Justification::BottomRight,
    ];

    /// Combine a band and an alignment.
    pub fn from_parts(band: VerticalBand, align: HorizontalAlign) -> Self {
        let row = match band {
            VerticalBand::Top => 0,
            VerticalBand::Center => 3,
            VerticalBand::Bottom => 6,
        };
        let column = match align {
            HorizontalAlign::Left => 0,
            HorizontalAlign::Middle => 1,
            HorizontalAlign::Right => 2,
        };
        Self::ALL[row + column]
    }

    /// Vertical band.
    pub fn band(self) -> VerticalBand {
        match self as u8 / 3 {
            0 => VerticalBand::Top,
            1 => VerticalBand::Center,
            _ => VerticalBand::Bottom,
        }
    }

    /// Horizontal alignment.
    pub fn align(self) -> HorizontalAlign {
        match self as u8 % 3 {
            0 => HorizontalAlign::Left,
            1 => HorizontalAlign::Middle,
            _ => HorizontalAlign::Right,
        }
    }

    /// Whether a native text widget can express this mode through `/Q` alone.
    ///
    /// Widgets lay single-line text out from the top, so only the top band is native.
    pub fn is_native_to_widget(self) -> bool {
        self.band() == VerticalBand::Top
    }
}

impl TryFrom<u8> for Justification {
    type Error = Error;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        Self::ALL
            .get(code as usize)
            .copied()
            .ok_or_else(|| Error::InvalidPolicy(format!("justification code {} out of range 0..=8", code)))
    }
}

impl FromStr for Justification {
    type Err = Error;

    /// Accepts `TopLeft`, `top-left`, `top_left`, `center middle` and so on.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();
        if let Ok(code) = key.parse::<u8>() {
            return Self::try_from(code);
        }
        Self::ALL
            .iter()
            .copied()
            .find(|j| j.to_string().to_ascii_lowercase() == key)
            .ok_or_else(|| Error::InvalidPolicy(format!("unknown justification '{}'", s)))
    }
}

impl fmt::Display for Justification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let band = match self.band() {
            VerticalBand::Top => "Top",
            VerticalBand::Center => "Center",
            VerticalBand::Bottom => "Bottom",
        };
        let align = match self.align() {
            HorizontalAlign::Left => "Left",
            HorizontalAlign::Middle => "Middle",
            HorizontalAlign::Right => "Right",
        };
        write!(f, "{}{}", band, align)
    }
}

/// Manifest form: a name or a legacy integer code.
#[derive(Deserialize)]
#[serde(untagged)]
enum JustificationRepr {
    Code(u8),
    Name(String),
}

impl TryFrom<JustificationRepr> for Justification {
    type Error = Error;

    fn try_from(repr: JustificationRepr) -> Result<Self, Self::Error> {
        match repr {
            JustificationRepr::Code(code) => Self::try_from(code),
            JustificationRepr::Name(name) => name.parse(),
        }
    }
}
