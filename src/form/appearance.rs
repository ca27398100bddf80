//! Field flags and the `/DA` default appearance string.

use std::fmt;

use bitflags::bitflags;

bitflags! {
    /// Field flags (`/Ff`) the populator reads or writes.
    ///
    /// Per PDF spec Tables 221 and 228.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct FieldFlags: u32 {
        /// Bit 1: Field is read-only
        const READ_ONLY = 1 << 0;
        /// Bit 2: Field is required
        const REQUIRED = 1 << 1;
        /// Bit 3: Field should not be exported
        const NO_EXPORT = 1 << 2;
        /// Bit 13: Text field wraps onto multiple lines
        const MULTILINE = 1 << 12;
    }
}

/// Color operator in a default appearance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AppearanceColor {
    /// `g`
    Gray(f32),
    /// `rg`
    Rgb([f32; 3]),
    /// `k`
    Cmyk([f32; 4]),
}

/// Parsed `/DA` string: font resource, size and fill color.
///
/// ```
/// use pdf_filler::form::DefaultAppearance;
///
/// let mut da = DefaultAppearance::parse("/Helv 0 Tf 0 g");
/// assert_eq!(da.font.as_deref(), Some("Helv"));
/// da.size = 10.0;
/// assert_eq!(da.to_string(), "/Helv 10 Tf 0 g");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct DefaultAppearance {
    /// Font resource name without the leading slash
    pub font: Option<String>,
    /// Point size; 0 is autoscale
    pub size: f32,
    /// Fill color
    pub color: Option<AppearanceColor>,
}

impl Default for DefaultAppearance {
    fn default() -> Self {
        Self {
            font: None,
            size: 0.0,
            color: Some(AppearanceColor::Gray(0.0)),
        }
    }
}

impl DefaultAppearance {
    /// Parse a DA string. Unknown operators are ignored.
    pub fn parse(da: &str) -> Self {
        let mut result = Self {
            font: None,
            size: 0.0,
            color: None,
        };
        let mut operands: Vec<&str> = Vec::new();

        for token in da.split_whitespace() {
            match token {
                "Tf" => {
                    if let [.., name, size] = operands.as_slice() {
                        result.font = Some(name.trim_start_matches('/').to_string());
                        result.size = size.parse().unwrap_or(0.0);
                    }
                    operands.clear();
                },
                "g" | "rg" | "k" => {
                    let values: Vec<f32> = operands.iter().filter_map(|v| v.parse().ok()).collect();
                    result.color = match (token, values.as_slice()) {
                        ("g", [.., g]) => Some(AppearanceColor::Gray(*g)),
                        ("rg", [.., r, g, b]) => Some(AppearanceColor::Rgb([*r, *g, *b])),
                        ("k", [.., c, m, y, k]) => Some(AppearanceColor::Cmyk([*c, *m, *y, *k])),
                        _ => result.color,
                    };
                    operands.clear();
                },
                _ if token.chars().next().is_some_and(|c| c.is_ascii_alphabetic()) => operands.clear(),
                _ => operands.push(token),
            }
        }
        result
    }
}

impl fmt::Display for DefaultAppearance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if let Some(font) = &self.font {
            parts.push(format!("/{} {} Tf", font, self.size));
        }
        match self.color {
            Some(AppearanceColor::Gray(g)) => parts.push(format!("{} g", g)),
            Some(AppearanceColor::Rgb([r, g, b])) => parts.push(format!("{} {} {} rg", r, g, b)),
            Some(AppearanceColor::Cmyk([c, m, y, k])) => parts.push(format!("{} {} {} {} k", c, m, y, k)),
            None => {},
        }
        f.write_str(&parts.join(" "))
    }
}
