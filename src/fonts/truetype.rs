//! TrueType/OpenType fonts loaded from disk.
//!
//! Metrics come from `ttf-parser`. The face is re-parsed on demand from the
//! owned bytes, which only reads the table directory.

use std::io;
use std::path::Path;

use ttf_parser::{name_id, Face, GlyphId};

/// Error types for TrueType font loading.
#[derive(Debug, thiserror::Error)]
pub enum TrueTypeError {
    /// Failed to parse font file
    #[error("Failed to parse font file: {0}")]
    ParseError(String),

    /// Font file is empty
    #[error("Font file is empty")]
    EmptyFont,

    /// Font has no Unicode cmap, so text cannot be mapped to glyphs
    #[error("Font has no usable character map")]
    NoCharacterMap,

    /// IO error during font operations
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),
}

/// A font program with cached face-level metrics.
#[derive(Debug, Clone)]
pub struct TrueTypeFont {
    data: Vec<u8>,
    postscript_name: String,
    full_name: Option<String>,
    units_per_em: f32,
    ascender: i16,
    descender: i16,
    cap_height: i16,
    bbox: [i16; 4],
    italic_angle: f32,
}

impl TrueTypeFont {
    /// Read and parse a font file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, TrueTypeError> {
        let path = path.as_ref();
        let data = std::fs::read(path)?;
        let fallback = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "EmbeddedFont".to_string());
        Self::from_bytes(data, &fallback)
    }

    /// Parse font bytes. `fallback_name` is used when the face has no PostScript name.
    pub fn from_bytes(data: Vec<u8>, fallback_name: &str) -> Result<Self, TrueTypeError> {
        if data.is_empty() {
            return Err(TrueTypeError::EmptyFont);
        }

        let face = Face::parse(&data, 0).map_err(|e| TrueTypeError::ParseError(e.to_string()))?;
        if face.tables().cmap.is_none() {
            return Err(TrueTypeError::NoCharacterMap);
        }

        let postscript_name = face_name(&face, name_id::POST_SCRIPT_NAME)
            .map(|n| n.replace(' ', ""))
            .unwrap_or_else(|| fallback_name.replace(' ', ""));
        let full_name = face_name(&face, name_id::FULL_NAME);
        let global = face.global_bounding_box();
        let bbox = [global.x_min, global.y_min, global.x_max, global.y_max];
        let units_per_em = face.units_per_em().max(1) as f32;
        let ascender = face.ascender();
        let descender = face.descender();
        let cap_height = face.capital_height().unwrap_or(ascender);
        let italic_angle = face.italic_angle().unwrap_or(0.0);

        Ok(Self {
            data,
            postscript_name,
            full_name,
            units_per_em,
            ascender,
            descender,
            cap_height,
            bbox,
            italic_angle,
        })
    }

    fn face(&self) -> Option<Face<'_>> {
        Face::parse(&self.data, 0).ok()
    }

    /// PostScript name with spaces removed.
    pub fn postscript_name(&self) -> &str {
        &self.postscript_name
    }

    /// Full name from the `name` table.
    pub fn full_name(&self) -> Option<&str> {
        self.full_name.as_deref()
    }

    /// Raw font program.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Advance width of `ch` in 1/1000 em; unmapped characters use `.notdef`.
    pub fn char_width(&self, ch: char) -> f32 {
        let Some(face) = self.face() else {
            return 0.0;
        };
        let gid = face.glyph_index(ch).unwrap_or(GlyphId(0));
        face.glyph_hor_advance(gid).unwrap_or(0) as f32 * 1000.0 / self.units_per_em
    }

    /// Highest and lowest glyph extents over `text`, in 1/1000 em.
    ///
    /// Both start at the baseline, so text without outlines yields `(0, 0)`.
    pub fn vertical_extent(&self, text: &str) -> (f32, f32) {
        let Some(face) = self.face() else {
            return (0.0, 0.0);
        };
        let (mut top, mut bottom) = (0i16, 0i16);
        for ch in text.chars() {
            if let Some(bbox) = face.glyph_index(ch).and_then(|gid| face.glyph_bounding_box(gid)) {
                top = top.max(bbox.y_max);
                bottom = bottom.min(bbox.y_min);
            }
        }
        let scale = 1000.0 / self.units_per_em;
        (top as f32 * scale, bottom as f32 * scale)
    }

    /// Ascender in 1/1000 em.
    pub fn ascender(&self) -> f32 {
        self.ascender as f32 * 1000.0 / self.units_per_em
    }

    /// Descender in 1/1000 em.
    pub fn descender(&self) -> f32 {
        self.descender as f32 * 1000.0 / self.units_per_em
    }

    /// Cap height in 1/1000 em.
    pub fn cap_height(&self) -> f32 {
        self.cap_height as f32 * 1000.0 / self.units_per_em
    }

    /// Font bounding box in 1/1000 em.
    pub fn bbox(&self) -> [f32; 4] {
        self.bbox.map(|v| v as f32 * 1000.0 / self.units_per_em)
    }

    /// Italic angle in degrees.
    pub fn italic_angle(&self) -> f32 {
        self.italic_angle
    }
}

fn face_name(face: &Face<'_>, id: u16) -> Option<String> {
    face.names()
        .into_iter()
        .filter(|name| name.name_id == id)
        .find_map(|name| name.to_string())
        .filter(|name| !name.trim().is_empty())
}
