//! Fonts: metrics for fitting and dictionaries for writing.
//!
//! Text is always written with WinAnsiEncoding as single-byte strings, both
//! for the standard 14 fonts and for embedded TrueType programs.

pub mod registry;
pub mod standard;
pub mod truetype;

use lopdf::{dictionary, Document, Object, ObjectId, Stream};

pub use registry::{FontRegistrationReport, FontRegistry};
pub use standard::StandardFont;
pub use truetype::{TrueTypeError, TrueTypeFont};

/// Font measurements at a given point size.
///
/// All results are in text space units (points at `size`).
pub trait FontMetrics {
    /// Advance width of `text`.
    fn width(&self, text: &str, size: f32) -> f32;

    /// Distance from the baseline to the top of `text` (positive).
    fn ascent(&self, text: &str, size: f32) -> f32;

    /// Distance from the baseline to the bottom of `text` (zero or negative).
    fn descent(&self, text: &str, size: f32) -> f32;
}

/// Font program behind a [`PdfFont`].
#[derive(Debug, Clone)]
pub enum FontProgram {
    /// Built-in font, never embedded
    Standard(StandardFont),
    /// Embedded as a simple TrueType font
    TrueType(TrueTypeFont),
}

/// A registered font.
#[derive(Debug, Clone)]
pub struct PdfFont {
    key: String,
    program: FontProgram,
}

impl PdfFont {
    /// Wrap a standard font.
    pub fn standard(font: StandardFont) -> Self {
        Self {
            key: font.base_font().to_lowercase(),
            program: FontProgram::Standard(font),
        }
    }

    /// Wrap a TrueType font.
    pub fn truetype(font: TrueTypeFont) -> Self {
        Self {
            key: font.postscript_name().to_lowercase(),
            program: FontProgram::TrueType(font),
        }
    }

    /// Lowercase identity used for resource naming and caching.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The underlying program.
    pub fn program(&self) -> &FontProgram {
        &self.program
    }

    /// `/BaseFont` name.
    pub fn base_font(&self) -> &str {
        match &self.program {
            FontProgram::Standard(font) => font.base_font(),
            FontProgram::TrueType(font) => font.postscript_name(),
        }
    }

    /// Resource name to use in `/DR` and page `/Font` dictionaries.
    pub fn resource_name(&self) -> String {
        let clean: String = self
            .base_font()
            .chars()
            .filter(|c| c.is_ascii_alphanumeric() || *c == '-')
            .collect();
        format!("PF_{}", clean)
    }

    /// Advance width of one character in 1/1000 em.
    pub fn char_width(&self, ch: char) -> f32 {
        match &self.program {
            FontProgram::Standard(font) => font.char_width(ch) as f32,
            FontProgram::TrueType(font) => font.char_width(ch),
        }
    }

    /// Encode `text` for a `Tj` operand. Characters outside WinAnsi become '?'.
    pub fn encode_text(&self, text: &str) -> Vec<u8> {
        text.chars().map(|ch| winansi_code(ch).unwrap_or(b'?')).collect()
    }

    /// Add the font dictionary (and any embedded program) to `doc`.
    pub fn add_to_document(&self, doc: &mut Document) -> ObjectId {
        match &self.program {
            FontProgram::Standard(font) => {
                let mut dict = dictionary! {
                    "Type" => "Font",
                    "Subtype" => "Type1",
                    "BaseFont" => font.base_font(),
                };
                if !font.is_symbolic() {
                    dict.set("Encoding", "WinAnsiEncoding");
                }
                doc.add_object(dict)
            },
            FontProgram::TrueType(font) => add_truetype(doc, font),
        }
    }
}

impl FontMetrics for PdfFont {
    fn width(&self, text: &str, size: f32) -> f32 {
        text.chars().map(|ch| self.char_width(ch)).sum::<f32>() * size / 1000.0
    }

    fn ascent(&self, text: &str, size: f32) -> f32 {
        match &self.program {
            FontProgram::Standard(font) => font.ascender() as f32 * size / 1000.0,
            FontProgram::TrueType(font) => font.vertical_extent(text).0 * size / 1000.0,
        }
    }

    fn descent(&self, text: &str, size: f32) -> f32 {
        match &self.program {
            FontProgram::Standard(font) => font.descender() as f32 * size / 1000.0,
            FontProgram::TrueType(font) => font.vertical_extent(text).1 * size / 1000.0,
        }
    }
}

const FIRST_CHAR: u8 = 32;
const LAST_CHAR: u8 = 255;

fn add_truetype(doc: &mut Document, font: &TrueTypeFont) -> ObjectId {
    let program_id = doc.add_object(Stream::new(
        dictionary! { "Length1" => font.data().len() as i64 },
        font.data().to_vec(),
    ));

    let bbox: Vec<Object> = font.bbox().iter().map(|v| Object::Real(*v)).collect();
    let descriptor_id = doc.add_object(dictionary! {
        "Type" => "FontDescriptor",
        "FontName" => Object::Name(font.postscript_name().as_bytes().to_vec()),
        // Nonsymbolic
        "Flags" => 32,
        "FontBBox" => bbox,
        "ItalicAngle" => Object::Real(font.italic_angle()),
        "Ascent" => Object::Real(font.ascender()),
        "Descent" => Object::Real(font.descender()),
        "CapHeight" => Object::Real(font.cap_height()),
        "StemV" => 80,
        "FontFile2" => program_id,
    });

    let widths: Vec<Object> = (FIRST_CHAR..=LAST_CHAR)
        .map(|code| {
            let width = winansi_char(code).map(|ch| font.char_width(ch)).unwrap_or(0.0);
            Object::Integer(width.round() as i64)
        })
        .collect();

    doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "TrueType",
        "BaseFont" => Object::Name(font.postscript_name().as_bytes().to_vec()),
        "FirstChar" => FIRST_CHAR as i64,
        "LastChar" => LAST_CHAR as i64,
        "Widths" => widths,
        "Encoding" => "WinAnsiEncoding",
        "FontDescriptor" => descriptor_id,
    })
}

/// WinAnsi codes 0x80..=0x9F that differ from Latin-1.
const WINANSI_HIGH: [(u8, char); 27] = [
    (0x80, '\u{20AC}'),
    (0x82, '\u{201A}'),
    (0x83, '\u{0192}'),
    (0x84, '\u{201E}'),
    (0x85, '\u{2026}'),
    (0x86, '\u{2020}'),
    (0x87, '\u{2021}'),
    (0x88, '\u{02C6}'),
    (0x89, '\u{2030}'),
    (0x8A, '\u{0160}'),
    (0x8B, '\u{2039}'),
    (0x8C, '\u{0152}'),
    (0x8E, '\u{017D}'),
    (0x91, '\u{2018}'),
    (0x92, '\u{2019}'),
    (0x93, '\u{201C}'),
    (0x94, '\u{201D}'),
    (0x95, '\u{2022}'),
    (0x96, '\u{2013}'),
    (0x97, '\u{2014}'),
    (0x98, '\u{02DC}'),
    (0x99, '\u{2122}'),
    (0x9A, '\u{0161}'),
    (0x9B, '\u{203A}'),
    (0x9C, '\u{0153}'),
    (0x9E, '\u{017E}'),
    (0x9F, '\u{0178}'),
];

/// WinAnsi byte for `ch`.
pub fn winansi_code(ch: char) -> Option<u8> {
    match ch as u32 {
        0x20..=0x7E | 0xA0..=0xFF => Some(ch as u8),
        _ => WINANSI_HIGH.iter().find(|(_, c)| *c == ch).map(|(code, _)| *code),
    }
}

/// Character for a WinAnsi byte, if defined.
pub fn winansi_char(code: u8) -> Option<char> {
    match code {
        0x20..=0x7E | 0xA0..=0xFF => Some(code as char),
        _ => WINANSI_HIGH.iter().find(|(c, _)| *c == code).map(|(_, ch)| *ch),
    }
}
