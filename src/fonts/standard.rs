//! Metrics for the 14 standard PDF fonts.
//!
//! Widths are the Adobe AFM advance widths for printable ASCII in 1/1000 em.
//! Oblique and italic faces reuse the upright widths.

/// Widths for U+0020..=U+007E.
type AsciiWidths = [u16; 95];

#[rustfmt::skip]
const HELVETICA: AsciiWidths = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556,
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556,
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556,
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,
];

#[rustfmt::skip]
const HELVETICA_BOLD: AsciiWidths = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611,
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556,
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611,
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584,
];

#[rustfmt::skip]
const TIMES_ROMAN: AsciiWidths = [
    250, 333, 408, 500, 500, 833, 778, 180, 333, 333, 500, 564, 250, 333, 250, 278,
    500, 500, 500, 500, 500, 500, 500, 500, 500, 500, 278, 278, 564, 564, 564, 444,
    921, 722, 667, 667, 722, 611, 556, 722, 722, 333, 389, 722, 611, 889, 722, 722,
    556, 722, 667, 556, 611, 722, 722, 944, 722, 722, 611, 333, 278, 333, 469, 500,
    333, 444, 500, 444, 500, 444, 333, 500, 500, 278, 278, 500, 278, 778, 500, 500,
    500, 500, 333, 389, 278, 500, 500, 722, 500, 500, 444, 480, 200, 480, 541,
];

#[rustfmt::skip]
const TIMES_BOLD: AsciiWidths = [
    250, 333, 555, 500, 500, 1000, 833, 278, 333, 333, 500, 570, 250, 333, 250, 278,
    500, 500, 500, 500, 500, 500, 500, 500, 500, 500, 333, 333, 570, 570, 570, 500,
    930, 722, 667, 722, 722, 667, 611, 778, 778, 389, 500, 778, 667, 944, 722, 778,
    611, 778, 722, 556, 667, 722, 722, 1000, 722, 722, 667, 333, 278, 333, 581, 500,
    333, 500, 556, 444, 556, 444, 333, 500, 556, 278, 333, 556, 278, 833, 556, 500,
    556, 556, 444, 389, 333, 556, 500, 722, 500, 500, 444, 394, 220, 394, 520,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Widths {
    Table(&'static AsciiWidths),
    Fixed(u16),
}

/// One of the standard 14 fonts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StandardFont {
    base_font: &'static str,
    widths: Widths,
    ascender: i16,
    descender: i16,
    symbolic: bool,
}

impl StandardFont {
    /// Every standard font by its PostScript name.
    pub const NAMES: [&'static str; 14] = [
        "Helvetica",
        "Helvetica-Bold",
        "Helvetica-Oblique",
        "Helvetica-BoldOblique",
        "Times-Roman",
        "Times-Bold",
        "Times-Italic",
        "Times-BoldItalic",
        "Courier",
        "Courier-Bold",
        "Courier-Oblique",
        "Courier-BoldOblique",
        "Symbol",
        "ZapfDingbats",
    ];

    /// Look up a standard font, ignoring case.
    pub fn by_name(name: &str) -> Option<Self> {
        let base_font = *Self::NAMES.iter().find(|n| n.eq_ignore_ascii_case(name))?;
        let (widths, ascender, descender) = match base_font {
            "Helvetica" | "Helvetica-Oblique" => (Widths::Table(&HELVETICA), 718, -207),
            "Helvetica-Bold" | "Helvetica-BoldOblique" => (Widths::Table(&HELVETICA_BOLD), 718, -207),
            "Times-Roman" | "Times-Italic" => (Widths::Table(&TIMES_ROMAN), 683, -217),
            "Times-Bold" | "Times-BoldItalic" => (Widths::Table(&TIMES_BOLD), 676, -205),
            "Courier" | "Courier-Oblique" => (Widths::Fixed(600), 629, -157),
            "Courier-Bold" | "Courier-BoldOblique" => (Widths::Fixed(600), 626, -142),
            _ => (Widths::Fixed(500), 800, -200),
        };
        Some(Self {
            base_font,
            widths,
            ascender,
            descender,
            symbolic: matches!(base_font, "Symbol" | "ZapfDingbats"),
        })
    }

    /// PostScript name used as `/BaseFont`.
    pub fn base_font(&self) -> &'static str {
        self.base_font
    }

    /// Symbol and ZapfDingbats carry their own encoding.
    pub fn is_symbolic(&self) -> bool {
        self.symbolic
    }

    /// Advance width of `ch` in 1/1000 em.
    pub fn char_width(&self, ch: char) -> u16 {
        match self.widths {
            Widths::Fixed(w) => w,
            Widths::Table(table) => match ch {
                ' '..='~' => table[ch as usize - 0x20],
                '\u{a0}' => table[0],
                _ => 556,
            },
        }
    }

    /// Ascender in 1/1000 em.
    pub fn ascender(&self) -> i16 {
        self.ascender
    }

    /// Descender in 1/1000 em (negative).
    pub fn descender(&self) -> i16 {
        self.descender
    }
}
