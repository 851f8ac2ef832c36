//! # Document Font
//!
//! The booklet embeds exactly one caller-supplied TrueType face (the app
//! ships NotoSansJP). Parsing happens once per generation call; after that
//! every width and coverage query runs against precomputed tables so the
//! text pipeline never touches `ttf-parser` again.

use std::collections::HashMap;

use crate::error::BookletError;

/// Width and coverage queries the sanitizer, wrapper, and composer need.
///
/// [`BookletFont`] is the real implementation; tests substitute a
/// fixed-width stub.
pub trait TextMeasure {
    /// Whether the face has a real glyph for this character.
    fn covers(&self, ch: char) -> bool;

    /// Advance width of one character in points at the given size.
    fn char_width(&self, ch: char, font_size: f64) -> f64;

    /// Width of a string in points. Uncovered characters contribute
    /// nothing; after sanitization there are none.
    fn measure(&self, text: &str, font_size: f64) -> f64 {
        text.chars()
            .filter(|ch| self.covers(*ch))
            .map(|ch| self.char_width(ch, font_size))
            .sum()
    }
}

/// The parsed document face plus the raw bytes for embedding.
#[derive(Debug)]
pub struct BookletFont {
    data: Vec<u8>,
    units_per_em: u16,
    ascender: i16,
    descender: i16,
    cap_height: i16,
    bbox: [i16; 4],
    postscript_name: Option<String>,
    advance_widths: HashMap<char, u16>,
    glyph_ids: HashMap<char, u16>,
    default_advance: u16,
}

impl BookletFont {
    /// Parse a TrueType face and precompute its BMP coverage and widths.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self, BookletError> {
        let face = ttf_parser::Face::parse(&data, 0)
            .map_err(|e| BookletError::FontError(format!("Failed to parse TTF data: {}", e)))?;

        let units_per_em = face.units_per_em();
        let ascender = face.ascender();
        let descender = face.descender();
        let cap_height = face.capital_height().unwrap_or(ascender);
        let bbox = face.global_bounding_box();
        let bbox = [bbox.x_min, bbox.y_min, bbox.x_max, bbox.y_max];

        let postscript_name = face
            .names()
            .into_iter()
            .find(|n| n.name_id == ttf_parser::name_id::POST_SCRIPT_NAME && n.is_unicode())
            .and_then(|n| n.to_string());

        let mut advance_widths = HashMap::new();
        let mut glyph_ids = HashMap::new();
        let mut default_advance = 0u16;

        // Sample the BMP to build width and glyph ID maps. Characters
        // outside the BMP count as uncovered, which the sanitizer turns
        // into omission.
        for code in 32u32..=0xFFFF {
            if let Some(ch) = char::from_u32(code) {
                if let Some(glyph_id) = face.glyph_index(ch) {
                    let advance = face.glyph_hor_advance(glyph_id).unwrap_or(0);
                    advance_widths.insert(ch, advance);
                    glyph_ids.insert(ch, glyph_id.0);
                    if ch == ' ' {
                        default_advance = advance;
                    }
                }
            }
        }

        if default_advance == 0 {
            default_advance = units_per_em / 2;
        }

        Ok(Self {
            data,
            units_per_em,
            ascender,
            descender,
            cap_height,
            bbox,
            postscript_name,
            advance_widths,
            glyph_ids,
            default_advance,
        })
    }

    /// Raw face bytes, embedded whole as FontFile2.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn units_per_em(&self) -> u16 {
        self.units_per_em
    }

    pub fn ascender(&self) -> i16 {
        self.ascender
    }

    pub fn descender(&self) -> i16 {
        self.descender
    }

    pub fn cap_height(&self) -> i16 {
        self.cap_height
    }

    /// `[x_min, y_min, x_max, y_max]` in font units.
    pub fn bbox(&self) -> [i16; 4] {
        self.bbox
    }

    pub fn postscript_name(&self) -> Option<&str> {
        self.postscript_name.as_deref()
    }

    /// Glyph ID for a character, if the face covers it.
    pub fn glyph_id(&self, ch: char) -> Option<u16> {
        self.glyph_ids.get(&ch).copied()
    }

    /// Advance width in font units used by the /W array.
    pub fn advance_units(&self, ch: char) -> u16 {
        self.advance_widths
            .get(&ch)
            .copied()
            .unwrap_or(self.default_advance)
    }

    /// Fallback advance in font units for glyphs outside the /W array.
    pub fn default_advance(&self) -> u16 {
        self.default_advance
    }
}

impl TextMeasure for BookletFont {
    fn covers(&self, ch: char) -> bool {
        self.glyph_ids.contains_key(&ch)
    }

    fn char_width(&self, ch: char, font_size: f64) -> f64 {
        let w = self
            .advance_widths
            .get(&ch)
            .copied()
            .unwrap_or(self.default_advance);
        (w as f64 / self.units_per_em as f64) * font_size
    }
}

/// Uniform half-em measurement with a configurable coverage hole.
#[cfg(test)]
pub(crate) struct StubMeasure {
    pub uncovered: Vec<char>,
}

#[cfg(test)]
impl StubMeasure {
    pub fn covering_all() -> Self {
        Self { uncovered: Vec::new() }
    }
}

#[cfg(test)]
impl TextMeasure for StubMeasure {
    fn covers(&self, ch: char) -> bool {
        !self.uncovered.contains(&ch)
    }

    fn char_width(&self, _ch: char, font_size: f64) -> f64 {
        font_size * 0.5
    }
}
