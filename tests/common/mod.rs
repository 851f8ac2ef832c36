//! Shared fixtures for integration tests.
//!
//! Builds a tiny synthetic TrueType face at runtime so font embedding can
//! be exercised without shipping a binary fixture. The face carries only
//! the tables the parser needs (cmap, head, hhea, hmtx, maxp); glyphs
//! have metrics but no outlines, which is enough for measuring text and
//! embedding the font program.

use std::cell::Cell;

use hibinote::{BookletFont, PhotoFetcher};

/// All characters the synthetic face maps: printable ASCII, the kana
/// ranges, and the kanji that appear in rendered labels.
pub fn test_font() -> Vec<u8> {
    let mut chars: Vec<char> = (' '..='~').collect();
    chars.extend('ぁ'..='ゖ');
    chars.extend('ァ'..='ヺ');
    chars.extend("ー・、。「」（）".chars());
    chars.extend("日月火水木金土曜生後目乳離食風呂体温調左右分発疹嘔吐件度公園散歩飲".chars());
    build_test_font(&chars)
}

pub fn test_booklet_font() -> BookletFont {
    BookletFont::from_bytes(test_font()).expect("synthetic test font should parse")
}

/// Assembles a minimal TTF mapping `chars` to glyphs 1..=n via a
/// format 4 cmap with one segment per character. Table checksums are
/// left at zero; the parser does not verify them.
pub fn build_test_font(chars: &[char]) -> Vec<u8> {
    let mut codes: Vec<u16> = chars
        .iter()
        .filter_map(|&c| u16::try_from(c as u32).ok())
        .filter(|&c| c != 0xFFFF)
        .collect();
    codes.sort_unstable();
    codes.dedup();

    let num_glyphs = codes.len() as u16 + 1;
    let seg_count = codes.len() as u16 + 1;

    // Binary search hints required by the format 4 header.
    let mut power = 1u16;
    let mut entry_selector = 0u16;
    while power * 2 <= seg_count {
        power *= 2;
        entry_selector += 1;
    }
    let search_range = power * 2;
    let range_shift = seg_count * 2 - search_range;

    let mut cmap = Vec::new();
    be16(&mut cmap, 0); // version
    be16(&mut cmap, 1); // one encoding record
    be16(&mut cmap, 3); // Windows
    be16(&mut cmap, 1); // Unicode BMP
    be32(&mut cmap, 12); // subtable offset
    be16(&mut cmap, 4); // format
    be16(&mut cmap, 16 + 8 * seg_count);
    be16(&mut cmap, 0); // language
    be16(&mut cmap, seg_count * 2);
    be16(&mut cmap, search_range);
    be16(&mut cmap, entry_selector);
    be16(&mut cmap, range_shift);
    for &c in &codes {
        be16(&mut cmap, c);
    }
    be16(&mut cmap, 0xFFFF);
    be16(&mut cmap, 0); // reservedPad
    for &c in &codes {
        be16(&mut cmap, c);
    }
    be16(&mut cmap, 0xFFFF);
    for (i, &c) in codes.iter().enumerate() {
        // idDelta wraps mod 65536 so code + delta lands on glyph i + 1.
        be16(&mut cmap, (i as i32 + 1 - c as i32) as u16);
    }
    be16(&mut cmap, 1); // terminator segment maps 0xFFFF to .notdef
    for _ in 0..seg_count {
        be16(&mut cmap, 0); // idRangeOffset
    }

    let mut head = Vec::new();
    be32(&mut head, 0x0001_0000); // version
    be32(&mut head, 0x0001_0000); // fontRevision
    be32(&mut head, 0); // checkSumAdjustment
    be32(&mut head, 0x5F0F_3CF5); // magicNumber
    be16(&mut head, 0); // flags
    be16(&mut head, 1000); // unitsPerEm
    be32(&mut head, 0); // created
    be32(&mut head, 0);
    be32(&mut head, 0); // modified
    be32(&mut head, 0);
    bei16(&mut head, -200); // xMin
    bei16(&mut head, -200); // yMin
    bei16(&mut head, 800); // xMax
    bei16(&mut head, 800); // yMax
    be16(&mut head, 0); // macStyle
    be16(&mut head, 8); // lowestRecPPEM
    bei16(&mut head, 2); // fontDirectionHint
    bei16(&mut head, 0); // indexToLocFormat
    bei16(&mut head, 0); // glyphDataFormat

    let mut hhea = Vec::new();
    be32(&mut hhea, 0x0001_0000); // version
    bei16(&mut hhea, 800); // ascender
    bei16(&mut hhea, -200); // descender
    bei16(&mut hhea, 0); // lineGap
    be16(&mut hhea, 600); // advanceWidthMax
    bei16(&mut hhea, 0); // minLeftSideBearing
    bei16(&mut hhea, 0); // minRightSideBearing
    bei16(&mut hhea, 600); // xMaxExtent
    bei16(&mut hhea, 1); // caretSlopeRise
    bei16(&mut hhea, 0); // caretSlopeRun
    bei16(&mut hhea, 0); // caretOffset
    be32(&mut hhea, 0); // reserved
    be32(&mut hhea, 0);
    bei16(&mut hhea, 0); // metricDataFormat
    be16(&mut hhea, num_glyphs); // numberOfHMetrics

    let mut hmtx = Vec::new();
    be16(&mut hmtx, 500); // .notdef advance
    bei16(&mut hmtx, 0);
    for _ in 1..num_glyphs {
        be16(&mut hmtx, 600);
        bei16(&mut hmtx, 50);
    }

    let mut maxp = Vec::new();
    be32(&mut maxp, 0x0001_0000); // version
    be16(&mut maxp, num_glyphs);
    for _ in 0..13 {
        be16(&mut maxp, 0);
    }

    let tables: [([u8; 4], Vec<u8>); 5] = [
        (*b"cmap", cmap),
        (*b"head", head),
        (*b"hhea", hhea),
        (*b"hmtx", hmtx),
        (*b"maxp", maxp),
    ];

    let mut font = Vec::new();
    be32(&mut font, 0x0001_0000); // sfnt version
    be16(&mut font, 5); // numTables
    be16(&mut font, 64); // searchRange
    be16(&mut font, 2); // entrySelector
    be16(&mut font, 16); // rangeShift

    let mut offset = 12 + 16 * tables.len();
    let mut body = Vec::new();
    for (tag, data) in &tables {
        font.extend_from_slice(tag);
        be32(&mut font, 0); // checksum, unchecked
        be32(&mut font, offset as u32);
        be32(&mut font, data.len() as u32);
        body.extend_from_slice(data);
        offset += data.len();
        while offset % 4 != 0 {
            body.push(0);
            offset += 1;
        }
    }
    font.extend_from_slice(&body);
    font
}

fn be16(buf: &mut Vec<u8>, v: u16) {
    buf.extend_from_slice(&v.to_be_bytes());
}

fn be32(buf: &mut Vec<u8>, v: u32) {
    buf.extend_from_slice(&v.to_be_bytes());
}

fn bei16(buf: &mut Vec<u8>, v: i16) {
    buf.extend_from_slice(&v.to_be_bytes());
}

// ─── Photo Fetchers ─────────────────────────────────────────────

/// Serves one small JPEG for every URL and counts the requests made.
pub struct StubFetcher {
    jpeg: Vec<u8>,
    pub calls: Cell<usize>,
}

impl StubFetcher {
    pub fn new() -> Self {
        StubFetcher {
            jpeg: tiny_jpeg(),
            calls: Cell::new(0),
        }
    }
}

impl PhotoFetcher for StubFetcher {
    fn fetch(&self, _url: &str) -> Result<Vec<u8>, String> {
        self.calls.set(self.calls.get() + 1);
        Ok(self.jpeg.clone())
    }
}

/// Refuses every URL, for exercising graceful degradation.
pub struct FailingFetcher;

impl PhotoFetcher for FailingFetcher {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, String> {
        Err(format!("connection refused: {}", url))
    }
}

fn tiny_jpeg() -> Vec<u8> {
    let img = image::RgbImage::from_pixel(8, 6, image::Rgb([180, 140, 120]));
    let mut buf = Vec::new();
    let encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buf, 90);
    image::ImageEncoder::write_image(encoder, img.as_raw(), 8, 6, image::ColorType::Rgb8)
        .expect("jpeg encoding");
    buf
}
