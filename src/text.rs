//! # Text Sanitizing and Wrapping
//!
//! Diary text arrives from a phone keyboard: emoji, variation selectors,
//! ZWJ sequences, the odd symbol the document font has no glyph for. The
//! sanitizer reduces a string to characters the embedded face can draw so
//! no downstream operation can fail on a glyph lookup. The wrapper then
//! breaks paragraphs greedily at character granularity, which is the
//! correct behavior for Japanese text (no word-boundary spacing).

use crate::font::TextMeasure;

/// Pictographic and symbol blocks stripped wholesale, inclusive ranges.
/// These are never meant for print even when the face happens to cover
/// them (NotoSansJP carries a few monochrome fallbacks).
const STRIP_RANGES: &[(u32, u32)] = &[
    (0x200D, 0x200D),   // zero-width joiner
    (0x20E3, 0x20E3),   // combining enclosing keycap
    (0x2190, 0x21FF),   // arrows
    (0x2300, 0x23FF),   // technical symbols, watch and alarm clock
    (0x2600, 0x26FF),   // miscellaneous symbols
    (0x2700, 0x27BF),   // dingbats
    (0x2B00, 0x2BFF),   // misc arrows, stars
    (0xFE00, 0xFE0F),   // variation selectors
    (0x1F000, 0x1F0FF), // mahjong tiles, dominoes, playing cards
    (0x1F1E6, 0x1F1FF), // regional indicators
    (0x1F300, 0x1F5FF), // misc pictographs, clock faces
    (0x1F600, 0x1F64F), // emoticons
    (0x1F680, 0x1F6FF), // transport and map
    (0x1F900, 0x1F9FF), // supplemental pictographs
    (0x1FA70, 0x1FAFF), // pictographs extended-A
    (0xE0000, 0xE007F), // tag characters
];

fn in_strip_range(ch: char) -> bool {
    let cp = ch as u32;
    STRIP_RANGES
        .iter()
        .any(|&(lo, hi)| (lo..=hi).contains(&cp))
}

/// Filter `text` down to characters `font` can draw.
///
/// Two passes folded into one walk: range stripping first (the bulk case),
/// then a per-character coverage check for whatever the ranges miss.
/// Degree symbols become the word 「度」 so temperatures stay readable.
/// Newlines always survive; the wrapper needs them.
pub fn sanitize(text: &str, font: &dyn TextMeasure) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        if ch == '℃' || ch == '°' {
            if font.covers('度') {
                out.push('度');
            }
            continue;
        }
        if in_strip_range(ch) {
            continue;
        }
        if ch == '\n' || font.covers(ch) {
            out.push(ch);
        }
    }
    out
}

/// Break `text` into lines no wider than `max_width_pt` at `font_size`.
///
/// Paragraphs split on `\n` first; an empty paragraph yields an explicit
/// empty line so blank-line spacing survives. Within a paragraph the wrap
/// is greedy with no lookahead: close the line when the next character
/// would overflow it. A character wider than the whole budget still gets
/// a line of its own.
pub fn wrap(
    text: &str,
    font: &dyn TextMeasure,
    font_size: f64,
    max_width_pt: f64,
) -> Vec<String> {
    let mut lines = Vec::new();

    for paragraph in text.split('\n') {
        if paragraph.is_empty() {
            lines.push(String::new());
            continue;
        }

        let mut current = String::new();
        let mut current_width = 0.0;

        for ch in paragraph.chars() {
            // Post-sanitize this cannot happen; skip rather than abort.
            if !font.covers(ch) {
                continue;
            }
            let w = font.char_width(ch, font_size);
            if !current.is_empty() && current_width + w > max_width_pt {
                lines.push(std::mem::take(&mut current));
                current_width = 0.0;
            }
            current.push(ch);
            current_width += w;
        }

        if !current.is_empty() {
            lines.push(current);
        }
    }

    lines
}
