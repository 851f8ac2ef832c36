//! # Booklet Themes
//!
//! The four built-in palettes, resolved from a [`ThemeId`]. Theme backgrounds
//! may be gradients in the source app's CSS; the PDF has no gradient fills,
//! so [`Paint::flatten`] maps those to a neutral warm off-white.

use crate::model::ThemeId;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f64, // 0.0 - 1.0
    pub g: f64,
    pub b: f64,
    pub a: f64,
}

impl Color {
    pub const BLACK: Color = Color {
        r: 0.0,
        g: 0.0,
        b: 0.0,
        a: 1.0,
    };
    pub const WHITE: Color = Color {
        r: 1.0,
        g: 1.0,
        b: 1.0,
        a: 1.0,
    };

    pub fn rgb(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub fn hex(hex: &str) -> Self {
        let hex = hex.trim_start_matches('#');
        let (r, g, b) = match hex.len() {
            3 => {
                let r = u8::from_str_radix(&hex[0..1].repeat(2), 16).unwrap_or(0);
                let g = u8::from_str_radix(&hex[1..2].repeat(2), 16).unwrap_or(0);
                let b = u8::from_str_radix(&hex[2..3].repeat(2), 16).unwrap_or(0);
                (r, g, b)
            }
            6 => {
                let r = u8::from_str_radix(&hex[0..2], 16).unwrap_or(0);
                let g = u8::from_str_radix(&hex[2..4], 16).unwrap_or(0);
                let b = u8::from_str_radix(&hex[4..6], 16).unwrap_or(0);
                (r, g, b)
            }
            _ => (0, 0, 0),
        };
        Self {
            r: r as f64 / 255.0,
            g: g as f64 / 255.0,
            b: b as f64 / 255.0,
            a: 1.0,
        }
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::BLACK
    }
}

/// A background fill as the theme declares it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Paint {
    Solid(Color),
    /// Top-to-bottom gradient. Kept for fidelity to the theme descriptor;
    /// the PDF writer never receives one.
    Gradient { from: Color, to: Color },
}

/// The solid stand-in for gradient backgrounds.
const GRADIENT_FALLBACK: Color = Color {
    r: 0.98,
    g: 0.97,
    b: 0.96,
    a: 1.0,
};

impl Paint {
    /// The color actually drawn into the PDF.
    pub fn flatten(&self) -> Color {
        match self {
            Paint::Solid(c) => *c,
            Paint::Gradient { .. } => GRADIENT_FALLBACK,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CoverPalette {
    pub background: Paint,
    pub name_color: Color,
    pub sub_color: Color,
}

#[derive(Debug, Clone)]
pub struct ContentPalette {
    pub background: Paint,
    pub date_color: Color,
    pub day_count_color: Color,
    pub text_color: Color,
    pub border_color: Color,
}

/// A fully resolved theme.
#[derive(Debug, Clone)]
pub struct Theme {
    pub id: ThemeId,
    pub name: &'static str,
    pub cover: CoverPalette,
    pub content: ContentPalette,
    /// Screen-preview font stack. The PDF always uses the embedded face.
    pub font_family: &'static str,
}

impl Theme {
    pub fn resolve(id: ThemeId) -> Theme {
        match id {
            ThemeId::Simple => Theme {
                id,
                name: "シンプル",
                cover: CoverPalette {
                    background: Paint::Solid(Color::hex("#ffffff")),
                    name_color: Color::hex("#333333"),
                    sub_color: Color::hex("#888888"),
                },
                content: ContentPalette {
                    background: Paint::Solid(Color::hex("#ffffff")),
                    date_color: Color::hex("#333333"),
                    day_count_color: Color::hex("#888888"),
                    text_color: Color::hex("#444444"),
                    border_color: Color::hex("#eeeeee"),
                },
                font_family: "'Hiragino Sans', 'Yu Gothic', sans-serif",
            },
            ThemeId::Natural => Theme {
                id,
                name: "ナチュラル",
                cover: CoverPalette {
                    background: Paint::Gradient {
                        from: Color::hex("#fdfcfb"),
                        to: Color::hex("#f5f0e8"),
                    },
                    name_color: Color::hex("#5c5347"),
                    sub_color: Color::hex("#a89f91"),
                },
                content: ContentPalette {
                    background: Paint::Solid(Color::hex("#fdfcfa")),
                    date_color: Color::hex("#5c5347"),
                    day_count_color: Color::hex("#a89f91"),
                    text_color: Color::hex("#5c5347"),
                    border_color: Color::hex("#e8e2d9"),
                },
                font_family: "'Hiragino Mincho ProN', 'Yu Mincho', serif",
            },
            ThemeId::PastelPink => Theme {
                id,
                name: "パステルピンク",
                cover: CoverPalette {
                    background: Paint::Gradient {
                        from: Color::hex("#fff5f5"),
                        to: Color::hex("#ffe4e8"),
                    },
                    name_color: Color::hex("#d4768a"),
                    sub_color: Color::hex("#e8a0ad"),
                },
                content: ContentPalette {
                    background: Paint::Solid(Color::hex("#fffafa")),
                    date_color: Color::hex("#d4768a"),
                    day_count_color: Color::hex("#e8a0ad"),
                    text_color: Color::hex("#7a5a60"),
                    border_color: Color::hex("#ffe4e8"),
                },
                font_family: "'Hiragino Maru Gothic ProN', sans-serif",
            },
            ThemeId::PastelBlue => Theme {
                id,
                name: "パステルブルー",
                cover: CoverPalette {
                    background: Paint::Gradient {
                        from: Color::hex("#f0f8ff"),
                        to: Color::hex("#d4e8f7"),
                    },
                    name_color: Color::hex("#5a8fb4"),
                    sub_color: Color::hex("#7ba3c2"),
                },
                content: ContentPalette {
                    background: Paint::Solid(Color::hex("#f8fbff")),
                    date_color: Color::hex("#5a8fb4"),
                    day_count_color: Color::hex("#7ba3c2"),
                    text_color: Color::hex("#506a7a"),
                    border_color: Color::hex("#d4e8f7"),
                },
                font_family: "'Hiragino Maru Gothic ProN', sans-serif",
            },
        }
    }
}
