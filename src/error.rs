//! Structured error types for booklet generation.
//!
//! Only the fatal failure paths surface here: request parsing, date-range
//! validation, font loading, and PDF generation. Per-photo and per-glyph
//! problems are handled where they occur (the element is skipped and a
//! warning logged) and never abort a document.

use chrono::NaiveDate;
use thiserror::Error;

/// The unified error type returned by all public API functions.
#[derive(Debug, Error)]
pub enum BookletError {
    /// JSON input failed to parse as a valid generation request.
    #[error("Failed to parse request: {source}{}", hint_suffix(.hint))]
    ParseError {
        source: serde_json::Error,
        hint: String,
    },
    /// The requested range ends before it starts.
    #[error("Invalid date range: {start} - {end} (start must not be after end)")]
    InvalidDateRange { start: NaiveDate, end: NaiveDate },
    /// The document font could not be loaded, parsed, or embedded.
    #[error("Font error: {0}")]
    FontError(String),
    /// The photo fetcher could not be constructed.
    #[error("Photo fetcher error: {0}")]
    FetchError(String),
    /// PDF generation failed.
    #[error("Render error: {0}")]
    RenderError(String),
}

fn hint_suffix(hint: &str) -> String {
    if hint.is_empty() {
        String::new()
    } else {
        format!("\n  Hint: {}", hint)
    }
}

impl From<serde_json::Error> for BookletError {
    fn from(e: serde_json::Error) -> Self {
        let hint = match e.classify() {
            serde_json::error::Category::Syntax => {
                "Check for trailing commas, missing quotes, or unescaped characters.".to_string()
            }
            serde_json::error::Category::Data => {
                "The JSON is valid but doesn't match the generation request schema. Check field names and types.".to_string()
            }
            serde_json::error::Category::Eof => {
                "Unexpected end of input. Is the JSON truncated?".to_string()
            }
            serde_json::error::Category::Io => String::new(),
        };
        BookletError::ParseError { source: e, hint }
    }
}
