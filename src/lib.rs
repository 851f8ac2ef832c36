//! # hibinote
//!
//! A baby-care diary booklet generator.
//!
//! Parents log diary text, photos and care events (feeds, naps, baths,
//! temperatures) in an app; hibinote turns a date range of that data into
//! a printable PDF booklet: a cover page with the child's name, then two
//! days per page with photo grids, diary text and an event timeline.
//!
//! The PDF is written from scratch with a full CJK-capable font embedded,
//! so Japanese diary text renders identically in every viewer and prints
//! at the exact physical page size.
//!
//! ## Architecture
//!
//! ```text
//! GenerationRequest (JSON/API)
//!       ↓
//!   [model]     request shapes: diaries, events, themes
//!       ↓
//!   [layout]    cover + day slots, greedy top-down space budgets
//!       ↓         (photos via [image_loader], text via [text]/[font])
//!   [pdf]       serialize to PDF bytes
//! ```
//!
//! Photo fetch or decode failures degrade to omitting that photo; an
//! invalid date range or an unusable font fails the whole call.

pub mod calendar;
pub mod error;
pub mod font;
pub mod image_loader;
pub mod layout;
pub mod model;
pub mod pdf;
pub mod text;
pub mod theme;

pub use error::BookletError;
pub use font::BookletFont;
pub use image_loader::{HttpPhotoFetcher, PhotoFetcher};
pub use model::GenerationRequest;

use pdf::PdfWriter;
use theme::Theme;

/// Generate the booklet for `request`.
///
/// This is the primary entry point. Renders with `font` and resolves
/// photo references through `fetcher`, returning the raw bytes of a
/// valid PDF file.
pub fn generate(
    request: &GenerationRequest,
    font: &BookletFont,
    fetcher: &dyn PhotoFetcher,
) -> Result<Vec<u8>, BookletError> {
    let theme = Theme::resolve(request.theme);
    let pages = layout::compose(request, &theme, font, fetcher)?;

    let title = format!(
        "{} {} - {}",
        request.child_name, request.start_date, request.end_date
    );
    let writer = PdfWriter::new(font);
    Ok(writer.write(&pages, &title))
}

/// Generate the booklet for a request described as JSON.
pub fn generate_json(
    json: &str,
    font: &BookletFont,
    fetcher: &dyn PhotoFetcher,
) -> Result<Vec<u8>, BookletError> {
    let request: GenerationRequest = serde_json::from_str(json)?;
    generate(&request, font, fetcher)
}
