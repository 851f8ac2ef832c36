//! # Page Composition
//!
//! Turns a [`GenerationRequest`](crate::model::GenerationRequest) into an
//! ordered list of [`Page`]s holding primitive draw operations. The PDF
//! serializer consumes those pages without knowing anything about diaries,
//! themes or dates.
//!
//! The booklet is one cover page followed by body pages of two day slots
//! each. Within a slot, space is granted greedily top-down: the photo grid
//! is sized first against reserves for the sections below it, the diary
//! text takes what remains minus the timeline reserve, and the timeline
//! takes the rest. Sections degrade by truncation, never by overlap.
//!
//! Coordinates here run top-down from the upper-left page corner; the PDF
//! writer flips them into PDF's bottom-up space at serialization time.

pub mod budget;

use std::collections::HashMap;

use chrono::NaiveDate;

use crate::calendar;
use crate::error::BookletError;
use crate::font::TextMeasure;
use crate::image_loader::{self, EmbeddableImage, NormalizedPhoto, PhotoFetcher};
use crate::model::{DiaryEntry, EventRecord, GenerationRequest};
use crate::text;
use crate::theme::{Color, Theme};

use budget::PageMetrics;

/// Cover layout. The photo box is drawn as a plain square; circular
/// silhouettes come from the app pre-cropping the upload to a round PNG.
const COVER_PHOTO_BOX: f64 = 200.0;
const COVER_PHOTO_TOP: f64 = 80.0;
const COVER_NAME_SIZE: f64 = 36.0;
const COVER_SUB_SIZE: f64 = 14.0;
/// Name baseline distance below the photo box, and the default baseline
/// offset above the vertical center when there is no photo.
const COVER_NAME_PHOTO_GAP: f64 = 60.0;
const COVER_NAME_CENTER_LIFT: f64 = 20.0;
const COVER_SUB_GAP: f64 = 40.0;

const EMPTY_DAY_MESSAGE: &str = "この日の日記はありません";
const EMPTY_DAY_FONT_SIZE: f64 = 10.0;
const EMPTY_DAY_BASELINE: f64 = 52.0;

/// One finished page: physical size plus draw operations in paint order.
#[derive(Debug)]
pub struct Page {
    pub width: f64,
    pub height: f64,
    pub ops: Vec<DrawOp>,
}

/// Primitive draw operations, in top-down page coordinates.
#[derive(Debug)]
pub enum DrawOp {
    /// Filled rectangle; `y` is the top edge.
    Rect {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        color: Color,
    },
    /// Stroked line segment.
    Line {
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        thickness: f64,
        color: Color,
    },
    /// Text run; `baseline` is measured from the page top.
    Text {
        x: f64,
        baseline: f64,
        size: f64,
        color: Color,
        content: String,
    },
    /// Image placement; `y` is the top edge.
    Image {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        image: EmbeddableImage,
    },
}

/// Compose the whole booklet: cover page, then body pages covering every
/// date of the range in order, two slots per page.
///
/// Photo failures degrade to omission. The only error here is an invalid
/// date range.
pub fn compose(
    request: &GenerationRequest,
    theme: &Theme,
    measure: &dyn TextMeasure,
    fetcher: &dyn PhotoFetcher,
) -> Result<Vec<Page>, BookletError> {
    let metrics = PageMetrics::of(request.page_size);
    let dates = calendar::date_sequence(request.start_date, request.end_date)?;

    let diaries: HashMap<NaiveDate, &DiaryEntry> =
        request.diaries.iter().map(|d| (d.date, d)).collect();

    // Events grouped by calendar date, input (chronological) order kept.
    let mut events_by_date: HashMap<NaiveDate, Vec<&EventRecord>> = HashMap::new();
    for event in &request.events {
        events_by_date
            .entry(event.recorded_at.date())
            .or_default()
            .push(event);
    }

    let mut pages = Vec::with_capacity(1 + dates.len().div_ceil(budget::ENTRIES_PER_PAGE));
    pages.push(compose_cover(request, theme, measure, fetcher, metrics));

    for chunk in dates.chunks(budget::ENTRIES_PER_PAGE) {
        let mut page = blank_page(metrics, theme.content.background.flatten());
        for (slot, date) in chunk.iter().enumerate() {
            if slot > 0 {
                // Rule between the slots sharing this page. Never drawn
                // below the last slot.
                let y = metrics.margin + metrics.slot_height() * slot as f64;
                page.ops.push(DrawOp::Line {
                    x1: metrics.margin,
                    y1: y,
                    x2: metrics.width - metrics.margin,
                    y2: y,
                    thickness: 0.5,
                    color: theme.content.border_color,
                });
            }
            compose_day(
                &mut page,
                metrics,
                theme,
                measure,
                fetcher,
                *date,
                request,
                diaries.get(date).copied(),
                events_by_date.get(date).map(|v| v.as_slice()).unwrap_or(&[]),
                slot,
            );
        }
        pages.push(page);
    }

    Ok(pages)
}

fn blank_page(metrics: PageMetrics, background: Color) -> Page {
    Page {
        width: metrics.width,
        height: metrics.height,
        ops: vec![DrawOp::Rect {
            x: 0.0,
            y: 0.0,
            width: metrics.width,
            height: metrics.height,
            color: background,
        }],
    }
}

fn compose_cover(
    request: &GenerationRequest,
    theme: &Theme,
    measure: &dyn TextMeasure,
    fetcher: &dyn PhotoFetcher,
    metrics: PageMetrics,
) -> Page {
    let mut page = blank_page(metrics, theme.cover.background.flatten());

    let mut name_baseline = metrics.height / 2.0 - COVER_NAME_CENTER_LIFT;

    if let Some(src) = &request.cover_photo {
        match image_loader::load_photo(fetcher, src) {
            Ok(photo) => {
                let box_x = (metrics.width - COVER_PHOTO_BOX) / 2.0;
                let box_top = metrics.margin + COVER_PHOTO_TOP;
                let (w, h) = scale_to_fit(
                    photo.image.width_px,
                    photo.image.height_px,
                    COVER_PHOTO_BOX,
                    COVER_PHOTO_BOX,
                );
                page.ops.push(DrawOp::Image {
                    x: box_x + (COVER_PHOTO_BOX - w) / 2.0,
                    y: box_top + (COVER_PHOTO_BOX - h) / 2.0,
                    width: w,
                    height: h,
                    image: photo.image,
                });
                // Text shifts below the photo only when it actually drew.
                name_baseline = box_top + COVER_PHOTO_BOX + COVER_NAME_PHOTO_GAP;
            }
            Err(e) => log::warn!("Cover photo skipped: {}", e),
        }
    }

    let name = text::sanitize(&request.child_name, measure);
    let name_width = measure.measure(&name, COVER_NAME_SIZE);
    page.ops.push(DrawOp::Text {
        x: (metrics.width - name_width) / 2.0,
        baseline: name_baseline,
        size: COVER_NAME_SIZE,
        color: theme.cover.name_color,
        content: name,
    });

    let subtitle = format!("{} - {}", request.start_date, request.end_date);
    let subtitle_width = measure.measure(&subtitle, COVER_SUB_SIZE);
    page.ops.push(DrawOp::Text {
        x: (metrics.width - subtitle_width) / 2.0,
        baseline: name_baseline + COVER_SUB_GAP,
        size: COVER_SUB_SIZE,
        color: theme.cover.sub_color,
        content: subtitle,
    });

    page
}

#[allow(clippy::too_many_arguments)]
fn compose_day(
    page: &mut Page,
    metrics: PageMetrics,
    theme: &Theme,
    measure: &dyn TextMeasure,
    fetcher: &dyn PhotoFetcher,
    date: NaiveDate,
    request: &GenerationRequest,
    diary: Option<&DiaryEntry>,
    events: &[&EventRecord],
    slot: usize,
) {
    let x = metrics.margin;
    let slot_bottom = metrics.margin + metrics.slot_height() * (slot + 1) as f64;
    let inset = if slot > 0 { budget::SLOT_RULE_GAP } else { 0.0 };
    let origin = metrics.margin + metrics.slot_height() * slot as f64 + inset;

    // Header: date, with the age label inline to its right.
    let date_label = text::sanitize(&calendar::format_date_ja(date), measure);
    let date_width = measure.measure(&date_label, budget::DATE_FONT_SIZE);
    page.ops.push(DrawOp::Text {
        x,
        baseline: origin + budget::DATE_FONT_SIZE,
        size: budget::DATE_FONT_SIZE,
        color: theme.content.date_color,
        content: date_label,
    });

    let age = calendar::age_in_days(request.birthday, date);
    if age >= 0 {
        page.ops.push(DrawOp::Text {
            x: x + date_width + budget::AGE_GAP,
            baseline: origin + budget::DATE_FONT_SIZE,
            size: budget::AGE_FONT_SIZE,
            color: theme.content.day_count_color,
            content: text::sanitize(&calendar::format_age(age), measure),
        });
    }

    let mut cursor = origin + budget::HEADER_HEIGHT;

    // Load up to the photo cap; a failed photo is logged and omitted.
    let mut photos: Vec<NormalizedPhoto> = Vec::new();
    if let Some(entry) = diary {
        for src in entry.photo_urls.iter().take(budget::MAX_PHOTOS_PER_ENTRY) {
            match image_loader::load_photo(fetcher, src) {
                Ok(photo) => photos.push(photo),
                Err(e) => log::warn!("Skipping photo for {}: {}", date, e),
            }
        }
    }

    let content = if request.include_text {
        diary
            .and_then(|d| d.content.as_deref())
            .map(|c| text::sanitize(c, measure))
            .filter(|c| !c.trim().is_empty())
    } else {
        None
    };
    let events: &[&EventRecord] = if request.include_timeline { events } else { &[] };

    let mut drew_photos = false;
    if !photos.is_empty() {
        let avail = slot_bottom - cursor;
        let height_budget = budget::photo_budget(avail, content.is_some(), !events.is_empty());
        let consumed = draw_photo_grid(page, &photos, x, cursor, metrics.content_width(), height_budget);
        cursor += consumed + budget::SECTION_GAP;
        drew_photos = true;
    }

    let mut drew_text = false;
    if let Some(content) = &content {
        let timeline_reserve = if events.is_empty() {
            0.0
        } else {
            budget::MIN_TIMELINE_RESERVE
        };
        let capacity = budget::text_line_capacity(slot_bottom - cursor - timeline_reserve);
        if capacity > 0 {
            let lines = text::wrap(content, measure, budget::TEXT_FONT_SIZE, metrics.content_width());
            let shown = lines.len().min(capacity);
            for (i, line) in lines.iter().take(shown).enumerate() {
                if line.is_empty() {
                    continue; // blank paragraph keeps its row
                }
                page.ops.push(DrawOp::Text {
                    x,
                    baseline: cursor
                        + budget::TEXT_FIRST_BASELINE
                        + budget::TEXT_LINE_HEIGHT * i as f64,
                    size: budget::TEXT_FONT_SIZE,
                    color: theme.content.text_color,
                    content: line.clone(),
                });
            }
            cursor += budget::TEXT_FIRST_BASELINE + budget::TEXT_LINE_HEIGHT * shown as f64;
            drew_text = shown > 0;
        }
    }

    let mut drew_timeline = false;
    if !events.is_empty() {
        let remaining = slot_bottom - cursor - budget::SECTION_GAP;
        let (shown, hidden) = budget::timeline_fit(remaining, events.len());
        if shown > 0 {
            let top = cursor + budget::SECTION_GAP;
            for (i, event) in events.iter().take(shown).enumerate() {
                let row = timeline_row(event, measure);
                page.ops.push(DrawOp::Text {
                    x,
                    baseline: top + budget::TIMELINE_ROW_HEIGHT * (i + 1) as f64,
                    size: budget::TIMELINE_FONT_SIZE,
                    color: theme.content.text_color,
                    content: truncate_to_width(
                        &row,
                        measure,
                        budget::TIMELINE_FONT_SIZE,
                        metrics.content_width(),
                    ),
                });
            }
            if hidden > 0 {
                page.ops.push(DrawOp::Text {
                    x,
                    baseline: top + budget::TIMELINE_ROW_HEIGHT * (shown + 1) as f64,
                    size: budget::TIMELINE_FONT_SIZE,
                    color: theme.content.day_count_color,
                    content: format!("ほか{}件", hidden),
                });
            }
            drew_timeline = true;
        }
    }

    if !drew_photos && !drew_text && !drew_timeline {
        page.ops.push(DrawOp::Text {
            x,
            baseline: origin + EMPTY_DAY_BASELINE,
            size: EMPTY_DAY_FONT_SIZE,
            color: theme.content.day_count_color,
            content: text::sanitize(EMPTY_DAY_MESSAGE, measure),
        });
    }
}

/// Place the photo grid for one slot and return its consumed height.
///
/// 1 photo fills the content width up to the height budget; 2 or 3 sit in
/// equal columns, top-aligned, the row as tall as the tallest; 4 fill a
/// 2x2 grid, each centered in its cell.
fn draw_photo_grid(
    page: &mut Page,
    photos: &[NormalizedPhoto],
    x: f64,
    top: f64,
    width: f64,
    height_budget: f64,
) -> f64 {
    match photos.len() {
        0 => 0.0,
        1 => {
            let image = &photos[0].image;
            let (w, h) = scale_to_fit(image.width_px, image.height_px, width, height_budget);
            page.ops.push(DrawOp::Image {
                x: x + (width - w) / 2.0,
                y: top,
                width: w,
                height: h,
                image: image.clone(),
            });
            h
        }
        n @ (2 | 3) => {
            let col_width = (width - (n - 1) as f64 * budget::PHOTO_GAP) / n as f64;
            let mut tallest: f64 = 0.0;
            for (i, photo) in photos.iter().enumerate() {
                let (w, h) = scale_to_fit(
                    photo.image.width_px,
                    photo.image.height_px,
                    col_width,
                    height_budget,
                );
                page.ops.push(DrawOp::Image {
                    x: x + i as f64 * (col_width + budget::PHOTO_GAP) + (col_width - w) / 2.0,
                    y: top,
                    width: w,
                    height: h,
                    image: photo.image.clone(),
                });
                tallest = tallest.max(h);
            }
            tallest
        }
        _ => {
            let cell_width = (width - budget::PHOTO_GAP) / 2.0;
            let cell_height = (height_budget - budget::PHOTO_GAP) / 2.0;
            for (i, photo) in photos.iter().enumerate().take(4) {
                let (row, col) = (i / 2, i % 2);
                let (w, h) = scale_to_fit(
                    photo.image.width_px,
                    photo.image.height_px,
                    cell_width,
                    cell_height,
                );
                page.ops.push(DrawOp::Image {
                    x: x + col as f64 * (cell_width + budget::PHOTO_GAP) + (cell_width - w) / 2.0,
                    y: top
                        + row as f64 * (cell_height + budget::PHOTO_GAP)
                        + (cell_height - h) / 2.0,
                    width: w,
                    height: h,
                    image: photo.image.clone(),
                });
            }
            height_budget
        }
    }
}

/// Largest size with the source aspect ratio fitting inside the box.
/// Images smaller than the box scale up.
fn scale_to_fit(source_w: u32, source_h: u32, box_w: f64, box_h: f64) -> (f64, f64) {
    if source_w == 0 || source_h == 0 {
        return (0.0, 0.0);
    }
    let ratio = (box_w / source_w as f64).min(box_h / source_h as f64);
    (source_w as f64 * ratio, source_h as f64 * ratio)
}

/// `HH:MM  label  detail  memo` with absent parts omitted.
fn timeline_row(event: &EventRecord, measure: &dyn TextMeasure) -> String {
    let mut row = format!(
        "{}  {}",
        calendar::format_time(event.recorded_at),
        event.kind.label()
    );
    if let Some(detail) = event.kind.detail() {
        row.push_str("  ");
        row.push_str(&detail);
    }
    if let Some(memo) = &event.memo {
        if !memo.is_empty() {
            row.push_str("  ");
            row.push_str(memo);
        }
    }
    text::sanitize(&row, measure)
}

/// Drop trailing characters that would run past `max_width`.
fn truncate_to_width(s: &str, measure: &dyn TextMeasure, size: f64, max_width: f64) -> String {
    let mut out = String::new();
    let mut width = 0.0;
    for ch in s.chars() {
        let w = measure.char_width(ch, size);
        if !out.is_empty() && width + w > max_width {
            break;
        }
        width += w;
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font::StubMeasure;
    use crate::model::{EventKind, PageSizeId, ThemeId};
    use chrono::{NaiveDate, NaiveDateTime};

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn datetime(s: &str) -> NaiveDateTime {
        s.parse().unwrap()
    }

    fn base_request() -> GenerationRequest {
        GenerationRequest {
            theme: ThemeId::Simple,
            child_name: "ゆき".to_string(),
            birthday: date("2024-01-01"),
            start_date: date("2024-01-01"),
            end_date: date("2024-01-03"),
            diaries: Vec::new(),
            events: Vec::new(),
            cover_photo: None,
            include_text: true,
            include_timeline: true,
            page_size: PageSizeId::A4,
        }
    }

    fn diary(d: &str, content: Option<&str>, photo_urls: Vec<&str>) -> DiaryEntry {
        DiaryEntry {
            date: date(d),
            content: content.map(str::to_string),
            photo_urls: photo_urls.into_iter().map(str::to_string).collect(),
        }
    }

    fn milk_event(at: &str, amount: u32) -> EventRecord {
        EventRecord {
            recorded_at: datetime(at),
            kind: EventKind::Milk { amount_ml: amount },
            memo: None,
        }
    }

    /// Fetcher that answers every URL with the same small JPEG.
    struct AnyJpegFetcher(Vec<u8>);

    impl AnyJpegFetcher {
        fn new() -> Self {
            let img = image::RgbImage::from_fn(4, 2, |_, _| image::Rgb([200, 180, 160]));
            let mut buf = Vec::new();
            let encoder = image::codecs::jpeg::JpegEncoder::new(&mut buf);
            image::ImageEncoder::write_image(encoder, img.as_raw(), 4, 2, image::ColorType::Rgb8)
                .unwrap();
            Self(buf)
        }
    }

    impl PhotoFetcher for AnyJpegFetcher {
        fn fetch(&self, _url: &str) -> Result<Vec<u8>, String> {
            Ok(self.0.clone())
        }
    }

    struct FailingFetcher;

    impl PhotoFetcher for FailingFetcher {
        fn fetch(&self, url: &str) -> Result<Vec<u8>, String> {
            Err(format!("unreachable: {}", url))
        }
    }

    fn compose_simple(request: &GenerationRequest, fetcher: &dyn PhotoFetcher) -> Vec<Page> {
        let theme = Theme::resolve(request.theme);
        let measure = StubMeasure::covering_all();
        compose(request, &theme, &measure, fetcher).unwrap()
    }

    fn image_count(page: &Page) -> usize {
        page.ops
            .iter()
            .filter(|op| matches!(op, DrawOp::Image { .. }))
            .count()
    }

    fn line_count(page: &Page) -> usize {
        page.ops
            .iter()
            .filter(|op| matches!(op, DrawOp::Line { .. }))
            .count()
    }

    fn texts_at_size(page: &Page, wanted: f64) -> Vec<&str> {
        page.ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Text { size, content, .. } if (*size - wanted).abs() < 0.001 => {
                    Some(content.as_str())
                }
                _ => None,
            })
            .collect()
    }

    fn has_text_containing(page: &Page, needle: &str) -> bool {
        page.ops.iter().any(|op| match op {
            DrawOp::Text { content, .. } => content.contains(needle),
            _ => false,
        })
    }

    #[test]
    fn test_three_dates_make_cover_plus_two_body_pages() {
        let pages = compose_simple(&base_request(), &FailingFetcher);
        assert_eq!(pages.len(), 3);
    }

    #[test]
    fn test_five_dates_make_three_body_pages() {
        let mut request = base_request();
        request.end_date = date("2024-01-05");
        let pages = compose_simple(&request, &FailingFetcher);
        assert_eq!(pages.len(), 4);
    }

    #[test]
    fn test_separator_only_between_shared_slots() {
        let request = base_request(); // 3 dates -> pages of 2 and 1
        let pages = compose_simple(&request, &FailingFetcher);
        assert_eq!(line_count(&pages[1]), 1);
        assert_eq!(line_count(&pages[2]), 0);
    }

    #[test]
    fn test_photo_cap_at_four() {
        let mut request = base_request();
        request.end_date = date("2024-01-01");
        request.diaries = vec![diary(
            "2024-01-01",
            None,
            vec!["u1", "u2", "u3", "u4", "u5", "u6"],
        )];
        let pages = compose_simple(&request, &AnyJpegFetcher::new());
        assert_eq!(image_count(&pages[1]), 4);
    }

    #[test]
    fn test_fetch_failure_degrades_to_empty_slot() {
        let mut request = base_request();
        request.end_date = date("2024-01-01");
        request.diaries = vec![diary("2024-01-01", None, vec!["u1", "u2"])];
        let pages = compose_simple(&request, &FailingFetcher);
        assert_eq!(pages.len(), 2);
        assert_eq!(image_count(&pages[1]), 0);
        // Nothing rendered in the slot, so the empty-day message shows
        assert!(has_text_containing(&pages[1], "この日の日記はありません"));
    }

    #[test]
    fn test_diary_text_renders_and_empty_days_show_placeholder() {
        let mut request = base_request();
        request.diaries = vec![diary("2024-01-02", Some("こんにちは"), vec![])];
        let pages = compose_simple(&request, &FailingFetcher);

        // 01-01 and 01-02 share the first body page
        assert!(has_text_containing(&pages[1], "こんにちは"));
        assert!(has_text_containing(&pages[1], "この日の日記はありません"));
        assert!(has_text_containing(&pages[2], "この日の日記はありません"));
    }

    #[test]
    fn test_age_label_inline_and_never_negative() {
        let mut request = base_request();
        request.birthday = date("2024-01-02");
        let pages = compose_simple(&request, &FailingFetcher);

        // 01-01 is before the birthday: no age label on that slot
        let ages: Vec<&str> = texts_at_size(&pages[1], budget::AGE_FONT_SIZE)
            .into_iter()
            .filter(|t| t.contains("生後"))
            .collect();
        assert_eq!(ages, vec!["生後 0日目"]);
        assert!(has_text_containing(&pages[2], "生後 1日目"));
    }

    #[test]
    fn test_text_capped_at_eight_lines() {
        let mut request = base_request();
        request.end_date = date("2024-01-01");
        request.diaries = vec![diary("2024-01-01", Some(&"あ".repeat(1000)), vec![])];
        let pages = compose_simple(&request, &FailingFetcher);
        let lines = texts_at_size(&pages[1], budget::TEXT_FONT_SIZE);
        assert_eq!(lines.len(), budget::MAX_TEXT_LINES);
    }

    #[test]
    fn test_timeline_rows_and_overflow_footer() {
        let mut request = base_request();
        request.end_date = date("2024-01-01");
        request.events = (0..20)
            .map(|i| milk_event(&format!("2024-01-01T{:02}:30:00", i), 100 + i as u32))
            .collect();
        let pages = compose_simple(&request, &FailingFetcher);

        let rows = texts_at_size(&pages[1], budget::TIMELINE_FONT_SIZE);
        // 14 event rows plus the footer occupy the 15-row cap
        assert_eq!(rows.len(), budget::MAX_TIMELINE_ROWS);
        assert!(rows[0].starts_with("00:30  ミルク  100ml"));
        assert_eq!(*rows.last().unwrap(), "ほか6件");
    }

    #[test]
    fn test_timeline_row_includes_memo() {
        let mut request = base_request();
        request.end_date = date("2024-01-01");
        request.events = vec![EventRecord {
            recorded_at: datetime("2024-01-01T07:05:00"),
            kind: EventKind::Milk { amount_ml: 140 },
            memo: Some("よく飲んだ".to_string()),
        }];
        let pages = compose_simple(&request, &FailingFetcher);
        assert!(has_text_containing(&pages[1], "07:05  ミルク  140ml  よく飲んだ"));
    }

    #[test]
    fn test_include_flags_suppress_sections() {
        let mut request = base_request();
        request.end_date = date("2024-01-01");
        request.diaries = vec![diary("2024-01-01", Some("ねんねした"), vec![])];
        request.events = vec![milk_event("2024-01-01T07:00:00", 120)];
        request.include_text = false;
        request.include_timeline = false;
        let pages = compose_simple(&request, &FailingFetcher);

        assert!(!has_text_containing(&pages[1], "ねんねした"));
        assert!(!has_text_containing(&pages[1], "ミルク"));
        // With both sections suppressed the slot reads as empty
        assert!(has_text_containing(&pages[1], "この日の日記はありません"));
    }

    #[test]
    fn test_cover_name_shifts_below_photo() {
        use base64::Engine;
        let img = image::RgbaImage::from_pixel(2, 2, image::Rgba([10, 20, 30, 255]));
        let mut png = Vec::new();
        let encoder = image::codecs::png::PngEncoder::new(&mut png);
        image::ImageEncoder::write_image(encoder, img.as_raw(), 2, 2, image::ColorType::Rgba8)
            .unwrap();
        let data_url = format!(
            "data:image/png;base64,{}",
            base64::engine::general_purpose::STANDARD.encode(&png)
        );

        let plain = compose_simple(&base_request(), &FailingFetcher);
        let mut with_photo_request = base_request();
        with_photo_request.cover_photo = Some(data_url);
        let with_photo = compose_simple(&with_photo_request, &FailingFetcher);

        assert_eq!(image_count(&plain[0]), 0);
        assert_eq!(image_count(&with_photo[0]), 1);

        let name_baseline = |page: &Page| {
            page.ops
                .iter()
                .find_map(|op| match op {
                    DrawOp::Text { baseline, size, .. }
                        if (*size - COVER_NAME_SIZE).abs() < 0.001 =>
                    {
                        Some(*baseline)
                    }
                    _ => None,
                })
                .unwrap()
        };
        assert!(name_baseline(&with_photo[0]) < name_baseline(&plain[0]));
        assert!(has_text_containing(&plain[0], "2024-01-01 - 2024-01-03"));
    }

    #[test]
    fn test_failed_cover_photo_keeps_centered_name() {
        let mut request = base_request();
        request.cover_photo = Some("https://photos.example/gone.jpg".to_string());
        let pages = compose_simple(&request, &FailingFetcher);
        assert_eq!(image_count(&pages[0]), 0);
        // Name stays at the no-photo position
        let expected = PageMetrics::of(PageSizeId::A4).height / 2.0 - COVER_NAME_CENTER_LIFT;
        let found = pages[0].ops.iter().any(|op| match op {
            DrawOp::Text { baseline, size, .. } => {
                (*size - COVER_NAME_SIZE).abs() < 0.001 && (*baseline - expected).abs() < 0.001
            }
            _ => false,
        });
        assert!(found);
    }

    #[test]
    fn test_reversed_range_is_fatal() {
        let mut request = base_request();
        request.start_date = date("2024-01-05");
        request.end_date = date("2024-01-01");
        let theme = Theme::resolve(request.theme);
        let measure = StubMeasure::covering_all();
        assert!(compose(&request, &theme, &measure, &FailingFetcher).is_err());
    }

    #[test]
    fn test_scale_to_fit_bounds() {
        let (w, h) = scale_to_fit(400, 200, 100.0, 100.0);
        assert!((w - 100.0).abs() < 0.001);
        assert!((h - 50.0).abs() < 0.001);
        // Small sources scale up
        let (w, h) = scale_to_fit(10, 10, 100.0, 200.0);
        assert!((w - 100.0).abs() < 0.001);
        assert!((h - 100.0).abs() < 0.001);
        assert_eq!(scale_to_fit(0, 10, 100.0, 100.0), (0.0, 0.0));
    }

    #[test]
    fn test_truncate_to_width() {
        let measure = StubMeasure::covering_all();
        // Stub width is size/2 per char: 4 chars fit in 20pt at size 10
        assert_eq!(truncate_to_width("abcdef", &measure, 10.0, 20.0), "abcd");
        assert_eq!(truncate_to_width("ab", &measure, 10.0, 20.0), "ab");
    }
}
