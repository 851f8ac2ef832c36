//! Page geometry and vertical space budgeting.
//!
//! Every measurement is in PDF points. A body page stacks two equal-height
//! day slots inside the margins; within a slot the photo area is sized
//! first, against reserves that guarantee the diary text and the event
//! timeline keep a usable minimum when they have something to show.

use crate::model::PageSizeId;

/// Day entries laid out per body page.
pub const ENTRIES_PER_PAGE: usize = 2;

/// Vertical band at the top of a slot holding the date and age labels.
pub const HEADER_HEIGHT: f64 = 45.0;

/// Extra inset below the separator rule for the lower slot of a page.
pub const SLOT_RULE_GAP: f64 = 14.0;

/// Gap between the photo, text and timeline sections of a slot.
pub const SECTION_GAP: f64 = 6.0;

/// Photo area height bounds.
pub const PHOTO_MIN_HEIGHT: f64 = 80.0;
pub const PHOTO_MAX_HEIGHT: f64 = 220.0;

/// Gap between photos inside a grid.
pub const PHOTO_GAP: f64 = 8.0;

/// Photos drawn per day; extras are dropped.
pub const MAX_PHOTOS_PER_ENTRY: usize = 4;

pub const TEXT_FONT_SIZE: f64 = 11.0;
pub const TEXT_LINE_HEIGHT: f64 = 16.0;
/// First text baseline sits this far below the top of the text block.
pub const TEXT_FIRST_BASELINE: f64 = 7.0;
pub const MAX_TEXT_LINES: usize = 8;

pub const TIMELINE_FONT_SIZE: f64 = 9.0;
pub const TIMELINE_ROW_HEIGHT: f64 = 12.0;
pub const MAX_TIMELINE_ROWS: usize = 15;

/// Space held back from the photo area when the section will render.
pub const MIN_TEXT_RESERVE: f64 = 48.0;
pub const MIN_TIMELINE_RESERVE: f64 = 50.0;

/// Slack kept below the photo area so it never kisses the slot bottom.
const PHOTO_BOTTOM_SLACK: f64 = 10.0;

pub const DATE_FONT_SIZE: f64 = 16.0;
pub const AGE_FONT_SIZE: f64 = 10.0;
/// Gap between the date label and the inline age label.
pub const AGE_GAP: f64 = 8.0;

/// Physical page dimensions and margins for one page size.
#[derive(Debug, Clone, Copy)]
pub struct PageMetrics {
    pub width: f64,
    pub height: f64,
    pub margin: f64,
}

impl PageMetrics {
    pub fn of(size: PageSizeId) -> Self {
        match size {
            PageSizeId::A4 => PageMetrics {
                width: 595.28,
                height: 841.89,
                margin: 42.52,
            },
            PageSizeId::A5 => PageMetrics {
                width: 419.53,
                height: 595.28,
                margin: 42.52,
            },
        }
    }

    pub fn content_width(&self) -> f64 {
        self.width - 2.0 * self.margin
    }

    /// Height of one day slot (content area split evenly).
    pub fn slot_height(&self) -> f64 {
        (self.height - 2.0 * self.margin) / ENTRIES_PER_PAGE as f64
    }
}

/// Height granted to the photo area of one slot.
///
/// `avail` is the slot space below the header. Reserves are withheld only
/// for sections that will actually render, then the result is clamped to
/// the photo bounds so a crowded slot still shows a recognizable photo and
/// a sparse one does not balloon.
pub fn photo_budget(avail: f64, reserve_text: bool, reserve_timeline: bool) -> f64 {
    let reserved = if reserve_text { MIN_TEXT_RESERVE } else { 0.0 }
        + if reserve_timeline {
            MIN_TIMELINE_RESERVE
        } else {
            0.0
        };
    (avail - reserved - PHOTO_BOTTOM_SLACK).clamp(PHOTO_MIN_HEIGHT, PHOTO_MAX_HEIGHT)
}

/// Wrapped text lines that fit in `remaining` points, capped at the
/// per-day maximum. Overflow is dropped, not reflowed.
pub fn text_line_capacity(remaining: f64) -> usize {
    let fit = ((remaining - TEXT_FIRST_BASELINE) / TEXT_LINE_HEIGHT).floor();
    if fit <= 0.0 {
        return 0;
    }
    (fit as usize).min(MAX_TEXT_LINES)
}

/// Timeline rows shown and hidden for `events` events in `remaining`
/// points. When not everything fits, one row slot is given up to the
/// "+N more" footer.
pub fn timeline_fit(remaining: f64, events: usize) -> (usize, usize) {
    let fit = (remaining / TIMELINE_ROW_HEIGHT).floor();
    let capacity = if fit <= 0.0 {
        0
    } else {
        (fit as usize).min(MAX_TIMELINE_ROWS)
    };

    if events <= capacity {
        (events, 0)
    } else if capacity == 0 {
        (0, events)
    } else {
        (capacity - 1, events - (capacity - 1))
    }
}
