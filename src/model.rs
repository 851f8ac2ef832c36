//! # Input Data Model
//!
//! A [`GenerationRequest`] is everything one booklet export needs: the child,
//! the date range, diary entries keyed by date, care-event records, and the
//! presentation knobs (theme, page size, section toggles).
//!
//! Care events are a tagged union so the timeline formatter can match
//! exhaustively; adding a record type without a label is a compile error.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// The complete input for one booklet.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRequest {
    #[serde(default)]
    pub theme: ThemeId,
    pub child_name: String,
    /// Drives the 「生後N日目」 age label on each day.
    pub birthday: NaiveDate,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default)]
    pub diaries: Vec<DiaryEntry>,
    #[serde(default)]
    pub events: Vec<EventRecord>,
    /// URL or data URI. Already cropped by the caller; a circular
    /// silhouette arrives as a PNG with transparent corners.
    #[serde(default)]
    pub cover_photo: Option<String>,
    #[serde(default = "default_true")]
    pub include_text: bool,
    #[serde(default = "default_true")]
    pub include_timeline: bool,
    #[serde(default)]
    pub page_size: PageSizeId,
}

fn default_true() -> bool {
    true
}

/// One diary entry. Dates inside the requested range with no entry still
/// get a slot in the booklet; dates outside the range are ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiaryEntry {
    pub date: NaiveDate,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub photo_urls: Vec<String>,
}

/// One care-event record. `recorded_at` is the device-local wall time
/// (`YYYY-MM-DDTHH:MM:SS`); records group onto the day page matching its
/// date part, in input order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRecord {
    pub recorded_at: NaiveDateTime,
    #[serde(flatten)]
    pub kind: EventKind,
    #[serde(default)]
    pub memo: Option<String>,
}

/// Every record type the diary app tracks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum EventKind {
    #[serde(rename_all = "camelCase")]
    Milk { amount_ml: u32 },
    #[serde(rename_all = "camelCase")]
    Breast {
        #[serde(default)]
        left_minutes: u32,
        #[serde(default)]
        right_minutes: u32,
    },
    BabyFood,
    Snack,
    Poop,
    Pee,
    Sleep { state: SleepState },
    Bath,
    Walk,
    Temperature { celsius: f64 },
    Medicine,
    Condition { kind: ConditionKind },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SleepState {
    Asleep,
    Awake,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionKind {
    Cough,
    Rash,
    Vomit,
    Injury,
}

impl EventKind {
    /// Timeline label. Sleep records label themselves by what happened
    /// rather than by category.
    pub fn label(&self) -> &'static str {
        match self {
            EventKind::Milk { .. } => "ミルク",
            EventKind::Breast { .. } => "母乳",
            EventKind::BabyFood => "離乳食",
            EventKind::Snack => "おやつ",
            EventKind::Poop => "うんち",
            EventKind::Pee => "おしっこ",
            EventKind::Sleep { state: SleepState::Asleep } => "寝た",
            EventKind::Sleep { state: SleepState::Awake } => "起きた",
            EventKind::Bath => "お風呂",
            EventKind::Walk => "さんぽ",
            EventKind::Temperature { .. } => "体温",
            EventKind::Medicine => "くすり",
            EventKind::Condition { .. } => "体調",
        }
    }

    /// Measured value rendered after the label, if the type carries one.
    pub fn detail(&self) -> Option<String> {
        match self {
            EventKind::Milk { amount_ml } => Some(format!("{}ml", amount_ml)),
            EventKind::Breast {
                left_minutes,
                right_minutes,
            } => {
                let mut parts = Vec::new();
                if *left_minutes > 0 {
                    parts.push(format!("左{}分", left_minutes));
                }
                if *right_minutes > 0 {
                    parts.push(format!("右{}分", right_minutes));
                }
                if parts.is_empty() {
                    None
                } else {
                    Some(parts.join(" "))
                }
            }
            EventKind::Temperature { celsius } => Some(format!("{:.1}℃", celsius)),
            EventKind::Condition { kind } => Some(
                match kind {
                    ConditionKind::Cough => "せき",
                    ConditionKind::Rash => "発疹",
                    ConditionKind::Vomit => "嘔吐",
                    ConditionKind::Injury => "けが",
                }
                .to_string(),
            ),
            _ => None,
        }
    }
}

/// Which of the built-in booklet themes to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ThemeId {
    #[default]
    Simple,
    Natural,
    PastelPink,
    PastelBlue,
}

/// Physical page size of the booklet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageSizeId {
    #[default]
    A4,
    A5,
}
