//! # Calendar Math
//!
//! Date-range expansion, age calculation, and the Japanese date/time
//! formats used throughout the booklet.

use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};

use crate::error::BookletError;

const WEEKDAY_KANJI: [&str; 7] = ["日", "月", "火", "水", "木", "金", "土"];

/// Every date from `start` through `end`, inclusive.
///
/// Contiguous, strictly increasing, no duplicates. A reversed range is a
/// request-validation failure, not an empty booklet.
pub fn date_sequence(start: NaiveDate, end: NaiveDate) -> Result<Vec<NaiveDate>, BookletError> {
    if end < start {
        return Err(BookletError::InvalidDateRange { start, end });
    }
    let mut dates = Vec::with_capacity((end - start).num_days() as usize + 1);
    let mut current = start;
    while current <= end {
        dates.push(current);
        match current.succ_opt() {
            Some(next) => current = next,
            None => break, // NaiveDate::MAX; the loop condition already ended
        }
    }
    Ok(dates)
}

/// Whole days since the birthday. 0 on the birthday itself.
pub fn age_in_days(birthday: NaiveDate, date: NaiveDate) -> i64 {
    (date - birthday).num_days()
}

/// `M月D日（曜）`, e.g. `1月2日（火）`.
pub fn format_date_ja(date: NaiveDate) -> String {
    let weekday = WEEKDAY_KANJI[date.weekday().num_days_from_sunday() as usize];
    format!("{}月{}日（{}）", date.month(), date.day(), weekday)
}

/// `生後 N日目`.
pub fn format_age(days: i64) -> String {
    format!("生後 {}日目", days)
}

/// 24-hour `HH:MM` for timeline rows.
pub fn format_time(at: NaiveDateTime) -> String {
    format!("{:02}:{:02}", at.hour(), at.minute())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_sequence_crosses_month_boundary() {
        let dates = date_sequence(d(2024, 1, 30), d(2024, 2, 2)).unwrap();
        assert_eq!(
            dates,
            vec![d(2024, 1, 30), d(2024, 1, 31), d(2024, 2, 1), d(2024, 2, 2)]
        );
    }

    #[test]
    fn test_sequence_handles_leap_day() {
        let dates = date_sequence(d(2024, 2, 28), d(2024, 3, 1)).unwrap();
        assert_eq!(dates, vec![d(2024, 2, 28), d(2024, 2, 29), d(2024, 3, 1)]);
    }

    #[test]
    fn test_sequence_single_day() {
        let dates = date_sequence(d(2024, 5, 5), d(2024, 5, 5)).unwrap();
        assert_eq!(dates, vec![d(2024, 5, 5)]);
    }

    #[test]
    fn test_reversed_range_is_an_error() {
        let err = date_sequence(d(2024, 3, 1), d(2024, 1, 1)).unwrap_err();
        assert!(matches!(err, BookletError::InvalidDateRange { .. }));
    }

    #[test]
    fn test_age_zero_on_birthday() {
        assert_eq!(age_in_days(d(2024, 1, 1), d(2024, 1, 1)), 0);
    }

    #[test]
    fn test_age_counts_leap_february() {
        // 2024-01-01 birthday: 31 (Jan) + 29 (leap Feb) = 60
        assert_eq!(age_in_days(d(2024, 1, 1), d(2024, 3, 1)), 60);
    }

    #[test]
    fn test_format_date_ja() {
        // 2024-01-02 was a Tuesday
        assert_eq!(format_date_ja(d(2024, 1, 2)), "1月2日（火）");
        // 2024-03-03 was a Sunday
        assert_eq!(format_date_ja(d(2024, 3, 3)), "3月3日（日）");
    }

    #[test]
    fn test_format_age() {
        assert_eq!(format_age(0), "生後 0日目");
        assert_eq!(format_age(100), "生後 100日目");
    }

    #[test]
    fn test_format_time_pads() {
        let at = d(2024, 1, 2).and_hms_opt(7, 5, 0).unwrap();
        assert_eq!(format_time(at), "07:05");
    }
}
