//! Date normalisation.
//!
//! Upstream pages and APIs describe publication time in several shapes:
//! absolute dotted dates (`2025.05.06. 오후 3:12`), relative markers
//! (`3시간 전`, `2 days ago`) and RFC-2822 timestamps from the search API
//! (`Mon, 27 Nov 2025 14:30:00 +0900`). Everything is reduced to a canonical
//! `YYYY-MM-DD` string. Unparseable input resolves to today; nothing in this
//! module returns an error.

use crate::utils::today;
use chrono::{DateTime, Days, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

static ABSOLUTE_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{4})[.\-](\d{2})[.\-](\d{2})").unwrap());

static SAME_DAY_RELATIVE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(\d+\s*(시간|분|초)\s*전|방금\s*전|\d+\s*(hours?|minutes?|mins?|seconds?|secs?)\s+ago|just now)")
        .unwrap()
});

static DAYS_AGO: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(\d+)\s*(?:일\s*전|days?\s+ago)").unwrap());

/// Normalise `raw` relative to the local current date.
///
/// # Arguments
///
/// * `raw` - Date text as printed next to a headline: `2025.05.06. 오후 3:12`,
///   `3시간 전`, `2일 전`, an RFC-2822 timestamp, or anything else.
///
/// # Returns
///
/// A `YYYY-MM-DD` string. Unrecognised text yields today's date; this never
/// fails. See [`normalize_on`] for the rules.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(normalize("2025.05.06. 오후 3:12"), "2025-05-06");
/// assert_eq!(normalize("방금 전"), today().format(DATE_FORMAT).to_string());
/// ```
pub fn normalize(raw: &str) -> String {
    normalize_on(raw, today())
}

/// Normalise `raw`, resolving relative markers against `today`.
///
/// Rules, first match wins:
/// 1. `YYYY.MM.DD…` / `YYYY-MM-DD…` prefix that forms a real date
/// 2. hours / minutes / seconds ago → `today`
/// 3. `N days ago` → `today - N`
/// 4. RFC-2822 or RFC-3339 timestamp → its calendar date
/// 5. anything else → `today`
pub fn normalize_on(raw: &str, today: NaiveDate) -> String {
    resolve(raw.trim(), today)
        .unwrap_or_else(|| {
            debug!(raw, "Unrecognised date text; defaulting to today");
            today
        })
        .format(DATE_FORMAT)
        .to_string()
}

fn resolve(text: &str, today: NaiveDate) -> Option<NaiveDate> {
    if text.is_empty() {
        return None;
    }

    if let Some(caps) = ABSOLUTE_PREFIX.captures(text) {
        let year = caps[1].parse().ok()?;
        let month = caps[2].parse().ok()?;
        let day = caps[3].parse().ok()?;
        if let Some(date) = NaiveDate::from_ymd_opt(year, month, day) {
            return Some(date);
        }
    }

    if SAME_DAY_RELATIVE.is_match(text) {
        return Some(today);
    }

    if let Some(caps) = DAYS_AGO.captures(text) {
        let days: u64 = caps[1].parse().ok()?;
        return today.checked_sub_days(Days::new(days));
    }

    if let Ok(ts) = DateTime::parse_from_rfc2822(text) {
        return Some(ts.date_naive());
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(text) {
        return Some(ts.date_naive());
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_absolute_prefix_dotted() {
        let today = day(2025, 6, 1);
        assert_eq!(normalize_on("2025.05.06. 오후 3:12", today), "2025-05-06");
        assert_eq!(normalize_on("2024.12.31.", today), "2024-12-31");
    }

    #[test]
    fn test_absolute_prefix_dashed() {
        let today = day(2025, 6, 1);
        assert_eq!(normalize_on("2025-01-02T09:00:00", today), "2025-01-02");
    }

    #[test]
    fn test_absolute_prefix_matches_first_ten_chars() {
        let today = day(2025, 6, 1);
        for raw in ["2023.07.15", "2023.07.15 extra", "2023-07-15.", "2023.07.15. 14:00"] {
            let expected = raw[..10].replace('.', "-");
            assert_eq!(normalize_on(raw, today), expected);
        }
    }

    #[test]
    fn test_invalid_calendar_date_defaults_to_today() {
        let today = day(2025, 6, 1);
        assert_eq!(normalize_on("2025.13.45", today), "2025-06-01");
    }

    #[test]
    fn test_hours_and_minutes_ago_are_today() {
        let today = day(2025, 6, 1);
        assert_eq!(normalize_on("3시간 전", today), "2025-06-01");
        assert_eq!(normalize_on("15분 전", today), "2025-06-01");
        assert_eq!(normalize_on("2 hours ago", today), "2025-06-01");
        assert_eq!(normalize_on("45 minutes ago", today), "2025-06-01");
    }

    #[test]
    fn test_days_ago_subtracts() {
        let today = day(2025, 3, 2);
        assert_eq!(normalize_on("3일 전", today), "2025-02-27");
        assert_eq!(normalize_on("3 days ago", today), "2025-02-27");
        assert_eq!(normalize_on("1 day ago", today), "2025-03-01");
    }

    #[test]
    fn test_days_ago_relative_to_now() {
        let expected = (today() - chrono::Duration::days(3)).format(DATE_FORMAT).to_string();
        assert_eq!(normalize("3 days ago"), expected);
    }

    #[test]
    fn test_rfc2822_timestamp() {
        let today = day(2025, 6, 1);
        assert_eq!(normalize_on("Thu, 27 Nov 2025 14:30:00 +0900", today), "2025-11-27");
    }

    #[test]
    fn test_rfc2822_keeps_source_offset_date() {
        let today = day(2025, 6, 1);
        // 00:30 KST is still the previous day in UTC; the source's own date wins.
        assert_eq!(normalize_on("Fri, 28 Nov 2025 00:30:00 +0900", today), "2025-11-28");
    }

    #[test]
    fn test_garbage_defaults_to_today() {
        let today = day(2025, 6, 1);
        assert_eq!(normalize_on("", today), "2025-06-01");
        assert_eq!(normalize_on("yesterday-ish", today), "2025-06-01");
        assert_eq!(normalize_on("Mon, 99 Foo 2025", today), "2025-06-01");
    }

    #[test]
    fn test_huge_day_count_defaults_to_today() {
        let today = day(2025, 6, 1);
        assert_eq!(normalize_on("99999999999999999999999일 전", today), "2025-06-01");
    }
}
