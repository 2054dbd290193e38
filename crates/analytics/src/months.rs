//! Calendar-month bucketing helpers.

use chrono::{DateTime, Datelike, NaiveDate};

/// Permissive date parse used for aggregation bucketing.
///
/// Accepts plain ISO dates (`YYYY-MM-DD`) and RFC3339 timestamps; anything
/// else is `None` and the record is excluded from month buckets.
pub fn parse_date_permissive(value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(date) = trimmed.parse::<NaiveDate>() {
        return Some(date);
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(ts.date_naive());
    }
    None
}

/// Month bucket key, `YYYY-MM`.
pub fn month_key(date: NaiveDate) -> String {
    format!("{:04}-{:02}", date.year(), date.month())
}

/// Whether two dates fall in the same calendar month.
pub fn same_month(a: NaiveDate, b: NaiveDate) -> bool {
    a.year() == b.year() && a.month() == b.month()
}

/// Shift a date's month by `delta` months (day pinned to the 1st).
pub fn shift_month(date: NaiveDate, delta: i32) -> NaiveDate {
    let total = date.year() * 12 + date.month0() as i32 + delta;
    let year = total.div_euclid(12);
    let month = total.rem_euclid(12) as u32 + 1;
    NaiveDate::from_ymd_opt(year, month, 1).expect("first of month is always valid")
}

/// Month keys for the trailing `n` calendar months ending at `today`'s
/// month, chronologically ascending.
pub fn trailing_month_keys(today: NaiveDate, n: usize) -> Vec<String> {
    (0..n as i32)
        .rev()
        .map(|back| month_key(shift_month(today, -back)))
        .collect()
}

/// Month keys for the `n` months after `today`'s month, ascending.
pub fn upcoming_month_keys(today: NaiveDate, n: usize) -> Vec<String> {
    (1..=n as i32)
        .map(|ahead| month_key(shift_month(today, ahead)))
        .collect()
}
