//! Billing interval arithmetic.
//!
//! All calendar math is done on plain UTC dates (`NaiveDate`) — never local
//! time — so a schedule's occurrence dates cannot drift across timezones.

use chrono::{Datelike, Days, NaiveDate};
use serde::{Deserialize, Serialize};

/// Billing interval of a recurring schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Interval {
    Weekly,
    Monthly,
    Quarterly,
    Biannually,
    Yearly,
}

impl Interval {
    /// Month step for month-based intervals; `None` for weekly.
    fn months(self) -> Option<u32> {
        match self {
            Interval::Weekly => None,
            Interval::Monthly => Some(1),
            Interval::Quarterly => Some(3),
            Interval::Biannually => Some(6),
            Interval::Yearly => Some(12),
        }
    }
}

/// Next occurrence date for `date` at `interval`.
///
/// Month-based intervals keep the day-of-month where possible and clamp to
/// the last day of the target month on overflow (Jan 31 + monthly →
/// Feb 28/29, Feb 29 + yearly → Feb 28 on non-leap targets). Deterministic
/// and strictly increasing.
pub fn advance(date: NaiveDate, interval: Interval) -> NaiveDate {
    match interval.months() {
        None => date + Days::new(7),
        Some(months) => add_months_clamped(date, months),
    }
}

fn add_months_clamped(date: NaiveDate, months: u32) -> NaiveDate {
    let total_months = date.year() * 12 + date.month0() as i32 + months as i32;
    let year = total_months.div_euclid(12);
    let month = total_months.rem_euclid(12) as u32 + 1;
    let day = date.day().min(last_day_of_month(year, month));
    NaiveDate::from_ymd_opt(year, month, day).expect("clamped day is always valid")
}

fn last_day_of_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|d| d.pred_opt())
        .expect("first of month always has a predecessor")
        .day()
}
