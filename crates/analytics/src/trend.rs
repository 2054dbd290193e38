//! Month-over-month trend formatting.

/// Percentage trend between a current and previous value.
///
/// A zero previous value has no meaningful ratio: the trend is pinned to
/// `+0%` when current is also zero and `+100%` otherwise. Non-negative
/// percentages carry an explicit `+` prefix.
pub fn format_trend(current: i64, previous: i64) -> String {
    if previous == 0 {
        return if current == 0 {
            "+0%".to_string()
        } else {
            "+100%".to_string()
        };
    }
    let percent = (((current - previous) as f64 / previous as f64) * 100.0).round() as i64;
    if percent >= 0 {
        format!("+{percent}%")
    } else {
        format!("{percent}%")
    }
}
