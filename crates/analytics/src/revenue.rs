//! Revenue analytics: trailing-12-month series and the growth forecast.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use ledgerly_core::CurrencyCode;
use ledgerly_rates::{RateProvider, from_reference, to_reference};

use crate::months::{month_key, parse_date_permissive, trailing_month_keys, upcoming_month_keys};
use crate::trend::format_trend;

use crate::dashboard::Kpi;

/// Number of trailing months charted.
const CHART_MONTHS: usize = 12;
/// Number of trailing buckets feeding the growth-rate average.
const FORECAST_BASIS_MONTHS: usize = 6;
/// Number of months projected forward.
const FORECAST_MONTHS: usize = 3;

/// One payment joined to its invoice's currency — the only inputs revenue
/// analytics needs per payment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentSample {
    pub amount_cents: i64,
    pub currency: CurrencyCode,
    pub paid_at: String,
}

/// One point in the revenue chart. Forecast points are tagged so the
/// presentation layer can render them distinctly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevenuePoint {
    pub month: String,
    pub revenue_cents: i64,
    pub forecast: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevenueAnalytics {
    pub chart_data: Vec<RevenuePoint>,
    pub forecast_data: Vec<RevenuePoint>,
    pub all_chart_data: Vec<RevenuePoint>,
    pub max_chart_revenue: i64,
    pub month_revenue: Kpi,
    pub transactions: Kpi,
    pub avg_transaction: Kpi,
    pub forecast_next: Kpi,
    pub currency: CurrencyCode,
}

/// Average fractional growth rate over consecutive pairs of `history` with a
/// non-zero predecessor; 0.0 when no pair qualifies.
fn average_growth_rate(history: &[i64]) -> f64 {
    let mut rates = Vec::new();
    for window in history.windows(2) {
        let (prev, curr) = (window[0], window[1]);
        if prev != 0 {
            rates.push((curr - prev) as f64 / prev as f64);
        }
    }
    if rates.is_empty() {
        0.0
    } else {
        rates.iter().sum::<f64>() / rates.len() as f64
    }
}

/// Project `months` values forward by compounding `last` with the average
/// growth rate of the most recent [`FORECAST_BASIS_MONTHS`] buckets.
fn project_forecast(history: &[i64], months: usize) -> Vec<i64> {
    let basis_start = history.len().saturating_sub(FORECAST_BASIS_MONTHS);
    let rate = average_growth_rate(&history[basis_start..]);
    let mut last = history.last().copied().unwrap_or(0) as f64;

    (0..months)
        .map(|_| {
            last *= 1.0 + rate;
            last.round() as i64
        })
        .collect()
}

/// Compute revenue analytics for one user's payments.
///
/// Payments are bucketed by *payment* date (not invoice date) into the
/// trailing 12 calendar months; each amount is normalized through USD into
/// the display currency. Payments with unparseable dates or unconvertible
/// currencies contribute nothing.
pub fn revenue_analytics(
    payments: &[PaymentSample],
    display_currency: &CurrencyCode,
    rates: &impl RateProvider,
    today: NaiveDate,
) -> RevenueAnalytics {
    let keys = trailing_month_keys(today, CHART_MONTHS);

    let mut revenue_by_month: HashMap<&str, i64> = HashMap::new();
    let mut count_by_month: HashMap<&str, u64> = HashMap::new();

    for payment in payments {
        let Some(date) = parse_date_permissive(&payment.paid_at) else {
            continue;
        };
        let key = month_key(date);
        let Some(bucket) = keys.iter().find(|k| **k == key) else {
            continue;
        };
        let usd = to_reference(payment.amount_cents, &payment.currency, rates);
        let display = from_reference(usd, display_currency, rates);
        *revenue_by_month.entry(bucket.as_str()).or_default() += display;
        *count_by_month.entry(bucket.as_str()).or_default() += 1;
    }

    let chart_data: Vec<RevenuePoint> = keys
        .iter()
        .map(|key| RevenuePoint {
            month: key.clone(),
            revenue_cents: revenue_by_month.get(key.as_str()).copied().unwrap_or(0),
            forecast: false,
        })
        .collect();

    let history: Vec<i64> = chart_data.iter().map(|p| p.revenue_cents).collect();
    let projected = project_forecast(&history, FORECAST_MONTHS);
    let forecast_data: Vec<RevenuePoint> = upcoming_month_keys(today, FORECAST_MONTHS)
        .into_iter()
        .zip(projected.iter())
        .map(|(month, &revenue_cents)| RevenuePoint {
            month,
            revenue_cents,
            forecast: true,
        })
        .collect();

    let all_chart_data: Vec<RevenuePoint> = chart_data
        .iter()
        .cloned()
        .chain(forecast_data.iter().cloned())
        .collect();

    let max_chart_revenue = all_chart_data
        .iter()
        .map(|p| p.revenue_cents)
        .max()
        .unwrap_or(0)
        .max(1);

    // Current vs previous month, taken straight from the trailing buckets.
    let current_key = keys.last().map(String::as_str).unwrap_or_default();
    let previous_key = keys
        .get(keys.len().saturating_sub(2))
        .map(String::as_str)
        .unwrap_or_default();

    let current_revenue = revenue_by_month.get(current_key).copied().unwrap_or(0);
    let previous_revenue = revenue_by_month.get(previous_key).copied().unwrap_or(0);
    let current_count = count_by_month.get(current_key).copied().unwrap_or(0) as i64;
    let previous_count = count_by_month.get(previous_key).copied().unwrap_or(0) as i64;

    let avg = |revenue: i64, count: i64| if count == 0 { 0 } else { revenue / count };
    let current_avg = avg(current_revenue, current_count);
    let previous_avg = avg(previous_revenue, previous_count);

    let next_forecast = projected.first().copied().unwrap_or(0);

    RevenueAnalytics {
        chart_data,
        forecast_data,
        all_chart_data,
        max_chart_revenue,
        month_revenue: Kpi {
            label: "Total Revenue".to_string(),
            value_cents: current_revenue,
            trend: format_trend(current_revenue, previous_revenue),
        },
        transactions: Kpi {
            label: "Transactions".to_string(),
            value_cents: current_count,
            trend: format_trend(current_count, previous_count),
        },
        avg_transaction: Kpi {
            label: "Avg. Transaction".to_string(),
            value_cents: current_avg,
            trend: format_trend(current_avg, previous_avg),
        },
        forecast_next: Kpi {
            label: "Forecast (Next Month)".to_string(),
            value_cents: next_forecast,
            trend: format_trend(next_forecast, current_revenue),
        },
        currency: display_currency.clone(),
    }
}
