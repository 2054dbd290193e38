//! Dashboard KPI aggregation over the invoice ledger.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use ledgerly_core::CurrencyCode;
use ledgerly_invoicing::{Invoice, InvoiceStatus};
use ledgerly_rates::{RateProvider, from_reference, to_reference};

use crate::months::{parse_date_permissive, same_month, shift_month};
use crate::trend::format_trend;

/// One dashboard KPI: a display-currency value plus a month-over-month trend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Kpi {
    pub label: String,
    pub value_cents: i64,
    pub trend: String,
}

/// Undated, all-time totals in the display currency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardTotals {
    pub total_revenue_cents: i64,
    pub outstanding_cents: i64,
    pub overdue_cents: i64,
    pub due_cents: i64,
    pub invoice_count: usize,
    pub customer_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardKpis {
    pub totals: DashboardTotals,
    pub total_outstanding: Kpi,
    pub due_soon: Kpi,
    pub overdue: Kpi,
    pub paid_this_month: Kpi,
    pub currency: CurrencyCode,
}

/// Reference-currency total of one invoice, preferring the cached value
/// written at invoice time (historical rate) over the live table.
fn invoice_total_usd(invoice: &Invoice, rates: &impl RateProvider) -> i64 {
    match invoice.total_cents_usd {
        Some(cached) => cached,
        None => to_reference(invoice.total_cents, &invoice.currency, rates),
    }
}

/// USD sum of invoices in a status group, restricted to the calendar month
/// of `anchor` by issue date. Invoices with unparseable issue dates are
/// excluded from the bucket, not an error.
fn month_sum_usd(
    invoices: &[Invoice],
    in_group: impl Fn(InvoiceStatus) -> bool,
    anchor: NaiveDate,
    rates: &impl RateProvider,
) -> i64 {
    invoices
        .iter()
        .filter(|inv| in_group(inv.status))
        .filter(|inv| {
            inv.issue_date
                .as_deref()
                .and_then(parse_date_permissive)
                .is_some_and(|d| same_month(d, anchor))
        })
        .map(|inv| invoice_total_usd(inv, rates))
        .sum()
}

/// Compute the dashboard KPI view for one user's invoices.
///
/// Monthly sums and trends are computed in USD first, then converted to the
/// display currency, so the trend percentage is rate-independent.
pub fn dashboard_kpis(
    invoices: &[Invoice],
    customer_count: usize,
    display_currency: &CurrencyCode,
    rates: &impl RateProvider,
    today: NaiveDate,
) -> DashboardKpis {
    let sum_usd = |in_group: &dyn Fn(InvoiceStatus) -> bool| -> i64 {
        invoices
            .iter()
            .filter(|inv| in_group(inv.status))
            .map(|inv| invoice_total_usd(inv, rates))
            .sum()
    };

    let display = |usd: i64| from_reference(usd, display_currency, rates);

    let previous_month = shift_month(today, -1);

    let kpi = |label: &str, in_group: fn(InvoiceStatus) -> bool| -> Kpi {
        let current = month_sum_usd(invoices, in_group, today, rates);
        let previous = month_sum_usd(invoices, in_group, previous_month, rates);
        Kpi {
            label: label.to_string(),
            value_cents: display(current),
            trend: format_trend(current, previous),
        }
    };

    let total_outstanding = kpi("Total Outstanding", InvoiceStatus::is_outstanding);
    let due_soon = kpi("Due Soon", InvoiceStatus::is_awaiting_payment);
    let overdue = kpi("Overdue", InvoiceStatus::is_overdue);
    let paid_this_month = kpi("Paid This Month", InvoiceStatus::is_paid);

    DashboardKpis {
        totals: DashboardTotals {
            total_revenue_cents: display(sum_usd(&InvoiceStatus::is_paid)),
            outstanding_cents: display(sum_usd(&InvoiceStatus::is_outstanding)),
            overdue_cents: display(sum_usd(&InvoiceStatus::is_overdue)),
            due_cents: display(sum_usd(&InvoiceStatus::is_awaiting_payment)),
            invoice_count: invoices.len(),
            customer_count,
        },
        total_outstanding,
        due_soon,
        overdue,
        paid_this_month,
        currency: display_currency.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::collections::HashMap;

    use ledgerly_core::{CustomerId, InvoiceId, UserId};
    use ledgerly_customers::CustomerSnapshot;

    struct MapRates(HashMap<&'static str, f64>);

    impl RateProvider for MapRates {
        fn rate(&self, currency: &CurrencyCode) -> Option<f64> {
            self.0.get(currency.as_str()).copied()
        }
    }

    fn snapshot() -> CustomerSnapshot {
        CustomerSnapshot {
            name: "Acme".to_string(),
            email: None,
            phone: None,
            billing_address: None,
            shipping_address: None,
            tax_id: None,
            gst_number: None,
        }
    }

    fn invoice(
        status: InvoiceStatus,
        total_cents: i64,
        currency: &str,
        issue_date: Option<&str>,
        total_cents_usd: Option<i64>,
    ) -> Invoice {
        Invoice {
            id: InvoiceId::new(),
            user_id: UserId::new(),
            customer_id: CustomerId::new(),
            customer: snapshot(),
            invoice_number: "INV-1".to_string(),
            issue_date: issue_date.map(str::to_string),
            due_date: None,
            currency: CurrencyCode::parse(currency).unwrap(),
            subtotal_cents: total_cents,
            tax_cents: 0,
            discount_cents: 0,
            total_cents,
            total_cents_usd,
            status: InvoiceStatus::Draft,
            note: None,
            source: None,
            created_at: Utc::now(),
        }
        .with_status(status)
    }

    trait WithStatus {
        fn with_status(self, status: InvoiceStatus) -> Self;
    }

    impl WithStatus for Invoice {
        fn with_status(mut self, status: InvoiceStatus) -> Self {
            self.status = status;
            self
        }
    }

    fn today() -> NaiveDate {
        "2025-08-15".parse().unwrap()
    }

    #[test]
    fn groups_treat_status_synonyms_identically() {
        let rates = MapRates(HashMap::new());
        let invoices = vec![
            invoice(InvoiceStatus::Due, 100, "USD", Some("2025-08-01"), None),
            invoice(InvoiceStatus::Sent, 200, "USD", Some("2025-08-02"), None),
            invoice(InvoiceStatus::Unpaid, 400, "USD", Some("2025-08-03"), None),
            invoice(InvoiceStatus::Overdue, 800, "USD", Some("2025-08-04"), None),
            invoice(InvoiceStatus::Paid, 1600, "USD", Some("2025-08-05"), None),
            invoice(InvoiceStatus::Draft, 3200, "USD", Some("2025-08-06"), None),
        ];

        let kpis = dashboard_kpis(&invoices, 3, &CurrencyCode::usd(), &rates, today());
        assert_eq!(kpis.total_outstanding.value_cents, 100 + 200 + 400 + 800);
        assert_eq!(kpis.due_soon.value_cents, 100 + 200);
        assert_eq!(kpis.overdue.value_cents, 800);
        assert_eq!(kpis.paid_this_month.value_cents, 1600);
        assert_eq!(kpis.totals.total_revenue_cents, 1600);
        assert_eq!(kpis.totals.invoice_count, 6);
        assert_eq!(kpis.totals.customer_count, 3);
    }

    #[test]
    fn month_bucketing_drives_trends() {
        let rates = MapRates(HashMap::new());
        let invoices = vec![
            invoice(InvoiceStatus::Paid, 3000, "USD", Some("2025-08-10"), None),
            invoice(InvoiceStatus::Paid, 2000, "USD", Some("2025-07-10"), None),
        ];

        let kpis = dashboard_kpis(&invoices, 0, &CurrencyCode::usd(), &rates, today());
        assert_eq!(kpis.paid_this_month.value_cents, 3000);
        assert_eq!(kpis.paid_this_month.trend, "+50%");
        // All-time revenue spans both months.
        assert_eq!(kpis.totals.total_revenue_cents, 5000);
    }

    #[test]
    fn unparseable_issue_dates_are_excluded_from_month_buckets() {
        let rates = MapRates(HashMap::new());
        let invoices = vec![
            invoice(InvoiceStatus::Paid, 3000, "USD", Some("2025-08-10"), None),
            invoice(InvoiceStatus::Paid, 7000, "USD", Some("not a date"), None),
            invoice(InvoiceStatus::Paid, 9000, "USD", None, None),
        ];

        let kpis = dashboard_kpis(&invoices, 0, &CurrencyCode::usd(), &rates, today());
        assert_eq!(kpis.paid_this_month.value_cents, 3000);
        // Undated totals still include everything.
        assert_eq!(kpis.totals.total_revenue_cents, 19000);
    }

    #[test]
    fn cached_usd_total_wins_over_the_live_table() {
        // Live rate says 2.0 AUD/USD; the cache was written at 1.6.
        let rates = MapRates(HashMap::from([("AUD", 2.0)]));
        let invoices = vec![invoice(
            InvoiceStatus::Paid,
            1600,
            "AUD",
            Some("2025-08-10"),
            Some(1000),
        )];

        let kpis = dashboard_kpis(&invoices, 0, &CurrencyCode::usd(), &rates, today());
        assert_eq!(kpis.totals.total_revenue_cents, 1000);
    }

    #[test]
    fn missing_rate_contributes_zero_not_an_error() {
        let rates = MapRates(HashMap::new());
        let invoices = vec![
            invoice(InvoiceStatus::Paid, 5000, "EUR", Some("2025-08-10"), None),
            invoice(InvoiceStatus::Paid, 700, "USD", Some("2025-08-11"), None),
        ];

        let kpis = dashboard_kpis(&invoices, 0, &CurrencyCode::usd(), &rates, today());
        assert_eq!(kpis.totals.total_revenue_cents, 700);
    }

    #[test]
    fn display_conversion_applies_to_values_but_not_trends() {
        let rates = MapRates(HashMap::from([("AUD", 2.0)]));
        let invoices = vec![
            invoice(InvoiceStatus::Paid, 100, "USD", Some("2025-08-10"), None),
            invoice(InvoiceStatus::Paid, 50, "USD", Some("2025-07-10"), None),
        ];

        let display = CurrencyCode::parse("AUD").unwrap();
        let kpis = dashboard_kpis(&invoices, 0, &display, &rates, today());
        // Values converted into AUD at 2.0.
        assert_eq!(kpis.paid_this_month.value_cents, 200);
        // Trend computed on the USD sums.
        assert_eq!(kpis.paid_this_month.trend, "+100%");
    }
}
