use std::sync::Arc;

use chrono::NaiveDate;

use ledgerly_analytics::{
    DashboardKpis, PaymentSample, RevenueAnalytics, dashboard_kpis, revenue_analytics,
};
use ledgerly_core::{CurrencyCode, UserId};
use ledgerly_rates::RateProvider;

use crate::store::{CustomerStore, InvoiceStore, PaymentStore, UserProfileStore};

use super::ServiceResult;

/// Read-only aggregation over the ledger: dashboard KPIs and revenue
/// analytics, both computed on demand (no materialized view).
#[derive(Clone)]
pub struct AnalyticsService {
    invoices: Arc<dyn InvoiceStore>,
    payments: Arc<dyn PaymentStore>,
    customers: Arc<dyn CustomerStore>,
    profiles: Arc<dyn UserProfileStore>,
    rates: Arc<dyn RateProvider + Send + Sync>,
}

impl AnalyticsService {
    pub fn new(
        invoices: Arc<dyn InvoiceStore>,
        payments: Arc<dyn PaymentStore>,
        customers: Arc<dyn CustomerStore>,
        profiles: Arc<dyn UserProfileStore>,
        rates: Arc<dyn RateProvider + Send + Sync>,
    ) -> Self {
        Self {
            invoices,
            payments,
            customers,
            profiles,
            rates,
        }
    }

    fn display_currency(&self, user_id: UserId) -> ServiceResult<CurrencyCode> {
        Ok(self
            .profiles
            .get(user_id)?
            .map(|p| p.display_currency())
            .unwrap_or_else(CurrencyCode::usd))
    }

    pub fn dashboard(&self, user_id: UserId, today: NaiveDate) -> ServiceResult<DashboardKpis> {
        let invoices = self.invoices.list_for_user(user_id)?;
        let customer_count = self.customers.list_for_user(user_id)?.len();
        let display = self.display_currency(user_id)?;
        Ok(dashboard_kpis(
            &invoices,
            customer_count,
            &display,
            &self.rates,
            today,
        ))
    }

    pub fn revenue(&self, user_id: UserId, today: NaiveDate) -> ServiceResult<RevenueAnalytics> {
        let payments = self.payments.list_for_user(user_id)?;

        // Join each payment to its invoice for the conversion currency;
        // payments whose invoice vanished are excluded from the series.
        let mut samples = Vec::with_capacity(payments.len());
        for payment in payments {
            if let Some(invoice) = self.invoices.get(payment.invoice_id)? {
                samples.push(PaymentSample {
                    amount_cents: payment.amount_cents,
                    currency: invoice.currency,
                    paid_at: payment.paid_at,
                });
            }
        }

        let display = self.display_currency(user_id)?;
        Ok(revenue_analytics(&samples, &display, &self.rates, today))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    use ledgerly_core::{CustomerId, InvoiceId};
    use ledgerly_customers::CustomerSnapshot;
    use ledgerly_invoicing::{Invoice, InvoiceStatus, Payment};

    use crate::store::{
        InMemoryCustomerStore, InMemoryInvoiceStore, InMemoryPaymentStore, InMemoryRateStore,
        InMemoryUserProfileStore,
    };

    struct Fixture {
        service: AnalyticsService,
        invoices: Arc<InMemoryInvoiceStore>,
        payments: Arc<InMemoryPaymentStore>,
        profiles: Arc<InMemoryUserProfileStore>,
    }

    fn fixture() -> Fixture {
        let invoices = InMemoryInvoiceStore::arc();
        let payments = InMemoryPaymentStore::arc();
        let profiles = InMemoryUserProfileStore::arc();
        let service = AnalyticsService::new(
            invoices.clone(),
            payments.clone(),
            InMemoryCustomerStore::arc(),
            profiles.clone(),
            Arc::new(InMemoryRateStore::with_rates([(
                CurrencyCode::parse("AUD").unwrap(),
                2.0,
            )])),
        );
        Fixture {
            service,
            invoices,
            payments,
            profiles,
        }
    }

    fn seed_invoice(fix: &Fixture, user_id: UserId, total_cents: i64, issue_date: &str) -> InvoiceId {
        let invoice = Invoice {
            id: InvoiceId::new(),
            user_id,
            customer_id: CustomerId::new(),
            customer: CustomerSnapshot {
                name: "Acme".to_string(),
                email: None,
                phone: None,
                billing_address: None,
                shipping_address: None,
                tax_id: None,
                gst_number: None,
            },
            invoice_number: "INV-1".to_string(),
            issue_date: Some(issue_date.to_string()),
            due_date: None,
            currency: CurrencyCode::usd(),
            subtotal_cents: total_cents,
            tax_cents: 0,
            discount_cents: 0,
            total_cents,
            total_cents_usd: Some(total_cents),
            status: InvoiceStatus::Paid,
            note: None,
            source: None,
            created_at: Utc::now(),
        };
        let id = invoice.id;
        fix.invoices.insert(invoice).unwrap();
        id
    }

    fn seed_payment(fix: &Fixture, user_id: UserId, invoice_id: InvoiceId, cents: i64, at: &str) {
        fix.payments
            .insert(
                Payment::new(
                    user_id,
                    invoice_id,
                    cents,
                    at.to_string(),
                    None,
                    None,
                    Utc::now(),
                )
                .unwrap(),
            )
            .unwrap();
    }

    fn today() -> NaiveDate {
        "2025-08-15".parse().unwrap()
    }

    #[test]
    fn dashboard_uses_the_user_display_currency() {
        let fix = fixture();
        let user = UserId::new();
        seed_invoice(&fix, user, 1000, "2025-08-01");

        // Default display currency: USD.
        let usd_view = fix.service.dashboard(user, today()).unwrap();
        assert_eq!(usd_view.totals.total_revenue_cents, 1000);
        assert!(usd_view.currency.is_reference());

        fix.profiles
            .set_default_currency(user, CurrencyCode::parse("AUD").unwrap())
            .unwrap();
        let aud_view = fix.service.dashboard(user, today()).unwrap();
        assert_eq!(aud_view.totals.total_revenue_cents, 2000);
        assert_eq!(aud_view.currency.as_str(), "AUD");
    }

    #[test]
    fn revenue_joins_payments_to_invoice_currency() {
        let fix = fixture();
        let user = UserId::new();
        let invoice_id = seed_invoice(&fix, user, 5000, "2025-07-01");
        seed_payment(&fix, user, invoice_id, 5000, "2025-08-02");

        let analytics = fix.service.revenue(user, today()).unwrap();
        assert_eq!(analytics.month_revenue.value_cents, 5000);
        assert_eq!(analytics.transactions.value_cents, 1);
    }

    #[test]
    fn orphaned_payments_are_excluded() {
        let fix = fixture();
        let user = UserId::new();
        seed_payment(&fix, user, InvoiceId::new(), 9999, "2025-08-02");

        let analytics = fix.service.revenue(user, today()).unwrap();
        assert_eq!(analytics.month_revenue.value_cents, 0);
        assert_eq!(analytics.transactions.value_cents, 0);
    }
}
