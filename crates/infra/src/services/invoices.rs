use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;

use ledgerly_core::{CurrencyCode, CustomerId, DomainError, InvoiceId, UserId};
use ledgerly_invoicing::{
    Invoice, InvoiceLineItem, InvoiceStatus, LineItemInput, Payment, compute_totals,
    paid_total_cents,
};
use ledgerly_rates::{RateProvider, to_reference};

use crate::store::{CustomerStore, InvoiceStore, LineItemStore, Page, PaymentStore};

use super::ServiceResult;

/// Caller-supplied invoice header fields (shared by create and update).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceFields {
    pub invoice_number: String,
    pub issue_date: Option<String>,
    pub due_date: Option<String>,
    pub currency: CurrencyCode,
    pub tax_cents: i64,
    pub discount_cents: i64,
    pub note: Option<String>,
}

/// An invoice joined with its line items (read result).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvoiceWithLines {
    pub invoice: Invoice,
    pub line_items: Vec<InvoiceLineItem>,
}

/// Bounded size of the non-paginated dashboard listing.
const LIST_CAP: usize = 100;
/// Default page size for cursor pagination.
const DEFAULT_PAGE_SIZE: usize = 20;

/// The invoice ledger: creation, edits, status transitions, payments, and
/// owner-filtered reads.
#[derive(Clone)]
pub struct InvoiceService {
    invoices: Arc<dyn InvoiceStore>,
    line_items: Arc<dyn LineItemStore>,
    payments: Arc<dyn PaymentStore>,
    customers: Arc<dyn CustomerStore>,
    rates: Arc<dyn RateProvider + Send + Sync>,
}

impl InvoiceService {
    pub fn new(
        invoices: Arc<dyn InvoiceStore>,
        line_items: Arc<dyn LineItemStore>,
        payments: Arc<dyn PaymentStore>,
        customers: Arc<dyn CustomerStore>,
        rates: Arc<dyn RateProvider + Send + Sync>,
    ) -> Self {
        Self {
            invoices,
            line_items,
            payments,
            customers,
            rates,
        }
    }

    /// Create a draft invoice: snapshot the customer, derive all totals,
    /// cache the reference-currency total, persist header + lines.
    pub fn create(
        &self,
        user_id: UserId,
        customer_id: CustomerId,
        fields: InvoiceFields,
        line_items: Vec<LineItemInput>,
    ) -> ServiceResult<InvoiceId> {
        let customer = match self.customers.get(customer_id)? {
            Some(customer) => customer,
            None => return Err(DomainError::NotFound.into()),
        };
        if customer.user_id != user_id {
            return Err(DomainError::AccessDenied.into());
        }

        let (priced, totals) =
            compute_totals(&line_items, fields.tax_cents, fields.discount_cents)?;
        let total_cents_usd = self.cached_usd_total(&fields.currency, totals.total_cents);

        let invoice = Invoice {
            id: InvoiceId::new(),
            user_id,
            customer_id,
            customer: customer.snapshot(),
            invoice_number: fields.invoice_number,
            issue_date: fields.issue_date,
            due_date: fields.due_date,
            currency: fields.currency,
            subtotal_cents: totals.subtotal_cents,
            tax_cents: totals.tax_cents,
            discount_cents: totals.discount_cents,
            total_cents: totals.total_cents,
            total_cents_usd,
            status: InvoiceStatus::Draft,
            note: fields.note,
            source: None,
            created_at: Utc::now(),
        };
        let id = invoice.id;

        self.invoices.insert(invoice)?;
        self.line_items.replace_for_invoice(id, priced)?;
        info!(invoice_id = %id, "invoice created");
        Ok(id)
    }

    /// Full update: re-snapshot the customer, recompute totals, and replace
    /// the entire line-item set (delete-all-then-reinsert, not a diff).
    pub fn update(
        &self,
        user_id: UserId,
        invoice_id: InvoiceId,
        customer_id: CustomerId,
        fields: InvoiceFields,
        line_items: Vec<LineItemInput>,
    ) -> ServiceResult<()> {
        let mut invoice = self.owned(user_id, invoice_id)?;

        let customer = match self.customers.get(customer_id)? {
            Some(customer) => customer,
            None => return Err(DomainError::NotFound.into()),
        };
        if customer.user_id != user_id {
            return Err(DomainError::AccessDenied.into());
        }

        let (priced, totals) =
            compute_totals(&line_items, fields.tax_cents, fields.discount_cents)?;

        invoice.customer_id = customer_id;
        invoice.customer = customer.snapshot();
        invoice.invoice_number = fields.invoice_number;
        invoice.issue_date = fields.issue_date;
        invoice.due_date = fields.due_date;
        invoice.total_cents_usd = self.cached_usd_total(&fields.currency, totals.total_cents);
        invoice.currency = fields.currency;
        invoice.subtotal_cents = totals.subtotal_cents;
        invoice.tax_cents = totals.tax_cents;
        invoice.discount_cents = totals.discount_cents;
        invoice.total_cents = totals.total_cents;
        invoice.note = fields.note;

        self.invoices.update(&invoice)?;
        self.line_items.replace_for_invoice(invoice_id, priced)?;
        Ok(())
    }

    /// Explicit status transition.
    ///
    /// Moving to `paid` first backfills one synthetic payment for whatever
    /// balance is still open, so the payment ledger and the status can never
    /// disagree after a manual "mark as paid".
    pub fn update_status(
        &self,
        user_id: UserId,
        invoice_id: InvoiceId,
        status: InvoiceStatus,
    ) -> ServiceResult<()> {
        let mut invoice = self.owned(user_id, invoice_id)?;

        if status == InvoiceStatus::Paid {
            let payments = self.payments.list_for_invoice(invoice_id)?;
            let remaining = (invoice.total_cents - paid_total_cents(&payments)).max(0);
            if remaining > 0 {
                let synthetic = Payment::new(
                    invoice.user_id,
                    invoice_id,
                    remaining,
                    Utc::now().to_rfc3339(),
                    None,
                    None,
                    Utc::now(),
                )?;
                self.payments.insert(synthetic)?;
                info!(invoice_id = %invoice_id, remaining, "synthetic payment recorded for manual paid transition");
            }
        }

        invoice.status = status;
        self.invoices.update(&invoice)?;
        Ok(())
    }

    /// Send action: the draft enters the awaiting-payment state.
    pub fn mark_sent(&self, user_id: UserId, invoice_id: InvoiceId) -> ServiceResult<()> {
        self.update_status(user_id, invoice_id, InvoiceStatus::Due)
    }

    /// Record a payment; flips the invoice to `paid` once cumulative
    /// payments reach or exceed its total.
    pub fn record_payment(
        &self,
        user_id: UserId,
        invoice_id: InvoiceId,
        amount_cents: i64,
        paid_at: String,
        method: Option<String>,
        reference: Option<String>,
    ) -> ServiceResult<Payment> {
        let mut invoice = self.owned(user_id, invoice_id)?;

        let payment = Payment::new(
            user_id,
            invoice_id,
            amount_cents,
            paid_at,
            method,
            reference,
            Utc::now(),
        )?;
        self.payments.insert(payment.clone())?;

        let paid_total = paid_total_cents(&self.payments.list_for_invoice(invoice_id)?);
        if paid_total >= invoice.total_cents && invoice.status != InvoiceStatus::Paid {
            invoice.status = InvoiceStatus::Paid;
            self.invoices.update(&invoice)?;
            info!(invoice_id = %invoice_id, paid_total, "invoice fully paid");
        }

        Ok(payment)
    }

    /// Delete an invoice; owned line items go first.
    pub fn delete(&self, user_id: UserId, invoice_id: InvoiceId) -> ServiceResult<()> {
        self.owned(user_id, invoice_id)?;
        self.line_items.delete_for_invoice(invoice_id)?;
        self.invoices.delete(invoice_id)?;
        Ok(())
    }

    pub fn get(&self, user_id: UserId, invoice_id: InvoiceId) -> ServiceResult<InvoiceWithLines> {
        let invoice = self.owned(user_id, invoice_id)?;
        let line_items = self.line_items.list_for_invoice(invoice_id)?;
        Ok(InvoiceWithLines {
            invoice,
            line_items,
        })
    }

    /// Bounded newest-first listing for dashboards, with synonym-aware
    /// status and customer filters.
    pub fn list(
        &self,
        user_id: UserId,
        status: Option<InvoiceStatus>,
        customer_id: Option<CustomerId>,
    ) -> ServiceResult<Vec<Invoice>> {
        let invoices = self.invoices.list_for_user(user_id)?;
        Ok(invoices
            .into_iter()
            .take(LIST_CAP)
            .filter(|inv| Self::matches(inv, status, customer_id))
            .collect())
    }

    /// Cursor-paginated listing. Filters apply to the returned page; the
    /// cursor tracks the underlying scan so pages stay stable.
    pub fn list_paged(
        &self,
        user_id: UserId,
        status: Option<InvoiceStatus>,
        customer_id: Option<CustomerId>,
        cursor: Option<&str>,
        limit: Option<usize>,
    ) -> ServiceResult<Page<Invoice>> {
        let page = self.invoices.page_for_user(
            user_id,
            cursor,
            limit.unwrap_or(DEFAULT_PAGE_SIZE),
        )?;
        Ok(Page {
            items: page
                .items
                .into_iter()
                .filter(|inv| Self::matches(inv, status, customer_id))
                .collect(),
            cursor: page.cursor,
            is_done: page.is_done,
        })
    }

    pub fn payments_for_invoice(
        &self,
        user_id: UserId,
        invoice_id: InvoiceId,
    ) -> ServiceResult<Vec<Payment>> {
        self.owned(user_id, invoice_id)?;
        Ok(self.payments.list_for_invoice(invoice_id)?)
    }

    fn matches(
        invoice: &Invoice,
        status: Option<InvoiceStatus>,
        customer_id: Option<CustomerId>,
    ) -> bool {
        if let Some(filter) = status {
            if !invoice.status.matches_filter(filter) {
                return false;
            }
        }
        if let Some(customer) = customer_id {
            if invoice.customer_id != customer {
                return false;
            }
        }
        true
    }

    fn owned(&self, user_id: UserId, invoice_id: InvoiceId) -> ServiceResult<Invoice> {
        match self.invoices.get(invoice_id)? {
            Some(invoice) if invoice.user_id == user_id => Ok(invoice),
            _ => Err(DomainError::NotFound.into()),
        }
    }

    /// Reference-currency total cached at write time. `None` when the
    /// currency has no usable rate yet (aggregation will re-derive, and
    /// degrade to zero if the rate is still missing).
    fn cached_usd_total(&self, currency: &CurrencyCode, total_cents: i64) -> Option<i64> {
        if currency.is_reference() {
            return Some(total_cents);
        }
        self.rates
            .rate(currency)
            .filter(|r| r.is_finite() && *r > 0.0)
            .map(|_| to_reference(total_cents, currency, &self.rates))
    }
}
