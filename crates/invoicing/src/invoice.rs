use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use ledgerly_core::{
    CurrencyCode, CustomerId, DomainError, InvoiceId, ScheduleId, UserId, line_amount_cents,
    money,
};
use ledgerly_customers::CustomerSnapshot;

use crate::status::InvoiceStatus;

/// Caller-supplied line item: no derived amount yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItemInput {
    pub description: String,
    pub quantity: f64,
    pub unit_price_cents: i64,
}

/// Stored line item, owned by exactly one invoice.
///
/// `amount_cents` is derived from quantity × unit price and stored
/// redundantly so aggregation never re-multiplies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceLineItem {
    pub description: String,
    pub quantity: f64,
    pub unit_price_cents: i64,
    pub amount_cents: i64,
}

/// Computed invoice totals, all in minor units of the invoice currency.
///
/// Invariant: `total = subtotal + tax − discount` and
/// `subtotal = Σ amount_cents`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceTotals {
    pub subtotal_cents: i64,
    pub tax_cents: i64,
    pub discount_cents: i64,
    pub total_cents: i64,
}

/// Validate and price caller-supplied line items.
pub fn price_line_items(items: &[LineItemInput]) -> Result<Vec<InvoiceLineItem>, DomainError> {
    let mut priced = Vec::with_capacity(items.len());
    for item in items {
        money::validate_quantity(item.quantity)?;
        money::validate_unit_price(item.unit_price_cents)?;
        priced.push(InvoiceLineItem {
            description: item.description.clone(),
            quantity: item.quantity,
            unit_price_cents: item.unit_price_cents,
            amount_cents: line_amount_cents(item.quantity, item.unit_price_cents),
        });
    }
    Ok(priced)
}

/// Price line items and compute totals in one step.
pub fn compute_totals(
    items: &[LineItemInput],
    tax_cents: i64,
    discount_cents: i64,
) -> Result<(Vec<InvoiceLineItem>, InvoiceTotals), DomainError> {
    if tax_cents < 0 || discount_cents < 0 {
        return Err(DomainError::validation(
            "tax and discount must not be negative",
        ));
    }

    let priced = price_line_items(items)?;
    let subtotal_cents = money::checked_total(priced.iter().map(|i| i.amount_cents))?;
    let total_cents = subtotal_cents
        .checked_add(tax_cents)
        .and_then(|t| t.checked_sub(discount_cents))
        .ok_or_else(|| DomainError::validation("invoice total overflow"))?;

    Ok((
        priced,
        InvoiceTotals {
            subtotal_cents,
            tax_cents,
            discount_cents,
            total_cents,
        },
    ))
}

/// Idempotency key for invoices materialized from a recurring schedule:
/// at most one invoice may exist per `(schedule, occurrence date)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InvoiceSource {
    pub schedule_id: ScheduleId,
    pub occurrence_date: NaiveDate,
}

/// Invoice entity.
///
/// Customer display fields are a snapshot captured at create/update time;
/// dates are carried as the caller-supplied strings and parsed permissively
/// at aggregation time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    pub id: InvoiceId,
    pub user_id: UserId,
    pub customer_id: CustomerId,
    pub customer: CustomerSnapshot,
    pub invoice_number: String,
    pub issue_date: Option<String>,
    pub due_date: Option<String>,
    pub currency: CurrencyCode,
    pub subtotal_cents: i64,
    pub tax_cents: i64,
    pub discount_cents: i64,
    pub total_cents: i64,
    /// Reference-currency total cached at write time (historical rate).
    pub total_cents_usd: Option<i64>,
    pub status: InvoiceStatus,
    pub note: Option<String>,
    pub source: Option<InvoiceSource>,
    pub created_at: DateTime<Utc>,
}
