use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use ledgerly_core::{DomainError, InvoiceId, PaymentId, UserId};

/// A recorded payment against one invoice.
///
/// Several payments may apply to the same invoice; the invoice flips to
/// `paid` once the cumulative amount reaches or exceeds its total.
/// `paid_at` is carried as the caller-supplied timestamp string and parsed
/// permissively at aggregation time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    pub id: PaymentId,
    pub user_id: UserId,
    pub invoice_id: InvoiceId,
    pub amount_cents: i64,
    pub paid_at: String,
    pub method: Option<String>,
    pub reference: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Payment {
    pub fn new(
        user_id: UserId,
        invoice_id: InvoiceId,
        amount_cents: i64,
        paid_at: String,
        method: Option<String>,
        reference: Option<String>,
        created_at: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        if amount_cents <= 0 {
            return Err(DomainError::validation("payment amount must be positive"));
        }
        Ok(Self {
            id: PaymentId::new(),
            user_id,
            invoice_id,
            amount_cents,
            paid_at,
            method,
            reference,
            created_at,
        })
    }
}

/// Cumulative paid total across a set of payments.
pub fn paid_total_cents(payments: &[Payment]) -> i64 {
    payments.iter().map(|p| p.amount_cents).sum()
}
