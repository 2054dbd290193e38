use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use ledgerly_core::{InvoiceId, PaymentId, UserId};
use ledgerly_invoicing::Payment;

use super::{StoreError, StoreResult};

/// Payment storage.
pub trait PaymentStore: Send + Sync {
    fn insert(&self, payment: Payment) -> StoreResult<()>;
    fn list_for_invoice(&self, invoice_id: InvoiceId) -> StoreResult<Vec<Payment>>;
    fn list_for_user(&self, user_id: UserId) -> StoreResult<Vec<Payment>>;
}

/// In-memory payment store for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryPaymentStore {
    inner: RwLock<HashMap<PaymentId, Payment>>,
}

impl InMemoryPaymentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arc() -> Arc<Self> {
        Arc::new(Self::new())
    }

    fn sorted(&self, filter: impl Fn(&Payment) -> bool) -> StoreResult<Vec<Payment>> {
        let map = self
            .inner
            .read()
            .map_err(|_| StoreError::Storage("payment store lock poisoned".to_string()))?;
        let mut payments: Vec<_> = map.values().filter(|p| filter(p)).cloned().collect();
        payments.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.id.as_uuid().cmp(b.id.as_uuid()))
        });
        Ok(payments)
    }
}

impl PaymentStore for InMemoryPaymentStore {
    fn insert(&self, payment: Payment) -> StoreResult<()> {
        self.inner
            .write()
            .map_err(|_| StoreError::Storage("payment store lock poisoned".to_string()))?
            .insert(payment.id, payment);
        Ok(())
    }

    fn list_for_invoice(&self, invoice_id: InvoiceId) -> StoreResult<Vec<Payment>> {
        self.sorted(|p| p.invoice_id == invoice_id)
    }

    fn list_for_user(&self, user_id: UserId) -> StoreResult<Vec<Payment>> {
        self.sorted(|p| p.user_id == user_id)
    }
}

impl PaymentStore for Arc<InMemoryPaymentStore> {
    fn insert(&self, payment: Payment) -> StoreResult<()> {
        (**self).insert(payment)
    }

    fn list_for_invoice(&self, invoice_id: InvoiceId) -> StoreResult<Vec<Payment>> {
        (**self).list_for_invoice(invoice_id)
    }

    fn list_for_user(&self, user_id: UserId) -> StoreResult<Vec<Payment>> {
        (**self).list_for_user(user_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn payment(user_id: UserId, invoice_id: InvoiceId, amount_cents: i64) -> Payment {
        Payment::new(
            user_id,
            invoice_id,
            amount_cents,
            Utc::now().to_rfc3339(),
            None,
            None,
            Utc::now(),
        )
        .unwrap()
    }

    #[test]
    fn listing_filters_by_invoice_and_user() {
        let store = InMemoryPaymentStore::new();
        let user = UserId::new();
        let other_user = UserId::new();
        let invoice = InvoiceId::new();

        store.insert(payment(user, invoice, 3000)).unwrap();
        store.insert(payment(user, invoice, 2000)).unwrap();
        store.insert(payment(user, InvoiceId::new(), 111)).unwrap();
        store
            .insert(payment(other_user, InvoiceId::new(), 999))
            .unwrap();

        let for_invoice = store.list_for_invoice(invoice).unwrap();
        assert_eq!(for_invoice.len(), 2);
        assert_eq!(
            for_invoice.iter().map(|p| p.amount_cents).sum::<i64>(),
            5000
        );

        assert_eq!(store.list_for_user(user).unwrap().len(), 3);
        assert_eq!(store.list_for_user(other_user).unwrap().len(), 1);
    }
}
