use std::collections::HashMap;
use std::str::FromStr;
use std::sync::{Arc, RwLock};

use chrono::NaiveDate;
use serde::Serialize;

use ledgerly_core::{InvoiceId, ScheduleId, UserId};
use ledgerly_invoicing::{Invoice, InvoiceLineItem};

use super::{StoreError, StoreResult};

/// One page of a cursor-paginated listing.
///
/// The cursor is opaque to callers: pass it back verbatim to continue, stop
/// when `is_done` is set.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub cursor: Option<String>,
    pub is_done: bool,
}

/// Invoice header storage.
pub trait InvoiceStore: Send + Sync {
    fn insert(&self, invoice: Invoice) -> StoreResult<()>;
    fn get(&self, id: InvoiceId) -> StoreResult<Option<Invoice>>;
    fn update(&self, invoice: &Invoice) -> StoreResult<()>;
    fn delete(&self, id: InvoiceId) -> StoreResult<()>;
    /// Owner-filtered listing, newest first.
    fn list_for_user(&self, user_id: UserId) -> StoreResult<Vec<Invoice>>;
    /// Cursor-paginated owner-filtered listing, newest first.
    fn page_for_user(
        &self,
        user_id: UserId,
        cursor: Option<&str>,
        limit: usize,
    ) -> StoreResult<Page<Invoice>>;
    /// Dedup-key lookup for materialized invoices.
    fn find_by_source(
        &self,
        schedule_id: ScheduleId,
        occurrence_date: NaiveDate,
    ) -> StoreResult<Option<Invoice>>;
}

/// Line-item storage, keyed by owning invoice.
///
/// Writes are whole-set replacements (delete-all-then-reinsert), which is
/// exactly the update semantics the ledger exposes.
pub trait LineItemStore: Send + Sync {
    fn replace_for_invoice(
        &self,
        invoice_id: InvoiceId,
        items: Vec<InvoiceLineItem>,
    ) -> StoreResult<()>;
    fn list_for_invoice(&self, invoice_id: InvoiceId) -> StoreResult<Vec<InvoiceLineItem>>;
    fn delete_for_invoice(&self, invoice_id: InvoiceId) -> StoreResult<()>;
}

/// In-memory invoice store for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryInvoiceStore {
    inner: RwLock<HashMap<InvoiceId, Invoice>>,
}

impl InMemoryInvoiceStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arc() -> Arc<Self> {
        Arc::new(Self::new())
    }

    fn read(&self) -> StoreResult<std::sync::RwLockReadGuard<'_, HashMap<InvoiceId, Invoice>>> {
        self.inner
            .read()
            .map_err(|_| StoreError::Storage("invoice store lock poisoned".to_string()))
    }

    fn write(&self) -> StoreResult<std::sync::RwLockWriteGuard<'_, HashMap<InvoiceId, Invoice>>> {
        self.inner
            .write()
            .map_err(|_| StoreError::Storage("invoice store lock poisoned".to_string()))
    }

    fn sorted_for_user(&self, user_id: UserId) -> StoreResult<Vec<Invoice>> {
        let mut invoices: Vec<_> = self
            .read()?
            .values()
            .filter(|i| i.user_id == user_id)
            .cloned()
            .collect();
        invoices.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.as_uuid().cmp(a.id.as_uuid()))
        });
        Ok(invoices)
    }
}

impl InvoiceStore for InMemoryInvoiceStore {
    fn insert(&self, invoice: Invoice) -> StoreResult<()> {
        self.write()?.insert(invoice.id, invoice);
        Ok(())
    }

    fn get(&self, id: InvoiceId) -> StoreResult<Option<Invoice>> {
        Ok(self.read()?.get(&id).cloned())
    }

    fn update(&self, invoice: &Invoice) -> StoreResult<()> {
        let mut map = self.write()?;
        if !map.contains_key(&invoice.id) {
            return Err(StoreError::NotFound);
        }
        map.insert(invoice.id, invoice.clone());
        Ok(())
    }

    fn delete(&self, id: InvoiceId) -> StoreResult<()> {
        self.write()?
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::NotFound)
    }

    fn list_for_user(&self, user_id: UserId) -> StoreResult<Vec<Invoice>> {
        self.sorted_for_user(user_id)
    }

    fn page_for_user(
        &self,
        user_id: UserId,
        cursor: Option<&str>,
        limit: usize,
    ) -> StoreResult<Page<Invoice>> {
        let all = self.sorted_for_user(user_id)?;

        let start = match cursor {
            None => 0,
            Some(raw) => {
                let after = InvoiceId::from_str(raw).map_err(|_| StoreError::InvalidCursor)?;
                // Resume strictly after the cursor id in descending order.
                match all.iter().position(|i| i.id == after) {
                    Some(pos) => pos + 1,
                    None => all
                        .iter()
                        .position(|i| i.id.as_uuid() < after.as_uuid())
                        .unwrap_or(all.len()),
                }
            }
        };

        let items: Vec<Invoice> = all.iter().skip(start).take(limit).cloned().collect();
        let is_done = start + items.len() >= all.len();
        let cursor = if is_done {
            None
        } else {
            items.last().map(|i| i.id.to_string())
        };

        Ok(Page {
            items,
            cursor,
            is_done,
        })
    }

    fn find_by_source(
        &self,
        schedule_id: ScheduleId,
        occurrence_date: NaiveDate,
    ) -> StoreResult<Option<Invoice>> {
        Ok(self
            .read()?
            .values()
            .find(|i| {
                i.source
                    .as_ref()
                    .is_some_and(|s| s.schedule_id == schedule_id && s.occurrence_date == occurrence_date)
            })
            .cloned())
    }
}

impl InvoiceStore for Arc<InMemoryInvoiceStore> {
    fn insert(&self, invoice: Invoice) -> StoreResult<()> {
        (**self).insert(invoice)
    }

    fn get(&self, id: InvoiceId) -> StoreResult<Option<Invoice>> {
        (**self).get(id)
    }

    fn update(&self, invoice: &Invoice) -> StoreResult<()> {
        (**self).update(invoice)
    }

    fn delete(&self, id: InvoiceId) -> StoreResult<()> {
        (**self).delete(id)
    }

    fn list_for_user(&self, user_id: UserId) -> StoreResult<Vec<Invoice>> {
        (**self).list_for_user(user_id)
    }

    fn page_for_user(
        &self,
        user_id: UserId,
        cursor: Option<&str>,
        limit: usize,
    ) -> StoreResult<Page<Invoice>> {
        (**self).page_for_user(user_id, cursor, limit)
    }

    fn find_by_source(
        &self,
        schedule_id: ScheduleId,
        occurrence_date: NaiveDate,
    ) -> StoreResult<Option<Invoice>> {
        (**self).find_by_source(schedule_id, occurrence_date)
    }
}

/// In-memory line-item store for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryLineItemStore {
    inner: RwLock<HashMap<InvoiceId, Vec<InvoiceLineItem>>>,
}

impl InMemoryLineItemStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arc() -> Arc<Self> {
        Arc::new(Self::new())
    }
}

impl LineItemStore for InMemoryLineItemStore {
    fn replace_for_invoice(
        &self,
        invoice_id: InvoiceId,
        items: Vec<InvoiceLineItem>,
    ) -> StoreResult<()> {
        self.inner
            .write()
            .map_err(|_| StoreError::Storage("line item store lock poisoned".to_string()))?
            .insert(invoice_id, items);
        Ok(())
    }

    fn list_for_invoice(&self, invoice_id: InvoiceId) -> StoreResult<Vec<InvoiceLineItem>> {
        Ok(self
            .inner
            .read()
            .map_err(|_| StoreError::Storage("line item store lock poisoned".to_string()))?
            .get(&invoice_id)
            .cloned()
            .unwrap_or_default())
    }

    fn delete_for_invoice(&self, invoice_id: InvoiceId) -> StoreResult<()> {
        self.inner
            .write()
            .map_err(|_| StoreError::Storage("line item store lock poisoned".to_string()))?
            .remove(&invoice_id);
        Ok(())
    }
}

impl LineItemStore for Arc<InMemoryLineItemStore> {
    fn replace_for_invoice(
        &self,
        invoice_id: InvoiceId,
        items: Vec<InvoiceLineItem>,
    ) -> StoreResult<()> {
        (**self).replace_for_invoice(invoice_id, items)
    }

    fn list_for_invoice(&self, invoice_id: InvoiceId) -> StoreResult<Vec<InvoiceLineItem>> {
        (**self).list_for_invoice(invoice_id)
    }

    fn delete_for_invoice(&self, invoice_id: InvoiceId) -> StoreResult<()> {
        (**self).delete_for_invoice(invoice_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use ledgerly_core::{CurrencyCode, CustomerId};
    use ledgerly_customers::CustomerSnapshot;
    use ledgerly_invoicing::{InvoiceSource, InvoiceStatus};

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

    fn invoice(user_id: UserId, number: &str) -> Invoice {
        Invoice {
            id: InvoiceId::new(),
            user_id,
            customer_id: CustomerId::new(),
            customer: snapshot(),
            invoice_number: number.to_string(),
            issue_date: None,
            due_date: None,
            currency: CurrencyCode::usd(),
            subtotal_cents: 1000,
            tax_cents: 0,
            discount_cents: 0,
            total_cents: 1000,
            total_cents_usd: Some(1000),
            status: InvoiceStatus::Draft,
            note: None,
            source: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn list_is_newest_first() {
        let store = InMemoryInvoiceStore::new();
        let user = UserId::new();
        for n in ["INV-1", "INV-2", "INV-3"] {
            store.insert(invoice(user, n)).unwrap();
        }

        let numbers: Vec<_> = store
            .list_for_user(user)
            .unwrap()
            .into_iter()
            .map(|i| i.invoice_number)
            .collect();
        assert_eq!(numbers, vec!["INV-3", "INV-2", "INV-1"]);
    }

    #[test]
    fn pagination_walks_the_full_set_exactly_once() {
        let store = InMemoryInvoiceStore::new();
        let user = UserId::new();
        for n in 0..7 {
            store.insert(invoice(user, &format!("INV-{n}"))).unwrap();
        }

        let mut seen = Vec::new();
        let mut cursor: Option<String> = None;
        loop {
            let page = store.page_for_user(user, cursor.as_deref(), 3).unwrap();
            assert!(page.items.len() <= 3);
            seen.extend(page.items.iter().map(|i| i.invoice_number.clone()));
            if page.is_done {
                assert!(page.cursor.is_none());
                break;
            }
            cursor = page.cursor;
            assert!(cursor.is_some());
        }

        assert_eq!(
            seen,
            (0..7).rev().map(|n| format!("INV-{n}")).collect::<Vec<_>>()
        );
    }

    #[test]
    fn pagination_rejects_garbage_cursors() {
        let store = InMemoryInvoiceStore::new();
        let user = UserId::new();
        store.insert(invoice(user, "INV-1")).unwrap();

        assert!(matches!(
            store.page_for_user(user, Some("not-a-cursor"), 10),
            Err(StoreError::InvalidCursor)
        ));
    }

    #[test]
    fn exact_limit_final_page_reports_done() {
        let store = InMemoryInvoiceStore::new();
        let user = UserId::new();
        for n in 0..4 {
            store.insert(invoice(user, &format!("INV-{n}"))).unwrap();
        }

        let first = store.page_for_user(user, None, 4).unwrap();
        assert_eq!(first.items.len(), 4);
        assert!(first.is_done);
        assert!(first.cursor.is_none());
    }

    #[test]
    fn find_by_source_matches_the_dedup_key() {
        let store = InMemoryInvoiceStore::new();
        let user = UserId::new();
        let schedule_id = ScheduleId::new();
        let date: NaiveDate = "2025-08-01".parse().unwrap();

        let mut materialized = invoice(user, "INV-REC");
        materialized.source = Some(InvoiceSource {
            schedule_id,
            occurrence_date: date,
        });
        store.insert(materialized).unwrap();
        store.insert(invoice(user, "INV-MANUAL")).unwrap();

        assert!(store.find_by_source(schedule_id, date).unwrap().is_some());
        assert!(
            store
                .find_by_source(schedule_id, "2025-09-01".parse().unwrap())
                .unwrap()
                .is_none()
        );
        assert!(
            store
                .find_by_source(ScheduleId::new(), date)
                .unwrap()
                .is_none()
        );
    }

    #[test]
    fn line_items_are_replaced_wholesale() {
        let store = InMemoryLineItemStore::new();
        let invoice_id = InvoiceId::new();

        let item = |desc: &str| InvoiceLineItem {
            description: desc.to_string(),
            quantity: 1.0,
            unit_price_cents: 100,
            amount_cents: 100,
        };

        store
            .replace_for_invoice(invoice_id, vec![item("old-a"), item("old-b")])
            .unwrap();
        store
            .replace_for_invoice(invoice_id, vec![item("new")])
            .unwrap();

        let items = store.list_for_invoice(invoice_id).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].description, "new");

        store.delete_for_invoice(invoice_id).unwrap();
        assert!(store.list_for_invoice(invoice_id).unwrap().is_empty());
    }
}
