use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use ledgerly_core::CurrencyCode;
use ledgerly_rates::RateProvider;

use super::{StoreError, StoreResult};

/// One row of the rate table: units of `currency` per 1 USD.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateEntry {
    pub currency: CurrencyCode,
    pub rate: f64,
    pub updated_at: DateTime<Utc>,
}

/// Rate table storage. Refreshed wholesale by the daily fetch job; readers
/// always see the latest committed table.
pub trait RateStore: Send + Sync {
    /// Replace the whole table with a freshly fetched set of entries.
    fn replace_all(&self, entries: Vec<RateEntry>) -> StoreResult<()>;
    fn get(&self, currency: &CurrencyCode) -> StoreResult<Option<RateEntry>>;
    fn list(&self) -> StoreResult<Vec<RateEntry>>;
}

/// In-memory rate table for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryRateStore {
    inner: RwLock<HashMap<CurrencyCode, RateEntry>>,
}

impl InMemoryRateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arc() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Convenience seeding for tests.
    pub fn with_rates(rates: impl IntoIterator<Item = (CurrencyCode, f64)>) -> Self {
        let now = Utc::now();
        let map = rates
            .into_iter()
            .map(|(currency, rate)| {
                (
                    currency.clone(),
                    RateEntry {
                        currency,
                        rate,
                        updated_at: now,
                    },
                )
            })
            .collect();
        Self {
            inner: RwLock::new(map),
        }
    }
}

impl RateStore for InMemoryRateStore {
    fn replace_all(&self, entries: Vec<RateEntry>) -> StoreResult<()> {
        let mut map = self
            .inner
            .write()
            .map_err(|_| StoreError::Storage("rate store lock poisoned".to_string()))?;
        map.clear();
        for entry in entries {
            map.insert(entry.currency.clone(), entry);
        }
        Ok(())
    }

    fn get(&self, currency: &CurrencyCode) -> StoreResult<Option<RateEntry>> {
        Ok(self
            .inner
            .read()
            .map_err(|_| StoreError::Storage("rate store lock poisoned".to_string()))?
            .get(currency)
            .cloned())
    }

    fn list(&self) -> StoreResult<Vec<RateEntry>> {
        let map = self
            .inner
            .read()
            .map_err(|_| StoreError::Storage("rate store lock poisoned".to_string()))?;
        let mut entries: Vec<_> = map.values().cloned().collect();
        entries.sort_by(|a, b| a.currency.as_str().cmp(b.currency.as_str()));
        Ok(entries)
    }
}

impl RateStore for Arc<InMemoryRateStore> {
    fn replace_all(&self, entries: Vec<RateEntry>) -> StoreResult<()> {
        (**self).replace_all(entries)
    }

    fn get(&self, currency: &CurrencyCode) -> StoreResult<Option<RateEntry>> {
        (**self).get(currency)
    }

    fn list(&self) -> StoreResult<Vec<RateEntry>> {
        (**self).list()
    }
}

/// The rate table doubles as the conversion layer's [`RateProvider`]; lock
/// failures surface as "no rate", which degrades the amount to zero rather
/// than failing the read path.
impl RateProvider for InMemoryRateStore {
    fn rate(&self, currency: &CurrencyCode) -> Option<f64> {
        self.inner.read().ok()?.get(currency).map(|e| e.rate)
    }
}
