use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};

use ledgerly_core::{CurrencyCode, UserId};

use super::{StoreError, StoreResult};

/// Per-user settings the core needs (identity itself is resolved upstream).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub user_id: UserId,
    pub default_currency: Option<CurrencyCode>,
}

impl UserProfile {
    /// The currency amounts are displayed in; USD when unset.
    pub fn display_currency(&self) -> CurrencyCode {
        self.default_currency
            .clone()
            .unwrap_or_else(CurrencyCode::usd)
    }
}

/// User profile storage.
pub trait UserProfileStore: Send + Sync {
    fn get(&self, user_id: UserId) -> StoreResult<Option<UserProfile>>;
    fn set_default_currency(&self, user_id: UserId, currency: CurrencyCode) -> StoreResult<()>;
}

/// In-memory profile store for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryUserProfileStore {
    inner: RwLock<HashMap<UserId, UserProfile>>,
}

impl InMemoryUserProfileStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arc() -> Arc<Self> {
        Arc::new(Self::new())
    }
}

impl UserProfileStore for InMemoryUserProfileStore {
    fn get(&self, user_id: UserId) -> StoreResult<Option<UserProfile>> {
        Ok(self
            .inner
            .read()
            .map_err(|_| StoreError::Storage("profile store lock poisoned".to_string()))?
            .get(&user_id)
            .cloned())
    }

    fn set_default_currency(&self, user_id: UserId, currency: CurrencyCode) -> StoreResult<()> {
        let mut map = self
            .inner
            .write()
            .map_err(|_| StoreError::Storage("profile store lock poisoned".to_string()))?;
        map.entry(user_id)
            .and_modify(|p| p.default_currency = Some(currency.clone()))
            .or_insert(UserProfile {
                user_id,
                default_currency: Some(currency),
            });
        Ok(())
    }
}

impl UserProfileStore for Arc<InMemoryUserProfileStore> {
    fn get(&self, user_id: UserId) -> StoreResult<Option<UserProfile>> {
        (**self).get(user_id)
    }

    fn set_default_currency(&self, user_id: UserId, currency: CurrencyCode) -> StoreResult<()> {
        (**self).set_default_currency(user_id, currency)
    }
}
