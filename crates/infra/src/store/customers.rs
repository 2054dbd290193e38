use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use ledgerly_core::{CustomerId, UserId};
use ledgerly_customers::Customer;

use super::{StoreError, StoreResult};

/// Customer storage.
pub trait CustomerStore: Send + Sync {
    fn insert(&self, customer: Customer) -> StoreResult<()>;
    fn get(&self, id: CustomerId) -> StoreResult<Option<Customer>>;
    fn update(&self, customer: &Customer) -> StoreResult<()>;
    fn delete(&self, id: CustomerId) -> StoreResult<()>;
    /// Owner-filtered listing in creation order.
    fn list_for_user(&self, user_id: UserId) -> StoreResult<Vec<Customer>>;
    /// Exact name lookup within one user's customers.
    fn find_by_name(&self, user_id: UserId, name: &str) -> StoreResult<Option<Customer>>;
}

/// In-memory customer store for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryCustomerStore {
    inner: RwLock<HashMap<CustomerId, Customer>>,
}

impl InMemoryCustomerStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arc() -> Arc<Self> {
        Arc::new(Self::new())
    }

    fn read(&self) -> StoreResult<std::sync::RwLockReadGuard<'_, HashMap<CustomerId, Customer>>> {
        self.inner
            .read()
            .map_err(|_| StoreError::Storage("customer store lock poisoned".to_string()))
    }

    fn write(&self) -> StoreResult<std::sync::RwLockWriteGuard<'_, HashMap<CustomerId, Customer>>> {
        self.inner
            .write()
            .map_err(|_| StoreError::Storage("customer store lock poisoned".to_string()))
    }
}

impl CustomerStore for InMemoryCustomerStore {
    fn insert(&self, customer: Customer) -> StoreResult<()> {
        self.write()?.insert(customer.id, customer);
        Ok(())
    }

    fn get(&self, id: CustomerId) -> StoreResult<Option<Customer>> {
        Ok(self.read()?.get(&id).cloned())
    }

    fn update(&self, customer: &Customer) -> StoreResult<()> {
        let mut map = self.write()?;
        if !map.contains_key(&customer.id) {
            return Err(StoreError::NotFound);
        }
        map.insert(customer.id, customer.clone());
        Ok(())
    }

    fn delete(&self, id: CustomerId) -> StoreResult<()> {
        self.write()?
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::NotFound)
    }

    fn list_for_user(&self, user_id: UserId) -> StoreResult<Vec<Customer>> {
        let mut customers: Vec<_> = self
            .read()?
            .values()
            .filter(|c| c.user_id == user_id)
            .cloned()
            .collect();
        customers.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.id.as_uuid().cmp(b.id.as_uuid()))
        });
        Ok(customers)
    }

    fn find_by_name(&self, user_id: UserId, name: &str) -> StoreResult<Option<Customer>> {
        Ok(self
            .read()?
            .values()
            .find(|c| c.user_id == user_id && c.name == name)
            .cloned())
    }
}

impl CustomerStore for Arc<InMemoryCustomerStore> {
    fn insert(&self, customer: Customer) -> StoreResult<()> {
        (**self).insert(customer)
    }

    fn get(&self, id: CustomerId) -> StoreResult<Option<Customer>> {
        (**self).get(id)
    }

    fn update(&self, customer: &Customer) -> StoreResult<()> {
        (**self).update(customer)
    }

    fn delete(&self, id: CustomerId) -> StoreResult<()> {
        (**self).delete(id)
    }

    fn list_for_user(&self, user_id: UserId) -> StoreResult<Vec<Customer>> {
        (**self).list_for_user(user_id)
    }

    fn find_by_name(&self, user_id: UserId, name: &str) -> StoreResult<Option<Customer>> {
        (**self).find_by_name(user_id, name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use ledgerly_customers::CustomerFields;

    fn customer(user_id: UserId, name: &str) -> Customer {
        Customer::new(
            user_id,
            CustomerFields {
                name: name.to_string(),
                ..CustomerFields::default()
            },
            Utc::now(),
        )
        .unwrap()
    }

    #[test]
    fn insert_get_update_delete_roundtrip() {
        let store = InMemoryCustomerStore::new();
        let user = UserId::new();
        let mut c = customer(user, "Acme");
        let id = c.id;

        store.insert(c.clone()).unwrap();
        assert_eq!(store.get(id).unwrap().unwrap().name, "Acme");

        c.name = "Acme Pty".to_string();
        store.update(&c).unwrap();
        assert_eq!(store.get(id).unwrap().unwrap().name, "Acme Pty");

        store.delete(id).unwrap();
        assert!(store.get(id).unwrap().is_none());
        assert!(matches!(store.delete(id), Err(StoreError::NotFound)));
    }

    #[test]
    fn listing_is_owner_filtered_in_creation_order() {
        let store = InMemoryCustomerStore::new();
        let alice = UserId::new();
        let bob = UserId::new();

        let first = customer(alice, "First");
        let second = customer(alice, "Second");
        store.insert(first).unwrap();
        store.insert(second).unwrap();
        store.insert(customer(bob, "Intruder")).unwrap();

        let names: Vec<_> = store
            .list_for_user(alice)
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["First", "Second"]);
    }

    #[test]
    fn find_by_name_is_exact_and_owner_scoped() {
        let store = InMemoryCustomerStore::new();
        let alice = UserId::new();
        let bob = UserId::new();
        store.insert(customer(alice, "Acme")).unwrap();

        assert!(store.find_by_name(alice, "Acme").unwrap().is_some());
        assert!(store.find_by_name(alice, "acme").unwrap().is_none());
        assert!(store.find_by_name(bob, "Acme").unwrap().is_none());
    }
}
