use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use ledgerly_core::{CustomerId, DomainError, UserId};
use ledgerly_customers::{Customer, CustomerFields, CustomerUpdate};

use crate::store::CustomerStore;

use super::ServiceResult;

/// Customer CRUD with ownership checks.
///
/// Reads conflate "does not exist" and "owned by someone else" into
/// `NotFound` so other users' data never leaks.
#[derive(Clone)]
pub struct CustomerService {
    customers: Arc<dyn CustomerStore>,
}

impl CustomerService {
    pub fn new(customers: Arc<dyn CustomerStore>) -> Self {
        Self { customers }
    }

    pub fn create(&self, user_id: UserId, fields: CustomerFields) -> ServiceResult<Customer> {
        let customer = Customer::new(user_id, fields, Utc::now())?;
        self.customers.insert(customer.clone())?;
        info!(customer_id = %customer.id, "customer created");
        Ok(customer)
    }

    pub fn get(&self, user_id: UserId, id: CustomerId) -> ServiceResult<Customer> {
        self.owned(user_id, id)
    }

    /// Exact-name lookup (used by the assistant's find-or-create flow).
    pub fn get_by_name(&self, user_id: UserId, name: &str) -> ServiceResult<Option<Customer>> {
        Ok(self.customers.find_by_name(user_id, name)?)
    }

    /// List the user's customers, optionally narrowed by a case-insensitive
    /// name search.
    pub fn list(&self, user_id: UserId, search: Option<&str>) -> ServiceResult<Vec<Customer>> {
        let customers = self.customers.list_for_user(user_id)?;
        match search {
            None => Ok(customers),
            Some(term) => {
                let needle = term.to_lowercase();
                Ok(customers
                    .into_iter()
                    .filter(|c| c.name.to_lowercase().contains(&needle))
                    .collect())
            }
        }
    }

    pub fn update(
        &self,
        user_id: UserId,
        id: CustomerId,
        update: CustomerUpdate,
    ) -> ServiceResult<Customer> {
        let mut customer = self.owned(user_id, id)?;
        customer.apply_update(update)?;
        self.customers.update(&customer)?;
        Ok(customer)
    }

    /// Delete the customer record. Historical invoices keep their snapshot
    /// of these fields; nothing cascades.
    pub fn delete(&self, user_id: UserId, id: CustomerId) -> ServiceResult<()> {
        self.owned(user_id, id)?;
        self.customers.delete(id)?;
        info!(customer_id = %id, "customer deleted");
        Ok(())
    }

    fn owned(&self, user_id: UserId, id: CustomerId) -> ServiceResult<Customer> {
        match self.customers.get(id)? {
            Some(customer) if customer.user_id == user_id => Ok(customer),
            _ => Err(DomainError::NotFound.into()),
        }
    }
}
