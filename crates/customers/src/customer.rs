use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use ledgerly_core::{CurrencyCode, CustomerId, DomainError, UserId};

/// User-editable customer fields (shared by create and full update).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct CustomerFields {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub billing_address: Option<String>,
    pub shipping_address: Option<String>,
    pub tax_id: Option<String>,
    pub gst_number: Option<String>,
    pub payment_terms_days: Option<u32>,
    pub currency: Option<CurrencyCode>,
}

/// Partial update: only supplied fields change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct CustomerUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub billing_address: Option<String>,
    pub shipping_address: Option<String>,
    pub tax_id: Option<String>,
    pub gst_number: Option<String>,
    pub payment_terms_days: Option<u32>,
    pub currency: Option<CurrencyCode>,
}

/// Customer entity.
///
/// Invoices never hold a live reference to these fields — they embed a
/// [`CustomerSnapshot`] taken at write time, so deleting a customer leaves
/// historical invoices intact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub id: CustomerId,
    pub user_id: UserId,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub billing_address: Option<String>,
    pub shipping_address: Option<String>,
    pub tax_id: Option<String>,
    pub gst_number: Option<String>,
    pub payment_terms_days: Option<u32>,
    pub currency: Option<CurrencyCode>,
    pub created_at: DateTime<Utc>,
}

impl Customer {
    /// Build a new customer from validated fields.
    pub fn new(
        user_id: UserId,
        fields: CustomerFields,
        created_at: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        if fields.name.trim().is_empty() {
            return Err(DomainError::validation("name cannot be empty"));
        }

        Ok(Self {
            id: CustomerId::new(),
            user_id,
            name: fields.name,
            email: fields.email,
            phone: fields.phone,
            billing_address: fields.billing_address,
            shipping_address: fields.shipping_address,
            tax_id: fields.tax_id,
            gst_number: fields.gst_number,
            payment_terms_days: fields.payment_terms_days,
            currency: fields.currency,
            created_at,
        })
    }

    /// Apply a partial update (only supplied fields change).
    pub fn apply_update(&mut self, update: CustomerUpdate) -> Result<(), DomainError> {
        if let Some(name) = update.name {
            if name.trim().is_empty() {
                return Err(DomainError::validation("name cannot be empty"));
            }
            self.name = name;
        }
        if let Some(email) = update.email {
            self.email = Some(email);
        }
        if let Some(phone) = update.phone {
            self.phone = Some(phone);
        }
        if let Some(billing) = update.billing_address {
            self.billing_address = Some(billing);
        }
        if let Some(shipping) = update.shipping_address {
            self.shipping_address = Some(shipping);
        }
        if let Some(tax_id) = update.tax_id {
            self.tax_id = Some(tax_id);
        }
        if let Some(gst) = update.gst_number {
            self.gst_number = Some(gst);
        }
        if let Some(days) = update.payment_terms_days {
            self.payment_terms_days = Some(days);
        }
        if let Some(currency) = update.currency {
            self.currency = Some(currency);
        }
        Ok(())
    }

    /// Capture the display fields an invoice embeds at write time.
    pub fn snapshot(&self) -> CustomerSnapshot {
        CustomerSnapshot {
            name: self.name.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
            billing_address: self.billing_address.clone(),
            shipping_address: self.shipping_address.clone(),
            tax_id: self.tax_id.clone(),
            gst_number: self.gst_number.clone(),
        }
    }
}

/// Immutable value object: customer display fields as of invoice write time.
///
/// Never re-fetched or overwritten implicitly; a later customer edit or
/// deletion does not touch invoices already carrying a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerSnapshot {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub billing_address: Option<String>,
    pub shipping_address: Option<String>,
    pub tax_id: Option<String>,
    pub gst_number: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_user_id() -> UserId {
        UserId::new()
    }

    fn test_time() -> DateTime<Utc> {
        Utc::now()
    }

    fn base_fields(name: &str) -> CustomerFields {
        CustomerFields {
            name: name.to_string(),
            email: Some("billing@acme.test".to_string()),
            ..CustomerFields::default()
        }
    }

    #[test]
    fn new_customer_keeps_fields() {
        let customer = Customer::new(test_user_id(), base_fields("Acme Pty"), test_time()).unwrap();
        assert_eq!(customer.name, "Acme Pty");
        assert_eq!(customer.email.as_deref(), Some("billing@acme.test"));
        assert!(customer.tax_id.is_none());
    }

    #[test]
    fn new_customer_rejects_empty_name() {
        let err = Customer::new(test_user_id(), base_fields("   "), test_time()).unwrap_err();
        match err {
            DomainError::Validation(_) => {}
            other => panic!("expected Validation error, got {other:?}"),
        }
    }

    #[test]
    fn apply_update_changes_only_supplied_fields() {
        let mut customer =
            Customer::new(test_user_id(), base_fields("Old Name"), test_time()).unwrap();
        customer
            .apply_update(CustomerUpdate {
                name: Some("New Name".to_string()),
                phone: Some("+61 400 000 000".to_string()),
                ..CustomerUpdate::default()
            })
            .unwrap();

        assert_eq!(customer.name, "New Name");
        assert_eq!(customer.phone.as_deref(), Some("+61 400 000 000"));
        // Untouched field survives.
        assert_eq!(customer.email.as_deref(), Some("billing@acme.test"));
    }

    #[test]
    fn apply_update_rejects_empty_name() {
        let mut customer =
            Customer::new(test_user_id(), base_fields("Keep Me"), test_time()).unwrap();
        let err = customer
            .apply_update(CustomerUpdate {
                name: Some("".to_string()),
                ..CustomerUpdate::default()
            })
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
        assert_eq!(customer.name, "Keep Me");
    }

    #[test]
    fn snapshot_is_detached_from_the_entity() {
        let mut customer =
            Customer::new(test_user_id(), base_fields("Before Edit"), test_time()).unwrap();
        let snapshot = customer.snapshot();

        customer
            .apply_update(CustomerUpdate {
                name: Some("After Edit".to_string()),
                ..CustomerUpdate::default()
            })
            .unwrap();

        assert_eq!(snapshot.name, "Before Edit");
        assert_eq!(customer.name, "After Edit");
    }
}
