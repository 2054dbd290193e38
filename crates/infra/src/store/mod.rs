//! Store traits and in-memory implementations.
//!
//! Stores are deliberately thin: owner-filtered reads and whole-record
//! writes, matching a document store with secondary indexes. Ownership
//! *policy* (NotFound/AccessDenied conflation) lives in the services layer.

pub mod chat_runs;
pub mod customers;
pub mod invoices;
pub mod payments;
pub mod rates;
pub mod schedules;
pub mod users;

pub use chat_runs::{ChatRunStore, InMemoryChatRunStore};
pub use customers::{CustomerStore, InMemoryCustomerStore};
pub use invoices::{InMemoryInvoiceStore, InMemoryLineItemStore, InvoiceStore, LineItemStore, Page};
pub use payments::{InMemoryPaymentStore, PaymentStore};
pub use rates::{InMemoryRateStore, RateEntry, RateStore};
pub use schedules::{InMemoryScheduleStore, ScheduleStore};
pub use users::{InMemoryUserProfileStore, UserProfile, UserProfileStore};

/// Store-level error.
#[derive(Debug, Clone, thiserror::Error)]
pub enum StoreError {
    #[error("record not found")]
    NotFound,

    #[error("invalid pagination cursor")]
    InvalidCursor,

    #[error("storage error: {0}")]
    Storage(String),
}

pub type StoreResult<T> = Result<T, StoreError>;
