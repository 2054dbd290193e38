//! The services layer: user-facing operations over the store seams.
//!
//! Every operation takes the authenticated [`ledgerly_core::UserId`]
//! explicitly — there is no ambient "current user".

pub mod analytics;
pub mod assistant;
pub mod customers;
pub mod invoices;
pub mod rates_job;
pub mod recurring;

pub use analytics::AnalyticsService;
pub use assistant::{AssistantService, ChatReply, DraftedInvoice, InvoiceChatReply};
pub use customers::CustomerService;
pub use invoices::{InvoiceFields, InvoiceService, InvoiceWithLines};
pub use rates_job::RateRefreshJob;
pub use recurring::{BatchOutcome, CreateScheduleRequest, RecurringEngine};

use ledgerly_core::DomainError;

use crate::store::StoreError;

/// Service-level error: domain failures plus infrastructure surfaces.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// An external collaborator (text generation, rate feed) failed.
    #[error("upstream service failed: {0}")]
    Upstream(String),

    #[error("storage error: {0}")]
    Storage(String),
}

impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => ServiceError::Domain(DomainError::NotFound),
            StoreError::InvalidCursor => {
                ServiceError::Domain(DomainError::validation("invalid pagination cursor"))
            }
            StoreError::Storage(msg) => ServiceError::Storage(msg),
        }
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Free-form invoice number, not guaranteed unique.
pub(crate) fn generate_invoice_number() -> String {
    format!("INV-{}", uuid::Uuid::now_v7().as_u128() % 1_000_000)
}
