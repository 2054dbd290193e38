//! `ledgerly-core` — domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns).

pub mod currency;
pub mod error;
pub mod id;
pub mod money;

pub use currency::CurrencyCode;
pub use error::{DomainError, DomainResult};
pub use id::{ChatRunId, CustomerId, InvoiceId, PaymentId, ScheduleId, UserId};
pub use money::line_amount_cents;
