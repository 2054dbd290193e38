//! `ledgerly-rates` — currency normalization through the reference currency
//! (USD) and the external rate-feed seam.

pub mod convert;
pub mod source;

pub use convert::{RateProvider, from_reference, to_reference};
pub use source::{RateSnapshot, RateSource, RateSourceError, RefreshOutcome};
