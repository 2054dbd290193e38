//! External rate-feed seam.
//!
//! The actual feed (an HTTP API in production) is an external collaborator;
//! the core only sees this trait. Refresh failures surface as a structured
//! outcome, leaving whatever table already exists stale but intact.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use ledgerly_core::CurrencyCode;

/// One wholesale pull from the feed: every known currency's rate against the
/// base (always the reference currency).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateSnapshot {
    pub base: CurrencyCode,
    pub rates: BTreeMap<CurrencyCode, f64>,
}

impl RateSnapshot {
    pub fn new(rates: BTreeMap<CurrencyCode, f64>) -> Self {
        Self {
            base: CurrencyCode::usd(),
            rates,
        }
    }
}

#[derive(Debug, Error)]
pub enum RateSourceError {
    #[error("rate source unavailable: {0}")]
    Unavailable(String),

    #[error("rate source returned malformed data: {0}")]
    Malformed(String),
}

/// The external rate feed.
pub trait RateSource: Send + Sync {
    fn fetch(&self) -> Result<RateSnapshot, RateSourceError>;
}

/// Result of one refresh run. Never propagated as an error: a failed
/// refresh reports itself and the previous table stays in effect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshOutcome {
    pub success: bool,
    pub count: usize,
    pub date: Option<NaiveDate>,
    pub error: Option<String>,
}

impl RefreshOutcome {
    pub fn succeeded(count: usize, date: NaiveDate) -> Self {
        Self {
            success: true,
            count,
            date: Some(date),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            count: 0,
            date: None,
            error: Some(error.into()),
        }
    }
}
