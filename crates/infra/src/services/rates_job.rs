use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use ledgerly_rates::{RateSource, RefreshOutcome};

use crate::store::{RateEntry, RateStore};

/// Daily currency-rate refresh.
///
/// Pulls the wholesale rate map from the external feed and rewrites the
/// table. Failures are reported as a structured outcome — the previous
/// table stays in effect, stale but intact.
#[derive(Clone)]
pub struct RateRefreshJob {
    source: Arc<dyn RateSource>,
    store: Arc<dyn RateStore>,
}

impl RateRefreshJob {
    pub fn new(source: Arc<dyn RateSource>, store: Arc<dyn RateStore>) -> Self {
        Self { source, store }
    }

    pub fn run(&self, now: DateTime<Utc>) -> RefreshOutcome {
        let snapshot = match self.source.fetch() {
            Ok(snapshot) => snapshot,
            Err(err) => {
                warn!(error = %err, "rate fetch failed; keeping previous table");
                return RefreshOutcome::failed(err.to_string());
            }
        };

        let entries: Vec<RateEntry> = snapshot
            .rates
            .into_iter()
            .map(|(currency, rate)| RateEntry {
                currency,
                rate,
                updated_at: now,
            })
            .collect();
        let count = entries.len();

        match self.store.replace_all(entries) {
            Ok(()) => {
                info!(count, "rate table refreshed");
                RefreshOutcome::succeeded(count, now.date_naive())
            }
            Err(err) => {
                warn!(error = %err, "rate table write failed; keeping previous table");
                RefreshOutcome::failed(err.to_string())
            }
        }
    }
}
