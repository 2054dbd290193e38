use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use ledgerly_core::{CurrencyCode, CustomerId, DomainError, ScheduleId, UserId, money};
use ledgerly_invoicing::LineItemInput;

use crate::interval::{Interval, advance};

/// Schedule lifecycle.
///
/// `active ⇄ paused` freely; `cancelled` is terminal for the batch processor
/// but remains queryable and may be reactivated by an explicit user update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScheduleStatus {
    Active,
    Paused,
    Cancelled,
}

/// Partial update: only supplied fields change. The batch processor never
/// goes through this path — it only advances run dates via
/// [`RecurringSchedule::mark_run`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ScheduleUpdate {
    pub interval: Option<Interval>,
    pub next_run_date: Option<NaiveDate>,
    pub status: Option<ScheduleStatus>,
    pub note: Option<String>,
}

/// A recurring billing definition.
///
/// `next_run_date` is a pure calendar date and only ever moves forward via
/// the interval arithmetic (or an explicit user override).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecurringSchedule {
    pub id: ScheduleId,
    pub user_id: UserId,
    pub customer_id: CustomerId,
    pub currency: CurrencyCode,
    /// Line-item template: no derived amounts; those are computed at each
    /// materialization.
    pub line_items: Vec<LineItemInput>,
    pub note: Option<String>,
    pub interval: Interval,
    pub next_run_date: NaiveDate,
    pub last_run_date: Option<NaiveDate>,
    pub status: ScheduleStatus,
    pub created_at: DateTime<Utc>,
}

impl RecurringSchedule {
    pub fn new(
        user_id: UserId,
        customer_id: CustomerId,
        currency: CurrencyCode,
        line_items: Vec<LineItemInput>,
        note: Option<String>,
        interval: Interval,
        start_date: NaiveDate,
        created_at: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        if line_items.is_empty() {
            return Err(DomainError::validation(
                "schedule must have at least one line item",
            ));
        }
        for item in &line_items {
            money::validate_quantity(item.quantity)?;
            money::validate_unit_price(item.unit_price_cents)?;
        }

        Ok(Self {
            id: ScheduleId::new(),
            user_id,
            customer_id,
            currency,
            line_items,
            note,
            interval,
            next_run_date: start_date,
            last_run_date: None,
            status: ScheduleStatus::Active,
            created_at,
        })
    }

    /// Whether the batch processor should pick this schedule up for a run
    /// with the given cutoff date.
    pub fn is_due(&self, cutoff: NaiveDate) -> bool {
        self.status == ScheduleStatus::Active && self.next_run_date <= cutoff
    }

    /// Record that the occurrence at `occurrence_date` was materialized and
    /// advance to the next occurrence. This is the only mutation the batch
    /// processor performs, and it is what makes re-selection of the same
    /// occurrence impossible.
    pub fn mark_run(&mut self, occurrence_date: NaiveDate) {
        self.last_run_date = Some(occurrence_date);
        self.next_run_date = advance(occurrence_date, self.interval);
    }

    /// Apply a user-initiated partial update.
    pub fn apply_update(&mut self, update: ScheduleUpdate) {
        if let Some(interval) = update.interval {
            self.interval = interval;
        }
        if let Some(next_run_date) = update.next_run_date {
            self.next_run_date = next_run_date;
        }
        if let Some(status) = update.status {
            self.status = status;
        }
        if let Some(note) = update.note {
            self.note = Some(note);
        }
    }
}
