use std::sync::Arc;

use chrono::{Days, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use ledgerly_core::{CurrencyCode, CustomerId, DomainError, InvoiceId, ScheduleId, UserId};
use ledgerly_invoicing::{
    Invoice, InvoiceSource, InvoiceStatus, LineItemInput, compute_totals,
};
use ledgerly_rates::{RateProvider, to_reference};
use ledgerly_recurring::{Interval, RecurringSchedule, ScheduleUpdate};

use crate::store::{CustomerStore, InvoiceStore, LineItemStore, ScheduleStore};

use super::{ServiceError, ServiceResult, generate_invoice_number};

/// Materialized invoices fall due 30 days after their occurrence date.
const DUE_AFTER_DAYS: u64 = 30;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateScheduleRequest {
    pub customer_id: CustomerId,
    pub currency: CurrencyCode,
    pub line_items: Vec<LineItemInput>,
    pub note: Option<String>,
    pub interval: Interval,
    /// Defaults to today (UTC) when absent.
    pub start_date: Option<NaiveDate>,
    pub generate_first_immediately: bool,
}

/// Summary of one batch run. Per-schedule failures are counted, logged, and
/// never abort the run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchOutcome {
    pub selected: usize,
    pub created: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// The recurring schedule engine: schedule CRUD, occurrence
/// materialization, and the daily batch entry point.
#[derive(Clone)]
pub struct RecurringEngine {
    schedules: Arc<dyn ScheduleStore>,
    customers: Arc<dyn CustomerStore>,
    invoices: Arc<dyn InvoiceStore>,
    line_items: Arc<dyn LineItemStore>,
    rates: Arc<dyn RateProvider + Send + Sync>,
}

impl RecurringEngine {
    pub fn new(
        schedules: Arc<dyn ScheduleStore>,
        customers: Arc<dyn CustomerStore>,
        invoices: Arc<dyn InvoiceStore>,
        line_items: Arc<dyn LineItemStore>,
        rates: Arc<dyn RateProvider + Send + Sync>,
    ) -> Self {
        Self {
            schedules,
            customers,
            invoices,
            line_items,
            rates,
        }
    }

    /// Create a schedule, optionally materializing the first occurrence.
    ///
    /// The first invoice is generated when the caller asks for it explicitly
    /// OR when the start date is no later than tomorrow (UTC). The one-day
    /// grace window absorbs callers in timezones ahead of UTC, so a same-day
    /// local start is not skipped; its boundary is load-bearing and must not
    /// be "corrected" to exact timezone handling.
    pub fn create(
        &self,
        user_id: UserId,
        request: CreateScheduleRequest,
        today: NaiveDate,
    ) -> ServiceResult<(ScheduleId, Option<InvoiceId>)> {
        match self.customers.get(request.customer_id)? {
            Some(customer) if customer.user_id == user_id => {}
            Some(_) => return Err(DomainError::AccessDenied.into()),
            None => return Err(DomainError::NotFound.into()),
        }

        let start_date = request.start_date.unwrap_or(today);
        let mut schedule = RecurringSchedule::new(
            user_id,
            request.customer_id,
            request.currency,
            request.line_items,
            request.note,
            request.interval,
            start_date,
            Utc::now(),
        )?;
        let schedule_id = schedule.id;
        self.schedules.insert(schedule.clone())?;

        let tomorrow = today + Days::new(1);
        let generate_now = request.generate_first_immediately || start_date <= tomorrow;

        let invoice_id = if generate_now {
            info!(
                schedule_id = %schedule_id,
                start = %start_date,
                cutoff = %tomorrow,
                "generating immediate invoice for new schedule"
            );
            self.materialize(&mut schedule, start_date)?
        } else {
            info!(
                schedule_id = %schedule_id,
                start = %start_date,
                cutoff = %tomorrow,
                "skipping immediate generation"
            );
            None
        };

        Ok((schedule_id, invoice_id))
    }

    /// Materialize the occurrence of `schedule` falling on `occurrence_date`.
    ///
    /// Shared by creation-time immediate generation and the batch processor.
    /// At-most-once per `(schedule, occurrence_date)`: the schedule advances
    /// in the same logical step as the insert, and a dedup key guards the
    /// insert against partial-failure retries.
    pub fn materialize(
        &self,
        schedule: &mut RecurringSchedule,
        occurrence_date: NaiveDate,
    ) -> ServiceResult<Option<InvoiceId>> {
        // A missing customer skips the occurrence without advancing, so the
        // schedule is retried once the data issue is resolved.
        let customer = match self.customers.get(schedule.customer_id)? {
            Some(customer) => customer,
            None => {
                warn!(
                    schedule_id = %schedule.id,
                    customer_id = %schedule.customer_id,
                    "customer missing; occurrence skipped"
                );
                return Ok(None);
            }
        };

        if self
            .invoices
            .find_by_source(schedule.id, occurrence_date)?
            .is_some()
        {
            warn!(
                schedule_id = %schedule.id,
                occurrence = %occurrence_date,
                "occurrence already materialized; advancing only"
            );
            schedule.mark_run(occurrence_date);
            self.schedules.update(schedule)?;
            return Ok(None);
        }

        let (priced, totals) = compute_totals(&schedule.line_items, 0, 0)?;
        let total_cents_usd = if schedule.currency.is_reference() {
            Some(totals.total_cents)
        } else {
            self.rates
                .rate(&schedule.currency)
                .filter(|r| r.is_finite() && *r > 0.0)
                .map(|_| to_reference(totals.total_cents, &schedule.currency, &self.rates))
        };

        let invoice = Invoice {
            id: InvoiceId::new(),
            user_id: schedule.user_id,
            customer_id: schedule.customer_id,
            // Snapshot as of materialization time, not schedule creation.
            customer: customer.snapshot(),
            invoice_number: generate_invoice_number(),
            issue_date: Some(occurrence_date.to_string()),
            due_date: Some((occurrence_date + Days::new(DUE_AFTER_DAYS)).to_string()),
            currency: schedule.currency.clone(),
            subtotal_cents: totals.subtotal_cents,
            tax_cents: totals.tax_cents,
            discount_cents: totals.discount_cents,
            total_cents: totals.total_cents,
            total_cents_usd,
            status: InvoiceStatus::Draft,
            note: schedule.note.clone(),
            source: Some(InvoiceSource {
                schedule_id: schedule.id,
                occurrence_date,
            }),
            created_at: Utc::now(),
        };
        let invoice_id = invoice.id;

        self.invoices.insert(invoice)?;
        self.line_items.replace_for_invoice(invoice_id, priced)?;

        schedule.mark_run(occurrence_date);
        self.schedules.update(schedule)?;

        info!(
            schedule_id = %schedule.id,
            invoice_id = %invoice_id,
            occurrence = %occurrence_date,
            next_run = %schedule.next_run_date,
            "occurrence materialized"
        );
        Ok(Some(invoice_id))
    }

    /// Daily batch entry point.
    ///
    /// Cutoff is tomorrow (UTC) — the same one-day grace window as creation.
    /// Each schedule is processed independently; one failure is logged and
    /// the rest of the batch continues.
    pub fn process_due(&self, today: NaiveDate) -> ServiceResult<BatchOutcome> {
        let cutoff = today + Days::new(1);
        let due = self.schedules.list_due(cutoff)?;

        info!(cutoff = %cutoff, selected = due.len(), "processing due recurring schedules");

        let mut outcome = BatchOutcome {
            selected: due.len(),
            ..BatchOutcome::default()
        };

        for mut schedule in due {
            let occurrence = schedule.next_run_date;
            match self.materialize(&mut schedule, occurrence) {
                Ok(Some(_)) => outcome.created += 1,
                Ok(None) => outcome.skipped += 1,
                Err(err) => {
                    outcome.failed += 1;
                    error!(
                        schedule_id = %schedule.id,
                        occurrence = %occurrence,
                        error = %err,
                        "schedule materialization failed; continuing batch"
                    );
                }
            }
        }

        Ok(outcome)
    }

    pub fn list(&self, user_id: UserId) -> ServiceResult<Vec<RecurringSchedule>> {
        Ok(self.schedules.list_for_user(user_id)?)
    }

    pub fn update(
        &self,
        user_id: UserId,
        schedule_id: ScheduleId,
        update: ScheduleUpdate,
    ) -> ServiceResult<RecurringSchedule> {
        let mut schedule = self.owned(user_id, schedule_id)?;
        schedule.apply_update(update);
        self.schedules.update(&schedule)?;
        Ok(schedule)
    }

    /// Remove the definition only; already-materialized invoices stay.
    pub fn delete(&self, user_id: UserId, schedule_id: ScheduleId) -> ServiceResult<()> {
        self.owned(user_id, schedule_id)?;
        self.schedules.delete(schedule_id)?;
        Ok(())
    }

    fn owned(&self, user_id: UserId, schedule_id: ScheduleId) -> ServiceResult<RecurringSchedule> {
        match self.schedules.get(schedule_id)? {
            Some(schedule) if schedule.user_id == user_id => Ok(schedule),
            _ => Err(ServiceError::Domain(DomainError::NotFound)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ledgerly_customers::{Customer, CustomerFields};
    use ledgerly_recurring::ScheduleStatus;

    use crate::store::{
        InMemoryCustomerStore, InMemoryInvoiceStore, InMemoryLineItemStore, InMemoryRateStore,
        InMemoryScheduleStore, InvoiceStore, ScheduleStore,
    };

    struct Fixture {
        engine: RecurringEngine,
        customers: Arc<InMemoryCustomerStore>,
        invoices: Arc<InMemoryInvoiceStore>,
        line_items: Arc<InMemoryLineItemStore>,
        schedules: Arc<InMemoryScheduleStore>,
    }

    fn fixture() -> Fixture {
        let customers = InMemoryCustomerStore::arc();
        let invoices = InMemoryInvoiceStore::arc();
        let line_items = InMemoryLineItemStore::arc();
        let schedules = InMemoryScheduleStore::arc();
        let engine = RecurringEngine::new(
            schedules.clone(),
            customers.clone(),
            invoices.clone(),
            line_items.clone(),
            Arc::new(InMemoryRateStore::new()),
        );
        Fixture {
            engine,
            customers,
            invoices,
            line_items,
            schedules,
        }
    }

    fn seed_customer(fix: &Fixture, user_id: UserId) -> CustomerId {
        let customer = Customer::new(
            user_id,
            CustomerFields {
                name: "Acme".to_string(),
                ..CustomerFields::default()
            },
            Utc::now(),
        )
        .unwrap();
        let id = customer.id;
        fix.customers.insert(customer).unwrap();
        id
    }

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn request(customer_id: CustomerId, start: Option<&str>) -> CreateScheduleRequest {
        CreateScheduleRequest {
            customer_id,
            currency: CurrencyCode::usd(),
            line_items: vec![LineItemInput {
                description: "Retainer".to_string(),
                quantity: 1.0,
                unit_price_cents: 50000,
            }],
            note: Some("monthly retainer".to_string()),
            interval: Interval::Monthly,
            start_date: start.map(|s| date(s)),
            generate_first_immediately: false,
        }
    }

    #[test]
    fn same_day_start_generates_immediately_via_grace_window() {
        let fix = fixture();
        let user = UserId::new();
        let customer_id = seed_customer(&fix, user);
        let today = date("2025-08-06");

        let (schedule_id, invoice_id) = fix
            .engine
            .create(user, request(customer_id, None), today)
            .unwrap();

        let invoice_id = invoice_id.expect("grace window should generate the first invoice");
        let invoice = fix.invoices.get(invoice_id).unwrap().unwrap();
        assert_eq!(invoice.issue_date.as_deref(), Some("2025-08-06"));
        assert_eq!(invoice.due_date.as_deref(), Some("2025-09-05"));
        assert_eq!(invoice.status, InvoiceStatus::Draft);
        assert_eq!(invoice.total_cents, 50000);
        assert_eq!(invoice.note.as_deref(), Some("monthly retainer"));
        assert_eq!(
            fix.line_items.list_for_invoice(invoice_id).unwrap().len(),
            1
        );

        let schedule = fix.schedules.get(schedule_id).unwrap().unwrap();
        assert_eq!(schedule.last_run_date, Some(today));
        assert_eq!(schedule.next_run_date, date("2025-09-06"));
    }

    #[test]
    fn tomorrow_start_is_inside_the_grace_window() {
        let fix = fixture();
        let user = UserId::new();
        let customer_id = seed_customer(&fix, user);

        let (_, invoice_id) = fix
            .engine
            .create(
                user,
                request(customer_id, Some("2025-08-07")),
                date("2025-08-06"),
            )
            .unwrap();
        assert!(invoice_id.is_some());
    }

    #[test]
    fn far_future_start_defers_generation_unless_forced() {
        let fix = fixture();
        let user = UserId::new();
        let customer_id = seed_customer(&fix, user);
        let today = date("2025-08-06");

        let (schedule_id, invoice_id) = fix
            .engine
            .create(user, request(customer_id, Some("2025-08-08")), today)
            .unwrap();
        assert!(invoice_id.is_none());
        let schedule = fix.schedules.get(schedule_id).unwrap().unwrap();
        assert_eq!(schedule.next_run_date, date("2025-08-08"));
        assert!(schedule.last_run_date.is_none());

        let mut forced = request(customer_id, Some("2025-08-08"));
        forced.generate_first_immediately = true;
        let (_, invoice_id) = fix.engine.create(user, forced, today).unwrap();
        assert!(invoice_id.is_some());
    }

    #[test]
    fn batch_materializes_due_schedules_and_advances_them() {
        let fix = fixture();
        let user = UserId::new();
        let customer_id = seed_customer(&fix, user);

        let (schedule_id, _) = fix
            .engine
            .create(user, request(customer_id, Some("2025-09-01")), date("2025-08-01"))
            .unwrap();

        // Not due yet.
        let outcome = fix.engine.process_due(date("2025-08-15")).unwrap();
        assert_eq!(outcome.selected, 0);

        // Due (cutoff = tomorrow reaches the start date).
        let outcome = fix.engine.process_due(date("2025-08-31")).unwrap();
        assert_eq!(outcome.selected, 1);
        assert_eq!(outcome.created, 1);
        assert_eq!(outcome.failed, 0);

        let schedule = fix.schedules.get(schedule_id).unwrap().unwrap();
        assert_eq!(schedule.next_run_date, date("2025-10-01"));
        assert_eq!(fix.invoices.list_for_user(user).unwrap().len(), 1);
    }

    #[test]
    fn rerunning_the_batch_with_the_same_cutoff_is_idempotent() {
        let fix = fixture();
        let user = UserId::new();
        let customer_id = seed_customer(&fix, user);

        fix.engine
            .create(user, request(customer_id, Some("2025-09-01")), date("2025-08-01"))
            .unwrap();

        let today = date("2025-08-31");
        let first = fix.engine.process_due(today).unwrap();
        assert_eq!(first.created, 1);

        let second = fix.engine.process_due(today).unwrap();
        assert_eq!(second.selected, 0);
        assert_eq!(second.created, 0);
        assert_eq!(fix.invoices.list_for_user(user).unwrap().len(), 1);
    }

    #[test]
    fn dedup_key_blocks_double_materialization_on_retry() {
        let fix = fixture();
        let user = UserId::new();
        let customer_id = seed_customer(&fix, user);

        let (schedule_id, _) = fix
            .engine
            .create(user, request(customer_id, Some("2025-09-01")), date("2025-08-01"))
            .unwrap();

        // Simulate a partial-failure retry: the invoice exists but the
        // schedule was rolled back to its pre-run state.
        let mut schedule = fix.schedules.get(schedule_id).unwrap().unwrap();
        fix.engine
            .materialize(&mut schedule.clone(), date("2025-09-01"))
            .unwrap();
        schedule.next_run_date = date("2025-09-01");
        schedule.last_run_date = None;
        fix.schedules.update(&schedule).unwrap();

        let outcome = fix.engine.process_due(date("2025-08-31")).unwrap();
        assert_eq!(outcome.selected, 1);
        assert_eq!(outcome.created, 0);
        assert_eq!(outcome.skipped, 1);

        // Exactly one invoice for the occurrence, and the schedule drained.
        assert_eq!(fix.invoices.list_for_user(user).unwrap().len(), 1);
        let schedule = fix.schedules.get(schedule_id).unwrap().unwrap();
        assert_eq!(schedule.next_run_date, date("2025-10-01"));
    }

    #[test]
    fn missing_customer_skips_without_aborting_the_batch() {
        let fix = fixture();
        let user = UserId::new();

        let healthy_customer = seed_customer(&fix, user);
        let doomed_customer = seed_customer(&fix, user);

        fix.engine
            .create(user, request(healthy_customer, Some("2025-09-01")), date("2025-08-01"))
            .unwrap();
        fix.engine
            .create(user, request(doomed_customer, Some("2025-09-01")), date("2025-08-01"))
            .unwrap();

        fix.customers.delete(doomed_customer).unwrap();

        let outcome = fix.engine.process_due(date("2025-08-31")).unwrap();
        assert_eq!(outcome.selected, 2);
        assert_eq!(outcome.created, 1);
        assert_eq!(outcome.skipped, 1);
        assert_eq!(outcome.failed, 0);

        // The healthy schedule produced its invoice.
        assert_eq!(fix.invoices.list_for_user(user).unwrap().len(), 1);
    }

    #[test]
    fn snapshot_reflects_materialization_time_not_creation_time() {
        let fix = fixture();
        let user = UserId::new();
        let customer_id = seed_customer(&fix, user);

        fix.engine
            .create(user, request(customer_id, Some("2025-09-01")), date("2025-08-01"))
            .unwrap();

        // Rename the customer between schedule creation and the batch run.
        let mut customer = fix.customers.get(customer_id).unwrap().unwrap();
        customer.name = "Acme Rebranded".to_string();
        fix.customers.update(&customer).unwrap();

        fix.engine.process_due(date("2025-08-31")).unwrap();
        let invoice = &fix.invoices.list_for_user(user).unwrap()[0];
        assert_eq!(invoice.customer.name, "Acme Rebranded");
    }

    #[test]
    fn update_and_delete_enforce_ownership_and_leave_invoices_alone() {
        let fix = fixture();
        let user = UserId::new();
        let stranger = UserId::new();
        let customer_id = seed_customer(&fix, user);
        let today = date("2025-08-06");

        let (schedule_id, invoice_id) = fix
            .engine
            .create(user, request(customer_id, None), today)
            .unwrap();

        assert!(
            fix.engine
                .update(
                    stranger,
                    schedule_id,
                    ScheduleUpdate {
                        status: Some(ScheduleStatus::Paused),
                        ..ScheduleUpdate::default()
                    },
                )
                .is_err()
        );

        let updated = fix
            .engine
            .update(
                user,
                schedule_id,
                ScheduleUpdate {
                    status: Some(ScheduleStatus::Cancelled),
                    ..ScheduleUpdate::default()
                },
            )
            .unwrap();
        assert_eq!(updated.status, ScheduleStatus::Cancelled);

        fix.engine.delete(user, schedule_id).unwrap();
        assert!(fix.schedules.get(schedule_id).unwrap().is_none());
        // The materialized invoice survives the schedule's deletion.
        assert!(fix.invoices.get(invoice_id.unwrap()).unwrap().is_some());
    }
}
