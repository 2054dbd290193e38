use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use chrono::NaiveDate;

use ledgerly_core::{ScheduleId, UserId};
use ledgerly_recurring::RecurringSchedule;

use super::{StoreError, StoreResult};

/// Recurring schedule storage.
pub trait ScheduleStore: Send + Sync {
    fn insert(&self, schedule: RecurringSchedule) -> StoreResult<()>;
    fn get(&self, id: ScheduleId) -> StoreResult<Option<RecurringSchedule>>;
    fn update(&self, schedule: &RecurringSchedule) -> StoreResult<()>;
    fn delete(&self, id: ScheduleId) -> StoreResult<()>;
    fn list_for_user(&self, user_id: UserId) -> StoreResult<Vec<RecurringSchedule>>;
    /// Batch selection: `status = active AND next_run_date ≤ cutoff`,
    /// across all users (mirrors the status+date secondary index).
    fn list_due(&self, cutoff: NaiveDate) -> StoreResult<Vec<RecurringSchedule>>;
}

/// In-memory schedule store for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryScheduleStore {
    inner: RwLock<HashMap<ScheduleId, RecurringSchedule>>,
}

impl InMemoryScheduleStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arc() -> Arc<Self> {
        Arc::new(Self::new())
    }

    fn read(
        &self,
    ) -> StoreResult<std::sync::RwLockReadGuard<'_, HashMap<ScheduleId, RecurringSchedule>>> {
        self.inner
            .read()
            .map_err(|_| StoreError::Storage("schedule store lock poisoned".to_string()))
    }

    fn write(
        &self,
    ) -> StoreResult<std::sync::RwLockWriteGuard<'_, HashMap<ScheduleId, RecurringSchedule>>> {
        self.inner
            .write()
            .map_err(|_| StoreError::Storage("schedule store lock poisoned".to_string()))
    }
}

impl ScheduleStore for InMemoryScheduleStore {
    fn insert(&self, schedule: RecurringSchedule) -> StoreResult<()> {
        self.write()?.insert(schedule.id, schedule);
        Ok(())
    }

    fn get(&self, id: ScheduleId) -> StoreResult<Option<RecurringSchedule>> {
        Ok(self.read()?.get(&id).cloned())
    }

    fn update(&self, schedule: &RecurringSchedule) -> StoreResult<()> {
        let mut map = self.write()?;
        if !map.contains_key(&schedule.id) {
            return Err(StoreError::NotFound);
        }
        map.insert(schedule.id, schedule.clone());
        Ok(())
    }

    fn delete(&self, id: ScheduleId) -> StoreResult<()> {
        self.write()?
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::NotFound)
    }

    fn list_for_user(&self, user_id: UserId) -> StoreResult<Vec<RecurringSchedule>> {
        let mut schedules: Vec<_> = self
            .read()?
            .values()
            .filter(|s| s.user_id == user_id)
            .cloned()
            .collect();
        schedules.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.id.as_uuid().cmp(b.id.as_uuid()))
        });
        Ok(schedules)
    }

    fn list_due(&self, cutoff: NaiveDate) -> StoreResult<Vec<RecurringSchedule>> {
        let mut due: Vec<_> = self
            .read()?
            .values()
            .filter(|s| s.is_due(cutoff))
            .cloned()
            .collect();
        due.sort_by_key(|s| s.next_run_date);
        Ok(due)
    }
}

impl ScheduleStore for Arc<InMemoryScheduleStore> {
    fn insert(&self, schedule: RecurringSchedule) -> StoreResult<()> {
        (**self).insert(schedule)
    }

    fn get(&self, id: ScheduleId) -> StoreResult<Option<RecurringSchedule>> {
        (**self).get(id)
    }

    fn update(&self, schedule: &RecurringSchedule) -> StoreResult<()> {
        (**self).update(schedule)
    }

    fn delete(&self, id: ScheduleId) -> StoreResult<()> {
        (**self).delete(id)
    }

    fn list_for_user(&self, user_id: UserId) -> StoreResult<Vec<RecurringSchedule>> {
        (**self).list_for_user(user_id)
    }

    fn list_due(&self, cutoff: NaiveDate) -> StoreResult<Vec<RecurringSchedule>> {
        (**self).list_due(cutoff)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use ledgerly_core::{CurrencyCode, CustomerId};
    use ledgerly_invoicing::LineItemInput;
    use ledgerly_recurring::{Interval, ScheduleStatus};

    fn schedule(user_id: UserId, start: &str) -> RecurringSchedule {
        RecurringSchedule::new(
            user_id,
            CustomerId::new(),
            CurrencyCode::usd(),
            vec![LineItemInput {
                description: "Retainer".to_string(),
                quantity: 1.0,
                unit_price_cents: 10000,
            }],
            None,
            Interval::Monthly,
            start.parse().unwrap(),
            Utc::now(),
        )
        .unwrap()
    }

    #[test]
    fn due_selection_respects_status_and_cutoff() {
        let store = InMemoryScheduleStore::new();
        let user = UserId::new();

        let due = schedule(user, "2025-08-01");
        let future = schedule(user, "2025-09-15");
        let mut paused = schedule(user, "2025-08-01");
        paused.status = ScheduleStatus::Paused;

        let due_id = due.id;
        store.insert(due).unwrap();
        store.insert(future).unwrap();
        store.insert(paused).unwrap();

        let cutoff: NaiveDate = "2025-08-07".parse().unwrap();
        let selected = store.list_due(cutoff).unwrap();
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].id, due_id);
    }

    #[test]
    fn due_selection_spans_users() {
        let store = InMemoryScheduleStore::new();
        store.insert(schedule(UserId::new(), "2025-08-01")).unwrap();
        store.insert(schedule(UserId::new(), "2025-08-02")).unwrap();

        let selected = store.list_due("2025-08-07".parse().unwrap()).unwrap();
        assert_eq!(selected.len(), 2);
        // Ordered by due date.
        assert!(selected[0].next_run_date <= selected[1].next_run_date);
    }

    #[test]
    fn update_requires_existing_record() {
        let store = InMemoryScheduleStore::new();
        let s = schedule(UserId::new(), "2025-08-01");
        assert!(matches!(store.update(&s), Err(StoreError::NotFound)));

        store.insert(s.clone()).unwrap();
        let mut changed = s;
        changed.status = ScheduleStatus::Cancelled;
        store.update(&changed).unwrap();
        assert_eq!(
            store.get(changed.id).unwrap().unwrap().status,
            ScheduleStatus::Cancelled
        );
    }
}
