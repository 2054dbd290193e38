//! `ledgerly-recurring` — recurring billing schedules: calendar-interval
//! date arithmetic and the schedule state machine.

pub mod interval;
pub mod schedule;

pub use interval::{Interval, advance};
pub use schedule::{RecurringSchedule, ScheduleStatus, ScheduleUpdate};
