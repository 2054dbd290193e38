//! `ledgerly-analytics` — on-demand dashboard KPIs and revenue analytics.
//!
//! Everything here is a pure function over slices of ledger data plus an
//! explicit `today`: no storage access, no clock reads. Data anomalies
//! (unparseable dates, missing rates) are absorbed — excluded from sums,
//! never raised.

pub mod dashboard;
pub mod months;
pub mod revenue;
pub mod trend;

pub use dashboard::{DashboardKpis, DashboardTotals, Kpi, dashboard_kpis};
pub use revenue::{PaymentSample, RevenueAnalytics, RevenuePoint, revenue_analytics};
pub use trend::format_trend;
