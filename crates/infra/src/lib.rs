//! `ledgerly-infra` — storage seams, the services layer, and background
//! jobs.
//!
//! The document store is an external collaborator: each entity gets a store
//! trait plus an in-memory implementation used for dev and tests. Services
//! implement the user-facing operations (ownership checks, derived totals,
//! materialization, aggregation) on top of those traits.

pub mod jobs;
pub mod services;
pub mod store;
