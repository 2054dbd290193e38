//! `ledgerly-api` — the HTTP gateway: axum routing, DTO mapping, and the
//! request user context.

pub mod app;
pub mod context;
pub mod middleware;
