//! HTTP API application wiring (Axum router + service wiring).
//!
//! Folder layout:
//! - `services.rs`: infrastructure wiring (stores, services, collaborator stubs)
//! - `routes/`: HTTP routes + handlers (one file per domain area)
//! - `dto.rs`: request/response DTOs and JSON mapping helpers
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{Extension, Router, routing::get};
use tower::ServiceBuilder;

use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

pub use services::AppServices;

/// Build the full HTTP router with freshly wired in-memory services.
pub async fn build_app() -> Router {
    build_router(Arc::new(services::build_services()))
}

/// Build the router around an existing service set (used by `main.rs`, which
/// also hands the services to the daily trigger).
pub fn build_router(services: Arc<AppServices>) -> Router {
    // Protected routes: require a resolved user identity.
    let protected = routes::router()
        .layer(Extension(services))
        .layer(axum::middleware::from_fn(
            middleware::user_context_middleware,
        ));

    Router::new()
        .route("/health", get(routes::system::health))
        .merge(protected)
        .layer(ServiceBuilder::new())
}
