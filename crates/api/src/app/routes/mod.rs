use axum::Router;

pub mod assistant;
pub mod customers;
pub mod dashboard;
pub mod invoices;
pub mod recurring;
pub mod settings;
pub mod system;

/// All domain routes (mounted behind the user-context middleware).
pub fn router() -> Router {
    Router::new()
        .nest("/customers", customers::router())
        .nest("/invoices", invoices::router())
        .nest("/recurring", recurring::router())
        .nest("/dashboard", dashboard::router())
        .nest("/assistant", assistant::router())
        .nest("/settings", settings::router())
}
