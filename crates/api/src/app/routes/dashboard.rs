use std::sync::Arc;

use axum::{Json, Router, extract::Extension, http::StatusCode, response::IntoResponse, routing::get};
use chrono::Utc;

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::UserContext;

pub fn router() -> Router {
    Router::new()
        .route("/metrics", get(metrics))
        .route("/analytics", get(analytics))
}

pub async fn metrics(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<UserContext>,
) -> axum::response::Response {
    let today = Utc::now().date_naive();
    match services.analytics.dashboard(user.user_id(), today) {
        Ok(kpis) => (StatusCode::OK, Json(dto::dashboard_to_json(&kpis))).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn analytics(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<UserContext>,
) -> axum::response::Response {
    let today = Utc::now().date_naive();
    let user_id = user.user_id();

    let revenue = match services.analytics.revenue(user_id, today) {
        Ok(revenue) => revenue,
        Err(e) => return errors::service_error_to_response(e),
    };
    match services.analytics.dashboard(user_id, today) {
        Ok(kpis) => (
            StatusCode::OK,
            Json(dto::analytics_to_json(&revenue, &kpis)),
        )
            .into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}
