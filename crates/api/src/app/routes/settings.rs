use std::sync::Arc;

use axum::{
    Json, Router, extract::Extension, http::StatusCode, response::IntoResponse, routing::put,
};

use ledgerly_core::CurrencyCode;

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::UserContext;

pub fn router() -> Router {
    Router::new().route("/currency", put(set_default_currency))
}

pub async fn set_default_currency(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<UserContext>,
    Json(body): Json<dto::CurrencyRequest>,
) -> axum::response::Response {
    let currency = match CurrencyCode::normalize(&body.currency) {
        Some(code) => code,
        None => {
            return errors::json_error(
                StatusCode::BAD_REQUEST,
                "validation_error",
                "currency must be a 3-letter code",
            );
        }
    };

    match services
        .profiles
        .set_default_currency(user.user_id(), currency.clone())
    {
        Ok(()) => (
            StatusCode::OK,
            Json(serde_json::json!({ "currency": currency })),
        )
            .into_response(),
        Err(e) => errors::json_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "storage_error",
            e.to_string(),
        ),
    }
}
