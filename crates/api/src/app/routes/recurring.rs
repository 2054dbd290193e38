use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put},
};
use chrono::{NaiveDate, Utc};

use ledgerly_core::{CurrencyCode, CustomerId, ScheduleId};
use ledgerly_infra::services::CreateScheduleRequest;
use ledgerly_invoicing::LineItemInput;
use ledgerly_recurring::ScheduleUpdate;

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::UserContext;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_schedules).post(create_schedule))
        .route("/:id", put(update_schedule).delete(delete_schedule))
        .route("/process", post(process_schedules))
}

fn parse_schedule_id(id: &str) -> Result<ScheduleId, axum::response::Response> {
    id.parse().map_err(|_| {
        errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid schedule id")
    })
}

fn parse_date(raw: &str) -> Result<NaiveDate, axum::response::Response> {
    raw.parse().map_err(|_| {
        errors::json_error(
            StatusCode::BAD_REQUEST,
            "validation_error",
            "dates must be YYYY-MM-DD",
        )
    })
}

pub async fn create_schedule(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<UserContext>,
    Json(body): Json<dto::CreateScheduleRequest>,
) -> axum::response::Response {
    let customer_id: CustomerId = match body.customer_id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid customer id");
        }
    };

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

    let start_date = match body.start_date.as_deref() {
        None => None,
        Some(raw) => match parse_date(raw) {
            Ok(date) => Some(date),
            Err(resp) => return resp,
        },
    };

    let request = CreateScheduleRequest {
        customer_id,
        currency,
        line_items: body
            .line_items
            .into_iter()
            .map(|item| LineItemInput {
                description: item.description,
                quantity: item.quantity,
                unit_price_cents: item.unit_price_cents,
            })
            .collect(),
        note: body.note,
        interval: body.interval,
        start_date,
        generate_first_immediately: body.generate_first_immediately.unwrap_or(false),
    };

    let today = Utc::now().date_naive();
    match services.recurring.create(user.user_id(), request, today) {
        Ok((schedule_id, invoice_id)) => (
            StatusCode::CREATED,
            Json(serde_json::json!({
                "recurringId": schedule_id.to_string(),
                "invoiceId": invoice_id.map(|id| id.to_string()),
            })),
        )
            .into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn list_schedules(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<UserContext>,
) -> axum::response::Response {
    match services.recurring.list(user.user_id()) {
        Ok(schedules) => {
            let items = schedules.iter().map(dto::schedule_to_json).collect::<Vec<_>>();
            (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response()
        }
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn update_schedule(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<UserContext>,
    Path(id): Path<String>,
    Json(body): Json<dto::UpdateScheduleRequest>,
) -> axum::response::Response {
    let schedule_id = match parse_schedule_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    let next_run_date = match body.next_run_date.as_deref() {
        None => None,
        Some(raw) => match parse_date(raw) {
            Ok(date) => Some(date),
            Err(resp) => return resp,
        },
    };

    let update = ScheduleUpdate {
        interval: body.interval,
        next_run_date,
        status: body.status,
        note: body.note,
    };

    match services.recurring.update(user.user_id(), schedule_id, update) {
        Ok(schedule) => (StatusCode::OK, Json(dto::schedule_to_json(&schedule))).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn delete_schedule(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<UserContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let schedule_id = match parse_schedule_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.recurring.delete(user.user_id(), schedule_id) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

/// Manual batch trigger (the daily time trigger calls the same entry point).
pub async fn process_schedules(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    let today = Utc::now().date_naive();
    match services.recurring.process_due(today) {
        Ok(outcome) => (StatusCode::OK, Json(outcome)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}
