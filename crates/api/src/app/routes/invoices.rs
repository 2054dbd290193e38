use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use chrono::Utc;

use ledgerly_core::{CurrencyCode, CustomerId, InvoiceId};
use ledgerly_infra::services::InvoiceFields;
use ledgerly_invoicing::{InvoiceStatus, LineItemInput};

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::UserContext;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_invoices).post(create_invoice))
        .route(
            "/:id",
            get(get_invoice).put(update_invoice).delete(delete_invoice),
        )
        .route("/:id/status", post(update_invoice_status))
        .route("/:id/payments", get(list_invoice_payments).post(record_invoice_payment))
        .route("/:id/send", post(send_invoice))
}

fn parse_invoice_id(id: &str) -> Result<InvoiceId, axum::response::Response> {
    id.parse().map_err(|_| {
        errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid invoice id")
    })
}

fn parse_fields(
    invoice_number: String,
    issue_date: Option<String>,
    due_date: Option<String>,
    currency: &str,
    tax_cents: Option<i64>,
    discount_cents: Option<i64>,
    note: Option<String>,
) -> Result<InvoiceFields, axum::response::Response> {
    let currency = CurrencyCode::normalize(currency).ok_or_else(|| {
        errors::json_error(
            StatusCode::BAD_REQUEST,
            "validation_error",
            "currency must be a 3-letter code",
        )
    })?;

    Ok(InvoiceFields {
        invoice_number,
        issue_date,
        due_date,
        currency,
        tax_cents: tax_cents.unwrap_or(0),
        discount_cents: discount_cents.unwrap_or(0),
        note,
    })
}

fn to_line_items(items: Vec<dto::LineItemRequest>) -> Vec<LineItemInput> {
    items
        .into_iter()
        .map(|item| LineItemInput {
            description: item.description,
            quantity: item.quantity,
            unit_price_cents: item.unit_price_cents,
        })
        .collect()
}

pub async fn create_invoice(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<UserContext>,
    Json(body): Json<dto::CreateInvoiceRequest>,
) -> axum::response::Response {
    let customer_id: CustomerId = match body.customer_id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid customer id");
        }
    };

    let fields = match parse_fields(
        body.invoice_number,
        body.issue_date,
        body.due_date,
        &body.currency,
        body.tax_cents,
        body.discount_cents,
        body.note,
    ) {
        Ok(f) => f,
        Err(resp) => return resp,
    };

    match services.invoices.create(
        user.user_id(),
        customer_id,
        fields,
        to_line_items(body.line_items),
    ) {
        Ok(id) => (
            StatusCode::CREATED,
            Json(serde_json::json!({ "id": id.to_string() })),
        )
            .into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn list_invoices(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<UserContext>,
    Query(query): Query<dto::ListInvoicesQuery>,
) -> axum::response::Response {
    let status: Option<InvoiceStatus> = match query.status.as_deref() {
        None => None,
        Some(raw) => match errors::parse_invoice_status(raw) {
            Ok(status) => Some(status),
            Err(resp) => return resp,
        },
    };

    let customer_id: Option<CustomerId> = match query.customer_id.as_deref() {
        None => None,
        Some(raw) => match raw.parse() {
            Ok(id) => Some(id),
            Err(_) => {
                return errors::json_error(
                    StatusCode::BAD_REQUEST,
                    "invalid_id",
                    "invalid customer id",
                );
            }
        },
    };

    // Cursor/limit switch to the paginated read; the plain listing stays a
    // bounded most-recent scan for dashboards.
    if query.cursor.is_some() || query.limit.is_some() {
        match services.invoices.list_paged(
            user.user_id(),
            status,
            customer_id,
            query.cursor.as_deref(),
            query.limit,
        ) {
            Ok(page) => (StatusCode::OK, Json(dto::invoice_page_to_json(&page))).into_response(),
            Err(e) => errors::service_error_to_response(e),
        }
    } else {
        match services.invoices.list(user.user_id(), status, customer_id) {
            Ok(invoices) => {
                let items = invoices.iter().map(dto::invoice_to_json).collect::<Vec<_>>();
                (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response()
            }
            Err(e) => errors::service_error_to_response(e),
        }
    }
}

pub async fn get_invoice(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<UserContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let invoice_id = match parse_invoice_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.invoices.get(user.user_id(), invoice_id) {
        Ok(read) => (StatusCode::OK, Json(dto::invoice_with_lines_to_json(&read))).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn update_invoice(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<UserContext>,
    Path(id): Path<String>,
    Json(body): Json<dto::CreateInvoiceRequest>,
) -> axum::response::Response {
    let invoice_id = match parse_invoice_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    let customer_id: CustomerId = match body.customer_id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid customer id");
        }
    };

    let fields = match parse_fields(
        body.invoice_number,
        body.issue_date,
        body.due_date,
        &body.currency,
        body.tax_cents,
        body.discount_cents,
        body.note,
    ) {
        Ok(f) => f,
        Err(resp) => return resp,
    };

    match services.invoices.update(
        user.user_id(),
        invoice_id,
        customer_id,
        fields,
        to_line_items(body.line_items),
    ) {
        Ok(()) => (
            StatusCode::OK,
            Json(serde_json::json!({ "id": invoice_id.to_string() })),
        )
            .into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn delete_invoice(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<UserContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let invoice_id = match parse_invoice_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.invoices.delete(user.user_id(), invoice_id) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn update_invoice_status(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<UserContext>,
    Path(id): Path<String>,
    Json(body): Json<dto::UpdateStatusRequest>,
) -> axum::response::Response {
    let invoice_id = match parse_invoice_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    let status = match errors::parse_invoice_status(&body.status) {
        Ok(status) => status,
        Err(resp) => return resp,
    };

    match services.invoices.update_status(user.user_id(), invoice_id, status) {
        Ok(()) => (
            StatusCode::OK,
            Json(serde_json::json!({ "id": invoice_id.to_string(), "status": status })),
        )
            .into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn send_invoice(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<UserContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let invoice_id = match parse_invoice_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.invoices.mark_sent(user.user_id(), invoice_id) {
        Ok(()) => (
            StatusCode::OK,
            Json(serde_json::json!({ "id": invoice_id.to_string() })),
        )
            .into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn record_invoice_payment(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<UserContext>,
    Path(id): Path<String>,
    Json(body): Json<dto::RecordPaymentRequest>,
) -> axum::response::Response {
    let invoice_id = match parse_invoice_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    let paid_at = body.paid_at.unwrap_or_else(|| Utc::now().to_rfc3339());

    match services.invoices.record_payment(
        user.user_id(),
        invoice_id,
        body.amount_cents,
        paid_at,
        body.method,
        body.reference,
    ) {
        Ok(payment) => {
            (StatusCode::CREATED, Json(dto::payment_to_json(&payment))).into_response()
        }
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn list_invoice_payments(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<UserContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let invoice_id = match parse_invoice_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.invoices.payments_for_invoice(user.user_id(), invoice_id) {
        Ok(payments) => {
            let items = payments.iter().map(dto::payment_to_json).collect::<Vec<_>>();
            (StatusCode::OK, Json(serde_json::json!({ "payments": items }))).into_response()
        }
        Err(e) => errors::service_error_to_response(e),
    }
}
