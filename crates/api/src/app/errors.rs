use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use ledgerly_core::DomainError;
use ledgerly_infra::services::ServiceError;
use ledgerly_invoicing::InvoiceStatus;

pub fn service_error_to_response(err: ServiceError) -> axum::response::Response {
    match err {
        ServiceError::Domain(DomainError::Validation(msg)) => {
            json_error(StatusCode::BAD_REQUEST, "validation_error", msg)
        }
        ServiceError::Domain(DomainError::InvalidId(msg)) => {
            json_error(StatusCode::BAD_REQUEST, "invalid_id", msg)
        }
        ServiceError::Domain(DomainError::NotFound) => {
            json_error(StatusCode::NOT_FOUND, "not_found", "not found")
        }
        ServiceError::Domain(DomainError::AccessDenied) => {
            json_error(StatusCode::FORBIDDEN, "access_denied", "access denied")
        }
        ServiceError::Domain(DomainError::Conflict(msg)) => {
            json_error(StatusCode::CONFLICT, "conflict", msg)
        }
        ServiceError::Upstream(msg) => json_error(StatusCode::BAD_GATEWAY, "upstream_error", msg),
        ServiceError::Storage(msg) => {
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "storage_error", msg)
        }
    }
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

pub fn parse_invoice_status(s: &str) -> Result<InvoiceStatus, axum::response::Response> {
    match s.to_lowercase().as_str() {
        "draft" => Ok(InvoiceStatus::Draft),
        "due" => Ok(InvoiceStatus::Due),
        "unpaid" => Ok(InvoiceStatus::Unpaid),
        "paid" => Ok(InvoiceStatus::Paid),
        "void" => Ok(InvoiceStatus::Void),
        "sent" => Ok(InvoiceStatus::Sent),
        "overdue" => Ok(InvoiceStatus::Overdue),
        _ => Err(json_error(
            StatusCode::BAD_REQUEST,
            "invalid_status",
            "status must be one of: draft, due, unpaid, paid, void, sent, overdue",
        )),
    }
}
