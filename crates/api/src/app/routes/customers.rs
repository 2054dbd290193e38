use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};

use ledgerly_core::{CurrencyCode, CustomerId};
use ledgerly_customers::{CustomerFields, CustomerUpdate};

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::UserContext;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_customers).post(create_customer))
        .route(
            "/:id",
            get(get_customer).put(update_customer).delete(delete_customer),
        )
}

fn parse_currency(value: Option<String>) -> Result<Option<CurrencyCode>, axum::response::Response> {
    match value {
        None => Ok(None),
        Some(raw) => match CurrencyCode::normalize(&raw) {
            Some(code) => Ok(Some(code)),
            None => Err(errors::json_error(
                StatusCode::BAD_REQUEST,
                "validation_error",
                "currency must be a 3-letter code",
            )),
        },
    }
}

pub async fn create_customer(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<UserContext>,
    Json(body): Json<dto::CustomerRequest>,
) -> axum::response::Response {
    let currency = match parse_currency(body.currency) {
        Ok(c) => c,
        Err(resp) => return resp,
    };

    let fields = CustomerFields {
        name: body.name,
        email: body.email,
        phone: body.phone,
        billing_address: body.billing_address,
        shipping_address: body.shipping_address,
        tax_id: body.tax_id,
        gst_number: body.gst_number,
        payment_terms_days: body.payment_terms_days,
        currency,
    };

    match services.customers.create(user.user_id(), fields) {
        Ok(customer) => {
            (StatusCode::CREATED, Json(dto::customer_to_json(&customer))).into_response()
        }
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn list_customers(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<UserContext>,
    Query(query): Query<dto::ListCustomersQuery>,
) -> axum::response::Response {
    match services
        .customers
        .list(user.user_id(), query.search.as_deref())
    {
        Ok(customers) => {
            let items = customers.iter().map(dto::customer_to_json).collect::<Vec<_>>();
            (StatusCode::OK, Json(serde_json::json!({ "customers": items }))).into_response()
        }
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn get_customer(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<UserContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let customer_id: CustomerId = match id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid customer id");
        }
    };

    match services.customers.get(user.user_id(), customer_id) {
        Ok(customer) => (StatusCode::OK, Json(dto::customer_to_json(&customer))).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn update_customer(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<UserContext>,
    Path(id): Path<String>,
    Json(body): Json<dto::CustomerUpdateRequest>,
) -> axum::response::Response {
    let customer_id: CustomerId = match id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid customer id");
        }
    };

    let currency = match parse_currency(body.currency) {
        Ok(c) => c,
        Err(resp) => return resp,
    };

    let update = CustomerUpdate {
        name: body.name,
        email: body.email,
        phone: body.phone,
        billing_address: body.billing_address,
        shipping_address: body.shipping_address,
        tax_id: body.tax_id,
        gst_number: body.gst_number,
        payment_terms_days: body.payment_terms_days,
        currency,
    };

    match services.customers.update(user.user_id(), customer_id, update) {
        Ok(customer) => (StatusCode::OK, Json(dto::customer_to_json(&customer))).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn delete_customer(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<UserContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let customer_id: CustomerId = match id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid customer id");
        }
    };

    match services.customers.delete(user.user_id(), customer_id) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}
