use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::UserContext;

pub fn router() -> Router {
    Router::new()
        .route("/invoice", post(invoice_from_chat))
        .route("/chat", post(chat))
        .route("/chat/:conversation_id", get(chat_history))
}

pub async fn invoice_from_chat(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<UserContext>,
    Json(body): Json<dto::ChatRequest>,
) -> axum::response::Response {
    if body.message.trim().is_empty() {
        return errors::json_error(
            StatusCode::BAD_REQUEST,
            "validation_error",
            "message must not be empty",
        );
    }

    match services
        .assistant
        .invoice_from_chat(user.user_id(), &body.message, body.conversation_id)
    {
        Ok(reply) => (StatusCode::OK, Json(reply)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn chat(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<UserContext>,
    Json(body): Json<dto::ChatRequest>,
) -> axum::response::Response {
    if body.message.trim().is_empty() {
        return errors::json_error(
            StatusCode::BAD_REQUEST,
            "validation_error",
            "message must not be empty",
        );
    }

    match services
        .assistant
        .chat(user.user_id(), &body.message, body.conversation_id)
    {
        Ok(reply) => (StatusCode::OK, Json(reply)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn chat_history(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<UserContext>,
    Path(conversation_id): Path<String>,
) -> axum::response::Response {
    match services.assistant.history(user.user_id(), &conversation_id) {
        Ok(messages) => {
            let items = messages
                .iter()
                .enumerate()
                .map(|(index, message)| {
                    serde_json::json!({
                        "id": format!("{conversation_id}-{index}"),
                        "role": message.role,
                        "content": message.content,
                    })
                })
                .collect::<Vec<_>>();
            (
                StatusCode::OK,
                Json(serde_json::json!({
                    "conversationId": conversation_id,
                    "messages": items,
                })),
            )
                .into_response()
        }
        Err(e) => errors::service_error_to_response(e),
    }
}
