use std::str::FromStr;

use axum::{
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};

use ledgerly_core::UserId;

use crate::context::UserContext;

/// Header carrying the upstream-resolved user identity.
const USER_ID_HEADER: &str = "x-user-id";

/// Attach the [`UserContext`] extension or reject the request.
pub async fn user_context_middleware(
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Result<Response, StatusCode> {
    let user_id = extract_user_id(req.headers())?;
    req.extensions_mut().insert(UserContext::new(user_id));
    Ok(next.run(req).await)
}

fn extract_user_id(headers: &HeaderMap) -> Result<UserId, StatusCode> {
    let header = headers
        .get(USER_ID_HEADER)
        .ok_or(StatusCode::UNAUTHORIZED)?;

    let value = header.to_str().map_err(|_| StatusCode::UNAUTHORIZED)?;

    UserId::from_str(value.trim()).map_err(|_| StatusCode::UNAUTHORIZED)
}
