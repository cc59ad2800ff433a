use crate::error::ApiError;
use crate::AppState;
use axum::{
    extract::{Extension, Request},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

/// Pulls the token out of an `Authorization: Bearer <token>` header.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, ApiError> {
    let auth_header = headers
        .get(AUTHORIZATION)
        .ok_or_else(|| ApiError::Unauthorized("Missing Authorization header".to_string()))?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| ApiError::Unauthorized("Invalid Authorization header format".to_string()))?;

    auth_str
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| {
            ApiError::Unauthorized("Invalid Authorization header format. Expected 'Bearer <token>'".to_string())
        })
}

/// Verifies the bearer token and stores the signed-in `User` in the request
/// extensions for the handler.
pub async fn auth_middleware(
    Extension(state): Extension<Arc<AppState>>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = bearer_token(&headers)?;
    let user = state.auth.verify_token(token).map_err(|e| {
        tracing::warn!(error = %e, "JWT verification failed");
        ApiError::from(e)
    })?;

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}
