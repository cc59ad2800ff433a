// src/handlers/auth.rs
use crate::error::ApiError;
use crate::handlers::sessions::find_session;
use crate::middleware::auth::auth_middleware;
use crate::middleware::rate_limit::otp_rate_limit_middleware;
use crate::models::auth::{AuthResponse, OtpChallengeResponse, OtpRequest, User, VerifyOtpRequest};
use crate::view::{ViewError, ViewEvent};
use crate::AppState;
use axum::{
    extract::Extension,
    response::Json,
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;

pub fn auth_routes() -> Router {
    let otp = Router::new()
        .route("/api/auth/otp", post(request_otp))
        .route("/api/auth/verify", post(verify_otp))
        .layer(axum::middleware::from_fn(otp_rate_limit_middleware));

    let protected = Router::new()
        .route("/api/auth/me", get(me))
        .layer(axum::middleware::from_fn(auth_middleware));

    otp.merge(protected)
}

/// POST /api/auth/otp
async fn request_otp(
    Extension(state): Extension<Arc<AppState>>,
    Json(payload): Json<OtpRequest>,
) -> Result<Json<OtpChallengeResponse>, ApiError> {
    let challenge = state.auth.request_otp(&payload.phone).await?;

    Ok(Json(OtpChallengeResponse {
        success: true,
        message: format!("Verification code sent to {}", challenge.destination),
        destination: challenge.destination,
        expires_at: challenge.expires_at,
    }))
}

/// POST /api/auth/verify
///
/// When `session_id` names a browsing session that is waiting on the
/// dashboard login, that session is signed in too.
async fn verify_otp(
    Extension(state): Extension<Arc<AppState>>,
    Json(payload): Json<VerifyOtpRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    // Resolve the session first so an unknown id does not burn the code.
    let controller = match payload.session_id {
        Some(id) => Some((id, find_session(&state, &id).await?)),
        None => None,
    };

    let (user, token) = state
        .auth
        .verify_otp(&payload.phone, &payload.code, payload.name.as_deref())
        .await?;

    let mut signed_in_session = None;
    if let Some((id, controller)) = controller {
        let event = ViewEvent::LoginSucceeded { user: user.clone() };
        match controller.lock().await.apply(&state.catalog, event) {
            Ok(()) => signed_in_session = Some(id),
            Err(ViewError::LoginNotExpected) => {
                tracing::info!(session_id = %id, "session was not waiting for login, token issued only");
            }
            Err(e) => return Err(e.into()),
        }
    }

    Ok(Json(AuthResponse {
        success: true,
        message: "Phone number verified".to_string(),
        user,
        token,
        session_id: signed_in_session,
    }))
}

/// GET /api/auth/me
async fn me(Extension(user): Extension<User>) -> Json<Value> {
    Json(json!({
        "success": true,
        "user": user,
    }))
}
