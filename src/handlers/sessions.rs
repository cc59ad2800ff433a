// src/handlers/sessions.rs
//! Browsing session endpoints. Each session owns one view controller; events
//! are applied under that session's lock and the resulting view is returned.

use crate::error::ApiError;
use crate::middleware::rate_limit::write_rate_limit_middleware;
use crate::models::dashboard::DashboardResponse;
use crate::sessions::SharedController;
use crate::view::{ViewEvent, ViewSnapshot};
use crate::AppState;
use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Serialize)]
pub struct SessionResponse {
    pub success: bool,
    pub session_id: Uuid,
    pub view: ViewSnapshot,
}

#[derive(Serialize)]
pub struct DashboardEnvelope {
    pub success: bool,
    #[serde(flatten)]
    pub dashboard: DashboardResponse,
}

pub fn session_routes() -> Router {
    let create = Router::new()
        .route("/api/sessions", post(create_session))
        .layer(axum::middleware::from_fn(write_rate_limit_middleware));

    Router::new()
        .route("/api/sessions/:id", get(get_session))
        .route("/api/sessions/:id/events", post(apply_event))
        .route("/api/sessions/:id/dashboard", get(get_dashboard))
        .merge(create)
}

/// Looks up a session or fails with 404.
pub async fn find_session(state: &AppState, id: &Uuid) -> Result<SharedController, ApiError> {
    state
        .sessions
        .get(id)
        .await
        .ok_or_else(|| ApiError::NotFound(format!("Session not found: {}", id)))
}

/// POST /api/sessions
async fn create_session(
    Extension(state): Extension<Arc<AppState>>,
) -> (StatusCode, Json<SessionResponse>) {
    let (session_id, controller) = state.sessions.create().await;
    let view = controller.lock().await.snapshot(&state.catalog);
    (
        StatusCode::CREATED,
        Json(SessionResponse {
            success: true,
            session_id,
            view,
        }),
    )
}

/// GET /api/sessions/:id
async fn get_session(
    Extension(state): Extension<Arc<AppState>>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<SessionResponse>, ApiError> {
    let controller = find_session(&state, &session_id).await?;
    let view = controller.lock().await.snapshot(&state.catalog);
    Ok(Json(SessionResponse {
        success: true,
        session_id,
        view,
    }))
}

/// POST /api/sessions/:id/events
async fn apply_event(
    Extension(state): Extension<Arc<AppState>>,
    Path(session_id): Path<Uuid>,
    Json(event): Json<ViewEvent>,
) -> Result<Json<SessionResponse>, ApiError> {
    let controller = find_session(&state, &session_id).await?;
    let mut view = controller.lock().await;
    view.apply(&state.catalog, event).map_err(|e| {
        tracing::info!(session_id = %session_id, error = %e, "view event rejected");
        e
    })?;

    Ok(Json(SessionResponse {
        success: true,
        session_id,
        view: view.snapshot(&state.catalog),
    }))
}

/// GET /api/sessions/:id/dashboard
async fn get_dashboard(
    Extension(state): Extension<Arc<AppState>>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<DashboardEnvelope>, ApiError> {
    let controller = find_session(&state, &session_id).await?;
    let dashboard = controller.lock().await.dashboard(&state.catalog)?;
    Ok(Json(DashboardEnvelope {
        success: true,
        dashboard,
    }))
}
