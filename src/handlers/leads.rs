// src/handlers/leads.rs
use crate::error::ApiError;
use crate::middleware::rate_limit::write_rate_limit_middleware;
use crate::models::lead::{LeadReceipt, LeadRequest};
use crate::AppState;
use axum::{
    extract::Extension,
    http::StatusCode,
    response::Json,
    routing::post,
    Router,
};
use std::sync::Arc;

pub fn lead_routes() -> Router {
    Router::new()
        .route("/api/leads", post(submit_lead))
        .layer(axum::middleware::from_fn(write_rate_limit_middleware))
}

/// POST /api/leads
async fn submit_lead(
    Extension(state): Extension<Arc<AppState>>,
    Json(payload): Json<LeadRequest>,
) -> Result<(StatusCode, Json<LeadReceipt>), ApiError> {
    let receipt = state.leads.submit(payload).await?;
    Ok((StatusCode::CREATED, Json(receipt)))
}
