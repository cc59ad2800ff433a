// src/handlers/status.rs
use crate::AppState;
use axum::{extract::Extension, response::Json};
use serde_json::{json, Value};
use std::sync::Arc;

/// GET /api/status
pub async fn api_status(Extension(state): Extension<Arc<AppState>>) -> Json<Value> {
    let assistant_mode = if state.assistant.is_live() { "live" } else { "demo" };
    Json(json!({
        "success": true,
        "service": "homeward_plots",
        "version": env!("CARGO_PKG_VERSION"),
        "assistant": {
            "mode": assistant_mode,
            "model": state.assistant.model(),
        },
        "listings": state.catalog.all().len(),
        "active_sessions": state.sessions.len().await,
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}
