// src/handlers/assistant.rs
//! Chat and investment-report endpoints. The session lock is released while
//! the assistant is working, so the same visitor can keep browsing. The call
//! and its completion run on a spawned task that outlives the request.

use crate::error::ApiError;
use crate::handlers::sessions::find_session;
use crate::models::chat::{AssistantReply, ChatRequest, ChatTurn};
use crate::AppState;
use axum::{
    extract::{Extension, Path},
    response::Json,
    routing::post,
    Router,
};
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Serialize)]
pub struct ChatResponse {
    pub success: bool,
    pub reply: AssistantReply,
    /// False when the visitor switched property before the reply arrived.
    pub appended: bool,
    pub transcript: Vec<ChatTurn>,
}

#[derive(Serialize)]
pub struct ReportResponse {
    pub success: bool,
    pub property_id: String,
    pub report: AssistantReply,
    pub stored: bool,
}

pub fn assistant_routes() -> Router {
    Router::new()
        .route("/api/sessions/:id/chat", post(send_chat))
        .route("/api/sessions/:id/report", post(generate_report))
}

/// POST /api/sessions/:id/chat
async fn send_chat(
    Extension(state): Extension<Arc<AppState>>,
    Path(session_id): Path<Uuid>,
    Json(payload): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    let controller = find_session(&state, &session_id).await?;

    let ticket = controller.lock().await.begin_chat(&payload.message)?;

    // Detached so the track always returns to Idle, even if the client hangs up.
    let task = tokio::spawn(async move {
        let reply = state
            .assistant
            .ask_about_property(&ticket.property, &ticket.question, &ticket.prior_turns)
            .await;

        let mut view = controller.lock().await;
        let appended = view.complete_chat(ticket.generation, reply.clone());

        tracing::info!(
            session_id = %session_id,
            property_id = %ticket.property.id,
            outcome = ?reply.outcome,
            appended,
            "chat reply ready"
        );

        ChatResponse {
            success: true,
            reply,
            appended,
            transcript: view.chat_turns().to_vec(),
        }
    });

    let response = task
        .await
        .map_err(|e| ApiError::Internal(format!("chat task failed: {}", e)))?;
    Ok(Json(response))
}

/// POST /api/sessions/:id/report
async fn generate_report(
    Extension(state): Extension<Arc<AppState>>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<ReportResponse>, ApiError> {
    let controller = find_session(&state, &session_id).await?;

    let ticket = controller.lock().await.begin_report()?;

    let task = tokio::spawn(async move {
        let report = state.assistant.generate_investment_report(&ticket.property).await;

        let stored = controller
            .lock()
            .await
            .complete_report(ticket.generation, report.clone());

        tracing::info!(
            session_id = %session_id,
            property_id = %ticket.property.id,
            outcome = ?report.outcome,
            stored,
            "investment report ready"
        );

        ReportResponse {
            success: true,
            property_id: ticket.property.id,
            report,
            stored,
        }
    });

    let response = task
        .await
        .map_err(|e| ApiError::Internal(format!("report task failed: {}", e)))?;
    Ok(Json(response))
}
