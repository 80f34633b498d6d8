//! HTTP request handlers

use super::sse::sse_stream;
use super::types::{
    CheckboxesRequest, CreateSessionResponse, ErrorResponse, OptionRequest, QueuedResponse,
    SuccessResponse, TextRequest,
};
use super::AppState;
use crate::runtime::{ChatEvent, SessionError, SessionSnapshot};
use crate::state_machine::Event;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Session lifecycle
        .route("/api/sessions", post(create_session))
        .route("/api/sessions/:id", get(get_session))
        .route("/api/sessions/:id/stream", get(stream_session))
        .route("/api/sessions/:id/restart", post(restart_session))
        .route("/api/sessions/:id/close", post(close_session))
        // User input
        .route("/api/sessions/:id/text", post(submit_text))
        .route("/api/sessions/:id/option", post(submit_option))
        .route("/api/sessions/:id/checkboxes", post(submit_checkboxes))
        // Version
        .route("/version", get(get_version))
        .with_state(state)
}

// ============================================================
// Session Lifecycle
// ============================================================

async fn create_session(State(state): State<AppState>) -> Json<CreateSessionResponse> {
    let session_id = state.sessions.create_session().await;
    let active = state.sessions.session_count().await;
    tracing::info!(session_id = %session_id, active, "Created session");
    Json(CreateSessionResponse { session_id })
}

async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SessionSnapshot>, AppError> {
    Ok(Json(state.sessions.snapshot(&id).await?))
}

async fn stream_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let (snapshot, broadcast_rx) = state.sessions.subscribe(&id).await?;
    Ok(sse_stream(ChatEvent::Init { snapshot }, broadcast_rx))
}

async fn restart_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<QueuedResponse>, AppError> {
    queue(&state, &id, Event::Start).await
}

async fn close_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SuccessResponse>, AppError> {
    state.sessions.close(&id).await?;
    Ok(Json(SuccessResponse { success: true }))
}

// ============================================================
// User Input
// ============================================================

async fn submit_text(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<TextRequest>,
) -> Result<Json<QueuedResponse>, AppError> {
    queue(&state, &id, Event::text(req.text)).await
}

async fn submit_option(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<OptionRequest>,
) -> Result<Json<QueuedResponse>, AppError> {
    queue(&state, &id, Event::option(req.label)).await
}

async fn submit_checkboxes(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<CheckboxesRequest>,
) -> Result<Json<QueuedResponse>, AppError> {
    queue(&state, &id, Event::checkboxes(req.selected)).await
}

/// Input is processed by the session task; rejections arrive as SSE errors
async fn queue(state: &AppState, id: &str, event: Event) -> Result<Json<QueuedResponse>, AppError> {
    state.sessions.send_event(id, event).await?;
    Ok(Json(QueuedResponse { queued: true }))
}

// ============================================================
// Version
// ============================================================

async fn get_version() -> &'static str {
    concat!("medassist ", env!("CARGO_PKG_VERSION"))
}

// ============================================================
// Error Handling
// ============================================================

#[derive(Debug)]
enum AppError {
    NotFound(String),
    Gone(String),
}

impl From<SessionError> for AppError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::NotFound(_) => AppError::NotFound(err.to_string()),
            SessionError::Closed(_) => AppError::Gone(err.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Gone(msg) => (StatusCode::GONE, msg),
        };

        let body = Json(ErrorResponse::new(message));
        (status, body).into_response()
    }
}
