//! HTTP request handlers

use super::types::{ChatRequest, ChatResponse, ChatTurn, ErrorResponse, ProviderErrorResponse};
use super::ProxyState;
use crate::llm::{GenerateRequest, LlmErrorKind, LlmService, PROXY_ERROR_HEADER};
use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use std::time::Instant;

/// Create the API router
pub fn create_router(state: ProxyState) -> Router {
    Router::new()
        .route("/", get(home))
        .route("/version", get(get_version))
        // Provider passthrough used by the chat client
        .route("/api/generate", post(generate))
        // Simple sender/text form
        .route("/api/chat", post(chat))
        .with_state(state)
}

async fn home() -> &'static str {
    "Muse proxy is running! POST to /api/generate or /api/chat."
}

async fn get_version() -> &'static str {
    concat!("muse ", env!("CARGO_PKG_VERSION"))
}

// ============================================================
// Provider Passthrough
// ============================================================

async fn generate(State(state): State<ProxyState>, body: Bytes) -> Result<Response, GenerateError> {
    let request: GenerateRequest = serde_json::from_slice(&body)
        .map_err(|e| GenerateError::BadRequest(format!("Invalid request body: {e}")))?;
    if request.contents.is_empty() {
        return Err(GenerateError::BadRequest(
            "Request must contain at least one turn".to_string(),
        ));
    }

    let turns = request.contents.len();
    let start = Instant::now();
    let result = state.gemini.forward(&request).await;
    let duration = start.elapsed();

    let reply = result.map_err(|e| {
        tracing::error!(turns, duration_ms = %duration.as_millis(), error = %e, kind = ?e.kind, "Upstream request failed");
        match e.kind {
            LlmErrorKind::Auth => GenerateError::Misconfigured(e.message),
            _ => GenerateError::Upstream(e.message),
        }
    })?;

    if reply.status.is_success() {
        tracing::info!(turns, duration_ms = %duration.as_millis(), status = %reply.status, "Forwarded generate request");
    } else {
        tracing::warn!(turns, duration_ms = %duration.as_millis(), status = %reply.status, "Provider returned an error status");
    }
    Ok((reply.status, Json(reply.body)).into_response())
}

// ============================================================
// Simple Chat
// ============================================================

async fn chat(
    State(state): State<ProxyState>,
    body: Bytes,
) -> Result<Json<ChatResponse>, AppError> {
    let request: ChatRequest = serde_json::from_slice(&body)
        .map_err(|_| AppError::BadRequest(NO_MESSAGES.to_string()))?;
    let messages = request
        .messages
        .filter(|m| !m.is_empty())
        .ok_or_else(|| AppError::BadRequest(NO_MESSAGES.to_string()))?;

    let request = GenerateRequest {
        contents: messages.iter().map(ChatTurn::to_content).collect(),
        generation_config: Default::default(),
    };

    let response = state
        .llm
        .generate(&request)
        .await
        .map_err(|e| AppError::Internal(e.message))?;

    if let Some(text) = response.first_text() {
        return Ok(Json(ChatResponse {
            reply: text.to_string(),
        }));
    }

    let message = response.error.map_or_else(
        || "No text in model response".to_string(),
        |e| e.message,
    );
    tracing::warn!(error = %message, "Chat request produced no reply");
    Err(AppError::Internal(message))
}

const NO_MESSAGES: &str = "No messages provided or invalid format";

// ============================================================
// Error Handling
// ============================================================

/// Errors for the simple endpoints, rendered as `{"error": "..."}`
#[derive(Debug)]
enum AppError {
    BadRequest(String),
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = Json(ErrorResponse::new(message));
        (status, body).into_response()
    }
}

/// Errors for the passthrough, rendered in the provider's own error shape and
/// tagged with `PROXY_ERROR_HEADER` so clients can tell them from provider errors
#[derive(Debug)]
enum GenerateError {
    BadRequest(String),
    /// No credential configured on the proxy
    Misconfigured(String),
    /// The provider could not be reached
    Upstream(String),
}

impl IntoResponse for GenerateError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            GenerateError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            GenerateError::Misconfigured(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
            GenerateError::Upstream(msg) => (StatusCode::BAD_GATEWAY, msg),
        };

        let body = Json(ProviderErrorResponse::new(message));
        (status, [(PROXY_ERROR_HEADER, "1")], body).into_response()
    }
}
