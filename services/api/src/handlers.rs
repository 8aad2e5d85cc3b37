//! Axum Handlers for the REST API
//!
//! Thin wrappers that validate the session id and hand each request to the
//! interview orchestrator. The orchestrator itself never fails, so the only
//! errors produced here are malformed requests.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use chrono::Utc;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::{
    models::{
        AnswerRequest, AnswerResponse, ErrorResponse, GreetingRequest, GreetingResponse, Message,
        ShouldGreetResponse, StatusResponse,
    },
    state::AppState,
};

/// Placeholder clients send when they have no session yet.
const DEFAULT_SESSION: &str = "default";

pub enum ApiError {
    BadRequest(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::BadRequest(message) => {
                (StatusCode::BAD_REQUEST, Json(ErrorResponse { message })).into_response()
            }
        }
    }
}

fn require_session_id(raw: &str) -> Result<&str, ApiError> {
    let id = raw.trim();
    if id.is_empty() {
        return Err(ApiError::BadRequest("session_id must not be blank".to_string()));
    }
    Ok(id)
}

/// A new, process-unique session id.
pub fn fresh_session_id() -> String {
    format!("session_{}_{}", Uuid::new_v4().simple(), Utc::now().timestamp())
}

/// Report service status and whether question generation is configured.
#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Service status", body = StatusResponse)
    )
)]
pub async fn status(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    Json(StatusResponse {
        service: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        provider: state.config.provider.as_str().to_string(),
        generation_available: state.orchestrator.generation_available(),
    })
}

/// Greet a session, starting a new one if none is given.
#[utoipa::path(
    post,
    path = "/api/auto-greeting",
    request_body = GreetingRequest,
    responses(
        (status = 200, description = "Welcome message for the session", body = GreetingResponse)
    )
)]
pub async fn auto_greeting(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<GreetingRequest>,
) -> Json<GreetingResponse> {
    let session_id = match payload.session.as_deref().map(str::trim) {
        Some(id) if !id.is_empty() && id != DEFAULT_SESSION => id.to_string(),
        _ => fresh_session_id(),
    };

    let greeting = state.orchestrator.greet(&session_id).await;
    info!(session_id = %greeting.session_id, "Auto-greeting sent");
    Json(greeting.into())
}

/// Record the candidate's answer and return the next interview question.
#[utoipa::path(
    post,
    path = "/api/answer",
    request_body = AnswerRequest,
    responses(
        (status = 200, description = "Next interview question", body = AnswerResponse),
        (status = 400, description = "Bad request", body = ErrorResponse)
    )
)]
pub async fn answer(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<AnswerRequest>,
) -> Result<Json<AnswerResponse>, ApiError> {
    let session_id = require_session_id(&payload.session_id)?;
    let reply = state.orchestrator.answer(session_id, &payload.text).await;
    Ok(Json(reply.into()))
}

/// Check whether a session still needs its welcome message.
#[utoipa::path(
    get,
    path = "/api/sessions/{id}/should-greet",
    responses(
        (status = 200, description = "Greeting status", body = ShouldGreetResponse),
        (status = 400, description = "Bad request", body = ErrorResponse)
    ),
    params(
        ("id" = String, Path, description = "Session ID")
    )
)]
pub async fn should_greet(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ShouldGreetResponse>, ApiError> {
    let session_id = require_session_id(&id)?;
    let should_greet = state.orchestrator.should_greet(session_id).await;
    Ok(Json(ShouldGreetResponse {
        session_id: session_id.to_string(),
        should_greet,
    }))
}

/// Get the recorded conversation for a session. Unknown sessions are empty.
#[utoipa::path(
    get,
    path = "/api/sessions/{id}/history",
    responses(
        (status = 200, description = "Conversation history", body = [Message]),
        (status = 400, description = "Bad request", body = ErrorResponse)
    ),
    params(
        ("id" = String, Path, description = "Session ID")
    )
)]
pub async fn history(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Vec<Message>>, ApiError> {
    let session_id = require_session_id(&id)?;
    let history = state.orchestrator.history(session_id).await;
    Ok(Json(history.into_iter().map(Message::from).collect()))
}

/// Discard all state for a session so its id can start over.
#[utoipa::path(
    post,
    path = "/api/sessions/{id}/reset",
    responses(
        (status = 204, description = "Session reset"),
        (status = 400, description = "Bad request", body = ErrorResponse)
    ),
    params(
        ("id" = String, Path, description = "Session ID")
    )
)]
pub async fn reset(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let session_id = require_session_id(&id)?;
    state.orchestrator.reset(session_id).await;
    Ok(StatusCode::NO_CONTENT)
}
