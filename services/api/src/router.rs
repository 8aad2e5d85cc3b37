//! Axum Router Configuration
//!
//! This module defines the complete HTTP routing for the application,
//! including the interview API and OpenAPI documentation.

use crate::{
    handlers,
    models::{
        AnswerRequest, AnswerResponse, AnswerSource, ErrorResponse, GreetingRequest,
        GreetingResponse, Message, ShouldGreetResponse, StatusResponse,
    },
    state::AppState,
};

use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::status,
        handlers::auto_greeting,
        handlers::answer,
        handlers::should_greet,
        handlers::history,
        handlers::reset,
    ),
    components(
        schemas(
            StatusResponse, GreetingRequest, GreetingResponse, AnswerRequest, AnswerResponse,
            AnswerSource, ShouldGreetResponse, Message, ErrorResponse
        )
    ),
    tags(
        (name = "Interview API", description = "Mock interview sessions with generated and fallback questions")
    )
)]
pub struct ApiDoc;

/// Creates the main Axum router for the application.
pub fn create_router(app_state: Arc<AppState>) -> Router {
    let api_router = Router::new()
        .route("/", get(handlers::status))
        .route("/api/auto-greeting", post(handlers::auto_greeting))
        .route("/api/answer", post(handlers::answer))
        .route(
            "/api/sessions/{id}/should-greet",
            get(handlers::should_greet),
        )
        .route("/api/sessions/{id}/history", get(handlers::history))
        .route("/api/sessions/{id}/reset", post(handlers::reset))
        .with_state(app_state);

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(api_router)
}
