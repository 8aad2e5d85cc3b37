//! API Models
//!
//! Request and response bodies for the interview endpoints, annotated for
//! OpenAPI generation with `utoipa`.

use chrono::{DateTime, Utc};
use interview_core::{Greeting, QuestionSource, Reply, Turn};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Origin of a follow-up question, as reported to clients.
#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, Copy, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum AnswerSource {
    Generated,
    Fallback,
}

impl From<QuestionSource> for AnswerSource {
    fn from(source: QuestionSource) -> Self {
        match source {
            QuestionSource::Generated => AnswerSource::Generated,
            QuestionSource::Fallback => AnswerSource::Fallback,
        }
    }
}

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone)]
pub struct StatusResponse {
    #[schema(example = "interview-api")]
    pub service: String,
    pub version: String,
    #[schema(example = "gemini")]
    pub provider: String,
    pub generation_available: bool,
}

#[derive(Deserialize, ToSchema, Debug)]
pub struct GreetingRequest {
    /// Session to greet. Omitted or `"default"` starts a new session.
    #[schema(example = "session_4f1c2b")]
    pub session: Option<String>,
}

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone)]
pub struct GreetingResponse {
    pub text: String,
    pub session_id: String,
}

impl From<Greeting> for GreetingResponse {
    fn from(greeting: Greeting) -> Self {
        Self {
            text: greeting.text,
            session_id: greeting.session_id,
        }
    }
}

#[derive(Deserialize, ToSchema, Debug)]
pub struct AnswerRequest {
    #[schema(example = "session_4f1c2b")]
    pub session_id: String,
    #[schema(example = "I spent three years building payment systems.")]
    pub text: String,
}

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone)]
pub struct AnswerResponse {
    pub text: String,
    pub source: AnswerSource,
    pub session_id: String,
}

impl From<Reply> for AnswerResponse {
    fn from(reply: Reply) -> Self {
        Self {
            text: reply.text,
            source: reply.source.into(),
            session_id: reply.session_id,
        }
    }
}

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone)]
pub struct ShouldGreetResponse {
    pub session_id: String,
    pub should_greet: bool,
}

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone)]
pub struct Message {
    #[schema(example = "assistant")]
    pub role: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl From<Turn> for Message {
    fn from(turn: Turn) -> Self {
        Self {
            role: turn.role.to_string(),
            content: turn.content,
            created_at: turn.timestamp,
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct ErrorResponse {
    pub message: String,
}
