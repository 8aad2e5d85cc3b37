use std::time::Duration;

/// Reasons a follow-up question could not be generated.
///
/// These never leave the question generator; callers only see
/// [`Generated::Unavailable`](crate::generator::Generated::Unavailable).
/// They exist so that every failure is logged with its cause.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GenerationError {
    #[error("question generation is disabled")]
    Disabled,
    #[error("generative service timed out after {0:?}")]
    Timeout(Duration),
    #[error("generative service error: {0}")]
    Service(String),
    #[error("generative service returned an empty response")]
    Empty,
    #[error("generated question rejected: {0}")]
    Invalid(String),
    #[error("generation worker failed: {0}")]
    WorkerLost(String),
}

/// Errors raised while building a fallback question list.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FallbackError {
    #[error("fallback question list must not be empty")]
    Empty,
}
