//! Conversation Orchestrator
//!
//! Drives one interview turn at a time: greets new sessions, records every
//! answer, and picks the next question from the generative service or, when
//! that is unavailable, from the fallback sequence.
//!
//! Per session the flow is `Uninitialized -> Greeted -> InProgress ->
//! Exhausted`. `Exhausted` only means the fallback list has run out. The
//! session keeps working and keeps receiving the closing message. A reset
//! takes any session back to `Uninitialized`.

use crate::fallback::{FallbackProvider, FallbackQuestions};
use crate::generator::{Generated, QuestionGenerator};
use crate::session::{Role, SessionStore, Turn};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::time::Instant;
use tracing::{info, instrument};

pub const DEFAULT_WELCOME_MESSAGE: &str = "Welcome to your AI mock interview! I'm excited to learn more about you. Let's begin with a simple introduction.";

/// Where a follow-up question came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionSource {
    Generated,
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Greeting {
    pub text: String,
    pub session_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reply {
    pub text: String,
    pub source: QuestionSource,
    pub session_id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterviewPhase {
    Uninitialized,
    Greeted,
    InProgress,
    Exhausted,
}

pub struct InterviewOrchestrator {
    store: Arc<SessionStore>,
    generator: QuestionGenerator,
    fallback: FallbackProvider,
    welcome_message: String,
}

impl InterviewOrchestrator {
    pub fn new(
        store: Arc<SessionStore>,
        generator: QuestionGenerator,
        fallback: FallbackQuestions,
    ) -> Self {
        Self {
            fallback: FallbackProvider::new(fallback, store.clone()),
            store,
            generator,
            welcome_message: DEFAULT_WELCOME_MESSAGE.to_string(),
        }
    }

    pub fn with_welcome_message(mut self, message: impl Into<String>) -> Self {
        self.welcome_message = message.into();
        self
    }

    pub fn store(&self) -> &Arc<SessionStore> {
        &self.store
    }

    pub fn fallback(&self) -> &FallbackProvider {
        &self.fallback
    }

    pub fn generation_available(&self) -> bool {
        self.generator.is_available()
    }

    pub async fn should_greet(&self, session_id: &str) -> bool {
        self.store.should_greet(session_id).await
    }

    /// Greets a session that has not been greeted yet.
    ///
    /// The welcome message is recorded as an assistant turn. An already
    /// greeted session is left untouched and gets back the last thing the
    /// interviewer said. The generative service is never consulted here.
    #[instrument(skip_all, fields(session_id = %session_id))]
    pub async fn greet(&self, session_id: &str) -> Greeting {
        let handle = self.store.get_or_init(session_id).await;
        let mut session = handle.lock().await;

        let text = if session.has_greeted() {
            session
                .last_assistant_turn()
                .map(|t| t.content.clone())
                .unwrap_or_else(|| self.welcome_message.clone())
        } else {
            session.mark_greeted();
            session.push(Role::Assistant, self.welcome_message.clone());
            info!("Greeting sent");
            self.welcome_message.clone()
        };

        Greeting {
            text,
            session_id: session_id.to_string(),
        }
    }

    /// Records the candidate's answer and returns the next question.
    ///
    /// Always yields a question, within the generator's timeout. Turns on one
    /// session are taken one after another in arrival order, so each question
    /// directly follows the answer it responds to. Time spent waiting for an
    /// earlier turn comes out of this turn's generation budget. The session
    /// state is not locked while a question is being generated.
    #[instrument(skip_all, fields(session_id = %session_id))]
    pub async fn answer(&self, session_id: &str, answer: &str) -> Reply {
        let started = Instant::now();
        let handle = self.store.get_or_init(session_id).await;
        let _turn = handle.begin_turn().await;

        let history = {
            let mut session = handle.lock().await;
            session.push(Role::User, answer);
            session.messages().to_vec()
        };

        let budget = self
            .generator
            .config()
            .timeout
            .saturating_sub(started.elapsed());
        let generated = self
            .generator
            .generate_within(&history, answer, budget)
            .await;

        let mut session = handle.lock().await;
        let (text, source) = match generated {
            Generated::Question(question) => (question, QuestionSource::Generated),
            Generated::Unavailable => {
                let question = self.fallback.questions().next(&mut session);
                info!(
                    cursor = session.fallback_cursor(),
                    "Using fallback question"
                );
                (question, QuestionSource::Fallback)
            }
        };

        session.push(Role::Assistant, text.clone());
        Reply {
            text,
            source,
            session_id: session_id.to_string(),
        }
    }

    pub async fn reset(&self, session_id: &str) {
        self.store.reset(session_id).await;
    }

    pub async fn history(&self, session_id: &str) -> Vec<Turn> {
        self.store.history(session_id).await
    }

    pub async fn phase(&self, session_id: &str) -> InterviewPhase {
        let Some(handle) = self.store.get(session_id).await else {
            return InterviewPhase::Uninitialized;
        };
        let session = handle.lock().await;

        if self
            .fallback
            .questions()
            .is_exhausted(session.fallback_cursor())
        {
            InterviewPhase::Exhausted
        } else if session.messages().iter().any(|t| t.role == Role::User) {
            InterviewPhase::InProgress
        } else if session.has_greeted() {
            InterviewPhase::Greeted
        } else {
            InterviewPhase::Uninitialized
        }
    }
}
