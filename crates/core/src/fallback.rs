//! Fallback Question Provider
//!
//! A fixed, ordered list of pre-authored interview questions, walked with a
//! per-session cursor. It never fails and never leaves the process, which
//! makes it the last resort when the generative service cannot answer.

use crate::error::FallbackError;
use crate::session::{Session, SessionStore};
use std::sync::Arc;

/// Questions asked, in order, when no generated question is available.
pub const DEFAULT_QUESTIONS: [&str; 10] = [
    "Tell me about yourself and your background.",
    "What are your greatest strengths?",
    "Describe a challenging project you worked on.",
    "How do you handle pressure or stressful situations?",
    "Where do you see yourself in 5 years?",
    "What motivates you in your work?",
    "Tell me about a time you made a mistake and how you handled it.",
    "How do you prioritize your work?",
    "What are your salary expectations?",
    "Do you have any questions for me?",
];

/// Returned once every fallback question has been asked.
pub const DEFAULT_CLOSING_MESSAGE: &str = "That covers our main questions. Is there anything else you'd like to share about your experience?";

/// The authoritative fallback sequence plus its closing message.
#[derive(Debug, Clone)]
pub struct FallbackQuestions {
    questions: Vec<String>,
    closing: String,
}

impl FallbackQuestions {
    /// Builds a sequence from a non-empty list of questions.
    pub fn new<I, S>(questions: I, closing: impl Into<String>) -> Result<Self, FallbackError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let questions: Vec<String> = questions.into_iter().map(Into::into).collect();
        if questions.is_empty() {
            return Err(FallbackError::Empty);
        }
        Ok(Self {
            questions,
            closing: closing.into(),
        })
    }

    pub fn question_count(&self) -> usize {
        self.questions.len()
    }

    pub fn closing(&self) -> &str {
        &self.closing
    }

    /// True once a cursor has walked past the last question.
    pub fn is_exhausted(&self, cursor: usize) -> bool {
        cursor >= self.questions.len()
    }

    /// Returns the session's next fallback question and advances its cursor.
    ///
    /// Once the list is used up the cursor stays pinned at its length and
    /// every further call yields the closing message.
    pub fn next(&self, session: &mut Session) -> String {
        match self.questions.get(session.fallback_cursor) {
            Some(question) => {
                session.fallback_cursor += 1;
                session.touch();
                question.clone()
            }
            None => self.closing.clone(),
        }
    }
}

impl Default for FallbackQuestions {
    fn default() -> Self {
        Self {
            questions: DEFAULT_QUESTIONS.iter().map(|q| q.to_string()).collect(),
            closing: DEFAULT_CLOSING_MESSAGE.to_string(),
        }
    }
}

/// Fallback questions bound to the session store, addressed by session id.
pub struct FallbackProvider {
    questions: FallbackQuestions,
    store: Arc<SessionStore>,
}

impl FallbackProvider {
    pub fn new(questions: FallbackQuestions, store: Arc<SessionStore>) -> Self {
        Self { questions, store }
    }

    pub fn questions(&self) -> &FallbackQuestions {
        &self.questions
    }

    /// Next fallback question for `id`. Advancing the cursor is a write, so an
    /// unknown session is created.
    pub async fn next(&self, id: &str) -> String {
        let handle = self.store.get_or_init(id).await;
        let mut session = handle.lock().await;
        self.questions.next(&mut session)
    }
}
