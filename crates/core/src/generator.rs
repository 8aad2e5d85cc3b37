//! External Question Generator
//!
//! Asks the generative service for one follow-up question. The call runs on a
//! small bounded pool of spawned tasks under a hard wall-clock timeout, and the
//! raw text is cleaned up and validated before it is accepted. Every failure
//! collapses into [`Generated::Unavailable`]; nothing here ever returns an
//! error to the caller.

use crate::error::GenerationError;
use crate::llm_client::LLMClient;
use crate::session::{Role, Turn};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

/// Prompt used when no override is supplied.
///
/// `{context}` receives the recent conversation, one `Interviewer:` or
/// `Candidate:` line per turn, and `{answer}` the candidate's latest answer.
pub const DEFAULT_PROMPT_TEMPLATE: &str = "You are a professional interviewer conducting a behavioral interview.
Based on the conversation context and the candidate's latest response, ask ONE clear, relevant follow-up question.

Context:
{context}

Candidate's response: \"{answer}\"

Your follow-up interview question:";

const QUOTES: &[char] = &['"', '\'', '\u{201C}', '\u{201D}', '\u{2018}', '\u{2019}'];
const QUESTION_LABEL: &str = "question:";

/// Limits applied to every generation attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorConfig {
    /// Hard limit on the wait for a worker plus the service call.
    pub timeout: Duration,
    /// Maximum number of service calls in flight at once.
    pub max_workers: usize,
    /// How many recent turns go into the prompt.
    pub context_turns: usize,
    /// A question must be strictly longer than this many characters.
    pub min_chars: usize,
    /// A question may have at most this many words.
    pub max_words: usize,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(15),
            max_workers: 4,
            context_turns: 4,
            min_chars: 10,
            max_words: 50,
        }
    }
}

/// Outcome of a generation attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Generated {
    Question(String),
    Unavailable,
}

pub struct QuestionGenerator {
    client: Option<Arc<dyn LLMClient>>,
    workers: Arc<Semaphore>,
    config: GeneratorConfig,
    prompt_template: String,
}

impl QuestionGenerator {
    pub fn new(client: Arc<dyn LLMClient>, config: GeneratorConfig) -> Self {
        Self::build(Some(client), config)
    }

    /// A generator with no service behind it; every attempt is `Unavailable`.
    pub fn disabled(config: GeneratorConfig) -> Self {
        Self::build(None, config)
    }

    fn build(client: Option<Arc<dyn LLMClient>>, config: GeneratorConfig) -> Self {
        Self {
            client,
            workers: Arc::new(Semaphore::new(config.max_workers.max(1))),
            config,
            prompt_template: DEFAULT_PROMPT_TEMPLATE.to_string(),
        }
    }

    pub fn with_prompt_template(mut self, template: impl Into<String>) -> Self {
        self.prompt_template = template.into();
        self
    }

    pub fn is_available(&self) -> bool {
        self.client.is_some()
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Produces a follow-up question for `latest_answer`, or `Unavailable`.
    pub async fn generate(&self, history: &[Turn], latest_answer: &str) -> Generated {
        self.generate_within(history, latest_answer, self.config.timeout)
            .await
    }

    /// Like [`generate`](Self::generate), but gives up once `budget` has
    /// elapsed. Callers that already spent part of the configured timeout
    /// waiting pass what is left of it.
    pub async fn generate_within(
        &self,
        history: &[Turn],
        latest_answer: &str,
        budget: Duration,
    ) -> Generated {
        match self.try_generate(history, latest_answer, budget).await {
            Ok(question) => {
                info!(%question, "Generated follow-up question");
                Generated::Question(question)
            }
            Err(GenerationError::Disabled) => {
                debug!("Question generation disabled; using fallback");
                Generated::Unavailable
            }
            Err(e) => {
                warn!(error = %e, "Question generation unavailable");
                Generated::Unavailable
            }
        }
    }

    async fn try_generate(
        &self,
        history: &[Turn],
        latest_answer: &str,
        budget: Duration,
    ) -> Result<String, GenerationError> {
        let client = self.client.clone().ok_or(GenerationError::Disabled)?;
        if budget.is_zero() {
            return Err(GenerationError::Timeout(budget));
        }
        let prompt = build_prompt(
            &self.prompt_template,
            history,
            latest_answer,
            self.config.context_turns,
        );

        let workers = self.workers.clone();
        let mut call = tokio::spawn(async move {
            let _permit = workers
                .acquire_owned()
                .await
                .map_err(|e| GenerationError::WorkerLost(e.to_string()))?;
            client
                .send(prompt)
                .await
                .map_err(|e| GenerationError::Service(format!("{e:#}")))
        });

        let raw = match tokio::time::timeout(budget, &mut call).await {
            Ok(Ok(result)) => result?,
            Ok(Err(join_error)) => return Err(GenerationError::WorkerLost(join_error.to_string())),
            Err(_) => {
                // The result, if it ever arrives, goes nowhere.
                call.abort();
                return Err(GenerationError::Timeout(budget));
            }
        };

        if raw.trim().is_empty() {
            return Err(GenerationError::Empty);
        }
        let question = sanitize(&raw);
        validate(&question, &self.config)?;
        Ok(question)
    }
}

/// Renders the prompt from the last `context_turns` conversational turns.
///
/// System turns are skipped; assistant turns are the interviewer and
/// everything else is the candidate.
pub fn build_prompt(
    template: &str,
    history: &[Turn],
    latest_answer: &str,
    context_turns: usize,
) -> String {
    let mut recent: Vec<&Turn> = history
        .iter()
        .rev()
        .filter(|t| t.role != Role::System)
        .take(context_turns)
        .collect();
    recent.reverse();

    let context = recent
        .iter()
        .map(|t| match t.role {
            Role::Assistant => format!("Interviewer: {}", t.content),
            _ => format!("Candidate: {}", t.content),
        })
        .collect::<Vec<_>>()
        .join("\n");

    // Substituted text is never rescanned, so an answer that happens to
    // contain "{context}" is kept verbatim.
    template
        .split("{answer}")
        .map(|part| part.replace("{context}", &context))
        .collect::<Vec<_>>()
        .join(latest_answer)
}

/// Strips decoration models like to wrap questions in.
///
/// Removes surrounding quotes, a leading `1.` style enumeration and a
/// leading `Question:` label. Quotes are stripped again once the label is
/// gone, since models often quote only the text after it.
pub fn sanitize(raw: &str) -> String {
    let text = raw.trim().trim_matches(QUOTES);
    let text = strip_enumeration(text);
    let text = strip_label(text);
    text.trim().trim_matches(QUOTES).trim().to_string()
}

fn strip_enumeration(text: &str) -> &str {
    let rest = text.trim_start_matches(|c: char| c.is_ascii_digit());
    if rest.len() == text.len() {
        return text;
    }
    match rest.strip_prefix('.') {
        Some(after) => after.trim_start(),
        None => text,
    }
}

fn strip_label(text: &str) -> &str {
    match text.get(..QUESTION_LABEL.len()) {
        Some(head) if head.eq_ignore_ascii_case(QUESTION_LABEL) => {
            text[QUESTION_LABEL.len()..].trim_start()
        }
        _ => text,
    }
}

/// Accepts a sanitized question only if it is long enough and short enough.
pub fn validate(question: &str, config: &GeneratorConfig) -> Result<(), GenerationError> {
    if question.is_empty() {
        return Err(GenerationError::Invalid("empty after sanitizing".to_string()));
    }
    let chars = question.chars().count();
    if chars <= config.min_chars {
        return Err(GenerationError::Invalid(format!(
            "{chars} characters, need more than {}",
            config.min_chars
        )));
    }
    let words = question.split_whitespace().count();
    if words > config.max_words {
        return Err(GenerationError::Invalid(format!(
            "{words} words, at most {} allowed",
            config.max_words
        )));
    }
    Ok(())
}
