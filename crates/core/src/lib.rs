//! Interview Core
//!
//! Session state and question selection for simulated interviews. The
//! [`InterviewOrchestrator`] is the entry point. It combines the
//! [`SessionStore`], the bounded [`QuestionGenerator`] and the deterministic
//! [`FallbackQuestions`], so that every answer gets a question back.

pub mod error;
pub mod fallback;
pub mod generator;
pub mod llm_client;
pub mod orchestrator;
pub mod session;

pub use error::{FallbackError, GenerationError};
pub use fallback::{FallbackProvider, FallbackQuestions};
pub use generator::{Generated, GeneratorConfig, QuestionGenerator};
pub use llm_client::{LLMClient, OpenAICompatibleClient};
pub use orchestrator::{Greeting, InterviewOrchestrator, InterviewPhase, QuestionSource, Reply};
pub use session::{Role, Session, SessionSlot, SessionStore, Turn};
