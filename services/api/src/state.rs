//! Shared Application State
//!
//! This module defines the `AppState` struct, which holds the interview
//! orchestrator and the loaded configuration.

use crate::config::Config;
use interview_core::InterviewOrchestrator;
use std::sync::Arc;

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<InterviewOrchestrator>,
    pub config: Arc<Config>,
}
