//! Interview API Library Crate
//!
//! HTTP host for the interview orchestrator: configuration, shared state,
//! handlers and routing. The `api` binary is a thin wrapper around this library.

pub mod config;
pub mod handlers;
pub mod models;
pub mod prompts;
pub mod router;
pub mod state;
