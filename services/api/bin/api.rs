//! Main Entrypoint for the Interview API Service
//!
//! This binary is responsible for:
//! 1. Loading configuration from the environment.
//! 2. Building the question generator for the configured provider.
//! 3. Constructing the interview orchestrator and the Axum router.
//! 4. Starting the web server and handling graceful shutdown.

use anyhow::Context;
use interview_api::{
    config::{Config, Provider},
    prompts::{INTERVIEWER_PROMPT, load_prompts},
    router::create_router,
    state::AppState,
};
use interview_core::{
    FallbackQuestions, GeneratorConfig, InterviewOrchestrator, LLMClient, OpenAICompatibleClient,
    QuestionGenerator, SessionStore,
};
use std::{net::SocketAddr, sync::Arc};
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};

/// Listens for the `Ctrl+C` signal to gracefully shut down the server.
async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install Ctrl+C handler");
    info!("Received shutdown signal. Shutting down gracefully...");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // --- 1. Load Configuration ---
    let config = Config::from_env().context("Failed to load configuration")?;

    // --- 2. Initialize Logging ---
    tracing_subscriber::fmt()
        .with_max_level(config.log_level)
        .with_timer(tracing_subscriber::fmt::time::ChronoLocal::rfc_3339())
        .init();
    info!("Configuration loaded. Initializing application state...");

    // --- 3. Build the Question Generator ---
    let generator_config = GeneratorConfig {
        timeout: config.generation_timeout,
        max_workers: config.generation_workers,
        ..GeneratorConfig::default()
    };

    let client: Option<Arc<dyn LLMClient>> = match (&config.provider, config.api_key()) {
        (Provider::OpenAI, Some(api_key)) => {
            info!("Using OpenAI provider.");
            Some(Arc::new(OpenAICompatibleClient::openai(
                api_key,
                config.chat_model.clone(),
            )))
        }
        (Provider::Gemini, Some(api_key)) => {
            info!("Using Gemini provider.");
            Some(Arc::new(OpenAICompatibleClient::gemini(
                api_key,
                config.chat_model.clone(),
            )))
        }
        (provider, None) => {
            warn!(
                ?provider,
                "No API key configured; serving fallback questions only."
            );
            None
        }
    };

    let mut generator = match client {
        Some(client) => QuestionGenerator::new(client, generator_config),
        None => QuestionGenerator::disabled(generator_config),
    };

    let prompts = load_prompts(&config.prompts_path)?;
    if let Some(template) = prompts.get(INTERVIEWER_PROMPT) {
        info!("Using interviewer prompt from prompts directory.");
        generator = generator.with_prompt_template(template.clone());
    }

    // --- 4. Build the Orchestrator and Shared State ---
    let orchestrator = InterviewOrchestrator::new(
        Arc::new(SessionStore::new()),
        generator,
        FallbackQuestions::default(),
    );

    let app_state = Arc::new(AppState {
        orchestrator: Arc::new(orchestrator),
        config: Arc::new(config.clone()),
    });

    // --- 5. Create Router and Apply Middleware ---
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = create_router(app_state.clone()).layer(cors);

    // --- 6. Start Server ---
    info!(
        provider = ?config.provider,
        model = %config.chat_model,
        generation_available = app_state.orchestrator.generation_available(),
        timeout = ?config.generation_timeout,
        workers = config.generation_workers,
        bind_address = %config.bind_address,
        "Service configured. Starting server..."
    );
    let listener = tokio::net::TcpListener::bind(config.bind_address).await?;

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("Server has shut down.");
    Ok(())
}
