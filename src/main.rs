//! Agent Router - tool-augmented conversational orchestrator
//!
//! Runs each prompt through a small state machine: the model either answers
//! directly or requests one registered tool, whose result is fed back for a
//! final answer.

mod api;
mod config;
mod controller;
mod gateway;
mod tools;
mod transcript;

use api::{create_router, AppState};
use config::Config;
use controller::TurnController;
use gateway::{GeminiGateway, LoggingGateway, ModelGateway};
use std::net::SocketAddr;
use std::sync::Arc;
use tools::ToolRegistry;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "agent_router=info,tower_http=debug".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false),
        )
        .init();

    let config = Config::from_env()?;

    let gateway: Arc<dyn ModelGateway> = Arc::new(LoggingGateway::new(Arc::new(
        GeminiGateway::new(&config.gemini)?,
    )));
    tracing::info!(
        model = %gateway.model_id(),
        proxied = config.gemini.gateway.is_some(),
        "Model gateway initialized"
    );

    let registry = Arc::new(ToolRegistry::standard(&config.tools)?);
    tracing::info!(tools = ?registry.names(), "Tool registry initialized");
    if config.tools.calendar.access_token.is_none() {
        tracing::warn!("GOOGLE_CALENDAR_TOKEN not set; calendar tools will fail when called");
    }

    let state = AppState::new(TurnController::new(gateway, registry));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = create_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Agent router listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}
