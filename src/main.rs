//! Medanta Assist - scripted appointment booking chat
//!
//! Serves the booking conversation state machine over HTTP, with prompts
//! streamed to the browser as Server-Sent Events.

mod api;
mod config;
mod runtime;
mod script;
mod state_machine;

use api::{create_router, AppState};
use config::ChatConfig;
use script::Script;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    compression::CompressionLayer,
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
                .unwrap_or_else(|_| "medassist=info,tower_http=debug".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false),
        )
        .init();

    // Configuration
    let config = ChatConfig::from_env();
    tracing::info!(
        start_ms = config.delays.start.as_millis(),
        thinking_ms = config.delays.thinking.as_millis(),
        confirmation_ms = config.delays.confirmation.as_millis(),
        reset_ms = config.delays.reset.as_millis(),
        session_idle_secs = config.session_idle.as_secs(),
        "Loaded chat configuration"
    );

    // Create application state
    let script = Arc::new(Script::reference()?);
    let state = AppState::new(config.delays, config.session_idle, script);

    // Create router
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let compression = CompressionLayer::new()
        .gzip(true)
        .br(true)
        .deflate(true)
        .zstd(true);

    let app = create_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(compression);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Medanta Assist server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
