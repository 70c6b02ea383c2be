//! rendezvous-gateway server entry point.
//!
//! Starts the Axum HTTP server with REST and WebSocket endpoints.

use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use rendezvous_gateway::api;
use rendezvous_gateway::app_state::AppState;
use rendezvous_gateway::auth::JwtAuthenticator;
use rendezvous_gateway::config::{GatewayConfig, LogFormat};
use rendezvous_gateway::persistence::Stores;
use rendezvous_gateway::persistence::postgres::PostgresPersistence;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = GatewayConfig::from_env().context("invalid LISTEN_ADDR")?;

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match config.log_format {
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init(),
        LogFormat::Pretty => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }

    tracing::info!(addr = %config.listen_addr, "starting rendezvous-gateway");
    if config.uses_default_secret() {
        tracing::warn!("JWT_SECRET not set, using the development secret");
    }

    // Build persistence layer
    let stores = if config.persistence_enabled {
        let persistence = PostgresPersistence::connect(&config)
            .await
            .context("failed to initialise PostgreSQL")?;
        tracing::info!("persistence: postgres");
        Stores::postgres(persistence)
    } else {
        tracing::info!("persistence: in-memory");
        Stores::in_memory()
    };

    // Build application state
    let authenticator = Arc::new(JwtAuthenticator::new(&config.jwt_secret));
    let app_state = AppState::new(stores, authenticator);

    // Build router
    let app = api::build_app(app_state);

    // Start server
    let listener = tokio::net::TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.listen_addr))?;
    tracing::info!(addr = %config.listen_addr, "server listening");

    axum::serve(listener, app).await.context("server error")?;

    Ok(())
}
