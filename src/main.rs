//! gridline-gateway server entry point.
//!
//! Starts the Axum HTTP server with the WebSocket endpoint and the
//! internal producer API.

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use gridline_gateway::app;
use gridline_gateway::app_state::AppState;
use gridline_gateway::auth::TokenVerifier;
use gridline_gateway::config::GatewayConfig;
use gridline_gateway::domain::{ConnectionRegistry, RoomRegistry};
use gridline_gateway::service::Dispatcher;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let config = GatewayConfig::from_env()?;
    tracing::info!(addr = %config.listen_addr, "starting gridline-gateway");

    // Build domain layer
    let connections = Arc::new(ConnectionRegistry::new());
    let rooms = Arc::new(RoomRegistry::new());

    // Build service layer
    let dispatcher = Arc::new(Dispatcher::new(connections, rooms));
    let verifier = Arc::new(TokenVerifier::new(config.jwt_secret.as_bytes()));

    // Build application state
    let app_state = AppState {
        dispatcher,
        verifier,
        service_token: config.service_token.clone(),
    };

    // Start server
    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    tracing::info!(addr = %config.listen_addr, "server listening");

    axum::serve(listener, app(app_state)).await?;

    Ok(())
}
