//! Gateway configuration loaded from environment variables.
//!
//! Follows 12-factor style: all settings come from environment variables
//! (or a `.env` file via `dotenvy`).

use std::net::SocketAddr;

/// Top-level gateway configuration.
///
/// Loaded once at startup via [`GatewayConfig::from_env`].
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Socket address to bind the HTTP server to (e.g. `0.0.0.0:4100`).
    pub listen_addr: SocketAddr,

    /// Shared HS256 secret the platform signs access tokens with.
    pub jwt_secret: String,

    /// Bearer token producers must present on `/internal` routes.
    /// When unset the internal API is open (local development only).
    pub service_token: Option<String>,
}

impl GatewayConfig {
    /// Loads configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv().ok()` to optionally load a `.env` file.
    ///
    /// # Errors
    ///
    /// Returns an error if `JWT_SECRET` is unset or `LISTEN_ADDR` is set
    /// but cannot be parsed as a [`SocketAddr`].
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        dotenvy::dotenv().ok();

        let listen_addr: SocketAddr = std::env::var("LISTEN_ADDR")
            .unwrap_or_else(|_| "0.0.0.0:4100".to_string())
            .parse()?;

        let jwt_secret = std::env::var("JWT_SECRET")
            .map_err(|_| "JWT_SECRET must be set (the platform's token signing secret)")?;

        let service_token = std::env::var("SERVICE_TOKEN")
            .ok()
            .filter(|token| !token.is_empty());

        Ok(Self {
            listen_addr,
            jwt_secret,
            service_token,
        })
    }
}
