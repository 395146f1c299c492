//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::auth::TokenVerifier;
use crate::service::Dispatcher;

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Notification dispatcher over the two registries.
    pub dispatcher: Arc<Dispatcher>,
    /// Verifier for the platform's access tokens.
    pub verifier: Arc<TokenVerifier>,
    /// Expected bearer token on `/internal` routes; `None` disables the
    /// check.
    pub service_token: Option<String>,
}
