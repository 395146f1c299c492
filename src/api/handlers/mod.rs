//! Internal HTTP endpoint handlers.

pub mod notify;
pub mod system;

use axum::Router;
use axum::http::{HeaderMap, header};

use crate::app_state::AppState;
use crate::error::GatewayError;

/// Composes the producer routes mounted under `/internal`.
pub fn routes() -> Router<AppState> {
    Router::new().merge(notify::routes())
}

/// Checks the shared service token on producer requests.
///
/// # Errors
///
/// Returns [`GatewayError::Unauthorized`] when a token is configured and
/// the request's bearer token does not match.
pub fn require_service_token(state: &AppState, headers: &HeaderMap) -> Result<(), GatewayError> {
    let Some(expected) = state.service_token.as_deref() else {
        return Ok(());
    };

    let provided = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "));

    if provided == Some(expected) {
        Ok(())
    } else {
        Err(GatewayError::Unauthorized)
    }
}
