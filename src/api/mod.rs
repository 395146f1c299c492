//! Internal HTTP API: producer endpoints and router composition.
//!
//! Producers (the platform's route handlers) live outside this process;
//! they reach the dispatcher through the endpoints under `/internal`.

pub mod dto;
pub mod handlers;

use axum::Router;

use crate::app_state::AppState;

/// Builds the complete API router with all HTTP endpoints.
pub fn build_router() -> Router<AppState> {
    Router::new()
        .nest("/internal", handlers::routes())
        .merge(handlers::system::routes())
}
