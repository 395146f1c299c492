//! # gridline-gateway
//!
//! Real-time WebSocket notification gateway for the Gridline racing
//! platform.
//!
//! This crate owns the platform's live-push core: a registry of
//! authenticated socket connections, race-scoped broadcast rooms, and a
//! best-effort notification dispatcher. Everything durable (users,
//! races, friendships) lives in the surrounding application; this
//! service holds no state that survives a restart.
//!
//! ## Architecture
//!
//! ```text
//! Mobile clients (WebSocket)        Platform route handlers (HTTP)
//!     │                                 │
//!     ├── WS Handler (ws/)              ├── Internal API (api/)
//!     │                                 │
//!     └────────── Dispatcher (service/) ┘
//!                     │
//!         ├── ConnectionRegistry (domain/)
//!         └── RoomRegistry (domain/)
//! ```

pub mod api;
pub mod app_state;
pub mod auth;
pub mod config;
pub mod domain;
pub mod error;
pub mod service;
pub mod ws;

use axum::Router;
use axum::routing::get;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::app_state::AppState;

/// Builds the full application router: internal API, WebSocket
/// endpoint, and middleware layers.
///
/// Shared by the server entry point and the integration tests.
pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(api::build_router())
        .route("/ws", get(ws::handler::ws_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
