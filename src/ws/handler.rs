//! Axum WebSocket upgrade handler with token authentication.
//!
//! A connection presenting a missing, invalid, or expired token is
//! upgraded and immediately closed with a distinguishable close code; it
//! never reaches the connection registry.

use axum::extract::ws::{CloseFrame, Message, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::http::{HeaderMap, header};
use axum::response::Response;
use serde::Deserialize;

use super::connection::run_connection;
use crate::app_state::AppState;
use crate::auth::AuthError;

/// Close code for an expired token.
const CLOSE_TOKEN_EXPIRED: u16 = 4001;
/// Close code for a missing or invalid token.
const CLOSE_TOKEN_INVALID: u16 = 4002;

/// Query parameters for the WebSocket upgrade. Browsers cannot set
/// headers on a WebSocket handshake, so the token usually rides in the
/// query string; an `Authorization: Bearer` header also works.
#[derive(Debug, Deserialize)]
pub struct WsAuthQuery {
    /// The platform access token.
    #[serde(default)]
    pub token: Option<String>,
}

/// `GET /ws` — Upgrade to WebSocket after verifying the client's token.
pub async fn ws_handler(
    State(state): State<AppState>,
    Query(params): Query<WsAuthQuery>,
    headers: HeaderMap,
    ws: WebSocketUpgrade,
) -> Response {
    let Some(token) = params.token.or_else(|| bearer_token(&headers)) else {
        tracing::warn!("ws upgrade without token");
        return reject(ws, CLOSE_TOKEN_INVALID, "missing token");
    };

    match state.verifier.verify(&token) {
        Ok(ctx) => {
            tracing::info!(user_id = %ctx.user_id, "ws connection authenticated");
            ws.on_upgrade(move |socket| run_connection(socket, state, ctx))
        }
        Err(err) => {
            let (code, reason) = match err {
                AuthError::Expired => (CLOSE_TOKEN_EXPIRED, "token expired"),
                AuthError::Invalid => (CLOSE_TOKEN_INVALID, "token invalid"),
            };
            tracing::warn!(close_code = code, reason, "ws auth failed");
            reject(ws, code, reason)
        }
    }
}

/// Extracts a bearer token from the `Authorization` header.
fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::to_string)
}

/// Upgrades the connection, then immediately closes it with the given
/// close code. The registry is never touched.
fn reject(ws: WebSocketUpgrade, code: u16, reason: &'static str) -> Response {
    ws.on_upgrade(move |mut socket| async move {
        let frame = CloseFrame {
            code,
            reason: reason.into(),
        };
        let _ = socket.send(Message::Close(Some(frame))).await;
    })
}
