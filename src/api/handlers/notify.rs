//! Notification endpoint handlers for producers.
//!
//! The platform's route handlers call these after committing their own
//! database write. The response never reflects delivery failure — only
//! authentication and request validation can fail here.

use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};

use super::require_service_token;
use crate::api::dto::{NotifyRaceRequest, NotifyResponse, NotifyUserRequest};
use crate::app_state::AppState;
use crate::domain::{RaceId, UserId};
use crate::error::{ErrorResponse, GatewayError};

/// `POST /internal/notify/user/:user_id` — Push an event to one user.
///
/// # Errors
///
/// Returns [`GatewayError`] on a missing service token or an empty
/// user id. An offline recipient is not an error.
#[utoipa::path(
    post,
    path = "/internal/notify/user/{user_id}",
    tag = "Notifications",
    summary = "Notify a single user",
    description = "Delivers an event to the user's live connection. Best-effort: an offline user yields delivered = 0.",
    params(
        ("user_id" = String, Path, description = "Recipient user id"),
    ),
    request_body = NotifyUserRequest,
    responses(
        (status = 200, description = "Dispatch attempted", body = NotifyResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 401, description = "Missing service token", body = ErrorResponse),
    )
)]
pub async fn notify_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    headers: HeaderMap,
    Json(req): Json<NotifyUserRequest>,
) -> Result<impl IntoResponse, GatewayError> {
    require_service_token(&state, &headers)?;
    if user_id.trim().is_empty() {
        return Err(GatewayError::InvalidRequest("empty user id".to_string()));
    }

    let delivered = state
        .dispatcher
        .notify_user(&UserId::new(user_id), &req.event)
        .await;

    Ok(Json(NotifyResponse {
        delivered: usize::from(delivered),
    }))
}

/// `POST /internal/notify/race/:race_id` — Broadcast an event to a race
/// room.
///
/// A `race_finished` event also tears down the room after the broadcast.
///
/// # Errors
///
/// Returns [`GatewayError`] on a missing service token or an empty
/// race id.
#[utoipa::path(
    post,
    path = "/internal/notify/race/{race_id}",
    tag = "Notifications",
    summary = "Broadcast to a race room",
    description = "Delivers an event to every member of the race's room, optionally excluding the sender. Each delivery is independent.",
    params(
        ("race_id" = String, Path, description = "Target race id"),
    ),
    request_body = NotifyRaceRequest,
    responses(
        (status = 200, description = "Broadcast attempted", body = NotifyResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 401, description = "Missing service token", body = ErrorResponse),
    )
)]
pub async fn notify_race(
    State(state): State<AppState>,
    Path(race_id): Path<String>,
    headers: HeaderMap,
    Json(req): Json<NotifyRaceRequest>,
) -> Result<impl IntoResponse, GatewayError> {
    require_service_token(&state, &headers)?;
    if race_id.trim().is_empty() {
        return Err(GatewayError::InvalidRequest("empty race id".to_string()));
    }

    let race_id = RaceId::new(race_id);
    let exclude = req.exclude_user_id.map(UserId::new);

    let delivered = state
        .dispatcher
        .notify_room(&race_id, &req.event, exclude.as_ref())
        .await;

    if req.event.is_terminal() {
        state.dispatcher.close_room(&race_id).await;
    }

    Ok(Json(NotifyResponse { delivered }))
}

/// Notification routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/notify/user/{user_id}", post(notify_user))
        .route("/notify/race/{race_id}", post(notify_race))
}
