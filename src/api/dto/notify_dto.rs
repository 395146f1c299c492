//! Notification request/response DTOs.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::NotificationEvent;

/// Request body for `POST /internal/notify/user/{user_id}`.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NotifyUserRequest {
    /// The event to deliver, in wire form (`{ "type": ..., "data": ... }`).
    #[schema(value_type = Object)]
    pub event: NotificationEvent,
}

/// Request body for `POST /internal/notify/race/{race_id}`.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NotifyRaceRequest {
    /// The event to broadcast, in wire form.
    #[schema(value_type = Object)]
    pub event: NotificationEvent,
    /// Member to skip (the user whose action produced the event).
    #[serde(default)]
    pub exclude_user_id: Option<String>,
}

/// Response body for both notify endpoints.
///
/// Delivery is best-effort: `delivered` reports how many live sockets
/// the event was handed to, which is allowed to be zero.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NotifyResponse {
    /// Number of live connections the event was written to.
    pub delivered: usize,
}
