//! Typed notification events pushed to connected clients.
//!
//! One variant per event type the platform emits. Events are ephemeral:
//! they exist only for the duration of a dispatch and are never persisted.
//! The serialized form is exactly what goes over the wire:
//!
//! ```json
//! { "type": "race_started", "data": { "raceId": "race-42", "startedAt": "..." } }
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{RaceId, UserId};

/// Minimal reference to the user who triggered a social event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FriendRef {
    /// The triggering user's id.
    pub id: UserId,
    /// Display name shown in the client notification.
    pub username: String,
}

/// A notification event pushed to one user or one race room.
///
/// Tagged union over the wire: the `type` discriminator carries the event
/// type and `data` carries the variant-specific payload with camelCase
/// field names, matching what the mobile clients parse.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
#[serde(rename_all_fields = "camelCase")]
pub enum NotificationEvent {
    /// Someone sent the recipient a friend request.
    FriendRequestReceived {
        /// Who sent the request.
        from: FriendRef,
    },

    /// The recipient was invited to a race.
    RaceInvitation {
        /// The race being joined.
        race_id: RaceId,
        /// Who sent the invite.
        from: FriendRef,
    },

    /// A race the recipient joined has started.
    RaceStarted {
        /// The race that started.
        race_id: RaceId,
        /// Start timestamp.
        started_at: DateTime<Utc>,
    },

    /// A race the recipient joined has finished.
    RaceFinished {
        /// The race that finished.
        race_id: RaceId,
        /// Finish timestamp.
        finished_at: DateTime<Utc>,
    },

    /// A participant's live position during a race.
    LocationUpdate {
        /// The race this position belongs to.
        race_id: RaceId,
        /// Whose position this is.
        user_id: UserId,
        /// Latitude in decimal degrees.
        latitude: f64,
        /// Longitude in decimal degrees.
        longitude: f64,
        /// When the position was recorded.
        recorded_at: DateTime<Utc>,
    },
}

impl NotificationEvent {
    /// Returns the event type as a static string slice.
    #[must_use]
    pub const fn event_type_str(&self) -> &'static str {
        match self {
            Self::FriendRequestReceived { .. } => "friend_request_received",
            Self::RaceInvitation { .. } => "race_invitation",
            Self::RaceStarted { .. } => "race_started",
            Self::RaceFinished { .. } => "race_finished",
            Self::LocationUpdate { .. } => "location_update",
        }
    }

    /// Returns the race this event is scoped to, if any.
    #[must_use]
    pub fn race_id(&self) -> Option<&RaceId> {
        match self {
            Self::FriendRequestReceived { .. } => None,
            Self::RaceInvitation { race_id, .. }
            | Self::RaceStarted { race_id, .. }
            | Self::RaceFinished { race_id, .. }
            | Self::LocationUpdate { race_id, .. } => Some(race_id),
        }
    }

    /// Returns `true` if this event marks the end of a race's live
    /// audience (the room is discarded after broadcast).
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::RaceFinished { .. })
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn friend_request_wire_shape() {
        let event = NotificationEvent::FriendRequestReceived {
            from: FriendRef {
                id: UserId::new("u-1"),
                username: "alice".to_string(),
            },
        };
        let json = serde_json::to_string(&event).unwrap_or_default();
        let Ok(value) = serde_json::from_str::<serde_json::Value>(&json) else {
            panic!("invalid json produced");
        };
        assert_eq!(
            value.get("type").and_then(|v| v.as_str()),
            Some("friend_request_received")
        );
        let from = value.pointer("/data/from");
        assert_eq!(
            from.and_then(|f| f.get("username")).and_then(|v| v.as_str()),
            Some("alice")
        );
    }

    #[test]
    fn race_event_data_uses_camel_case() {
        let event = NotificationEvent::RaceStarted {
            race_id: RaceId::new("race-42"),
            started_at: Utc::now(),
        };
        let json = serde_json::to_string(&event).unwrap_or_default();
        assert!(json.contains("race_started"));
        assert!(json.contains("\"raceId\":\"race-42\""));
        assert!(json.contains("startedAt"));
    }

    #[test]
    fn deserializes_producer_payload() {
        let json = r#"{
            "type": "race_invitation",
            "data": {
                "raceId": "race-7",
                "from": { "id": "u-9", "username": "bob" }
            }
        }"#;
        let Ok(event) = serde_json::from_str::<NotificationEvent>(json) else {
            panic!("deserialization failed");
        };
        assert_eq!(event.event_type_str(), "race_invitation");
        assert_eq!(event.race_id().map(RaceId::as_str), Some("race-7"));
    }

    #[test]
    fn race_finished_is_terminal() {
        let event = NotificationEvent::RaceFinished {
            race_id: RaceId::new("race-1"),
            finished_at: Utc::now(),
        };
        assert!(event.is_terminal());

        let event = NotificationEvent::RaceStarted {
            race_id: RaceId::new("race-1"),
            started_at: Utc::now(),
        };
        assert!(!event.is_terminal());
    }

    #[test]
    fn friend_request_has_no_race() {
        let event = NotificationEvent::FriendRequestReceived {
            from: FriendRef {
                id: UserId::new("u-1"),
                username: "alice".to_string(),
            },
        };
        assert!(event.race_id().is_none());
    }
}
