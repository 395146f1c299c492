//! Inbound WebSocket messages (client → server).
//!
//! Outbound messages are serialized [`crate::domain::NotificationEvent`]s;
//! this module only covers what clients are allowed to send.

use serde::Deserialize;

use crate::domain::RaceId;

/// A message sent by a connected client.
///
/// Anything that fails to parse into one of these variants is logged and
/// ignored; a malformed message never terminates the connection.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Join the live audience of a race. Sent after the client's
    /// join-race action committed. The member added is always the
    /// connection's own authenticated user.
    JoinRace {
        /// The race to join.
        #[serde(rename = "raceId")]
        race_id: RaceId,
    },

    /// Leave a race's live audience.
    LeaveRace {
        /// The race to leave.
        #[serde(rename = "raceId")]
        race_id: RaceId,
    },

    /// Application-level keepalive; refreshes the connection's
    /// last-activity timestamp.
    Heartbeat,
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn parses_join_race() {
        let msg = serde_json::from_str::<ClientMessage>(
            r#"{ "type": "join_race", "raceId": "race-42" }"#,
        );
        let Ok(ClientMessage::JoinRace { race_id }) = msg else {
            panic!("expected join_race");
        };
        assert_eq!(race_id.as_str(), "race-42");
    }

    #[test]
    fn parses_leave_race() {
        let msg = serde_json::from_str::<ClientMessage>(
            r#"{ "type": "leave_race", "raceId": "race-42" }"#,
        );
        assert!(matches!(msg, Ok(ClientMessage::LeaveRace { .. })));
    }

    #[test]
    fn parses_heartbeat() {
        let msg = serde_json::from_str::<ClientMessage>(r#"{ "type": "heartbeat" }"#);
        assert!(matches!(msg, Ok(ClientMessage::Heartbeat)));
    }

    #[test]
    fn rejects_unknown_type() {
        assert!(serde_json::from_str::<ClientMessage>(r#"{ "type": "shutdown" }"#).is_err());
    }

    #[test]
    fn rejects_malformed_json() {
        assert!(serde_json::from_str::<ClientMessage>("join race-42 please").is_err());
    }
}
