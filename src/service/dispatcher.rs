//! Best-effort notification delivery over the two registries.
//!
//! [`Dispatcher`] is the only API the rest of the platform uses to push
//! real-time updates: resolve the recipient(s), serialize the event, and
//! write it to each live socket's queue. No queuing, no retry, no
//! persistence — an offline recipient is a silent no-op, and a delivery
//! failure never propagates to the producer that triggered it.

use std::sync::Arc;

use axum::extract::ws::Message;

use crate::domain::{ConnectionRegistry, NotificationEvent, RaceId, RoomRegistry, UserId};

/// Resolves recipients and performs fire-and-forget message delivery.
///
/// Constructed once by the composition root and shared behind an `Arc`;
/// tests build independent instances with their own registries.
#[derive(Debug)]
pub struct Dispatcher {
    connections: Arc<ConnectionRegistry>,
    rooms: Arc<RoomRegistry>,
}

impl Dispatcher {
    /// Creates a dispatcher over the given registries.
    #[must_use]
    pub fn new(connections: Arc<ConnectionRegistry>, rooms: Arc<RoomRegistry>) -> Self {
        Self { connections, rooms }
    }

    /// Returns the connection registry.
    #[must_use]
    pub fn connections(&self) -> &Arc<ConnectionRegistry> {
        &self.connections
    }

    /// Returns the room registry.
    #[must_use]
    pub fn rooms(&self) -> &Arc<RoomRegistry> {
        &self.rooms
    }

    /// Pushes `event` to `user_id`'s live connection, if any.
    ///
    /// Returns `true` when the event was handed to a live write queue.
    /// An offline user is a silent no-op. A write to a dead socket is
    /// treated as an implicit disconnect: the stale entry is removed and
    /// `false` is returned, but no error reaches the caller.
    pub async fn notify_user(&self, user_id: &UserId, event: &NotificationEvent) -> bool {
        let Some(connection) = self.connections.resolve(user_id).await else {
            tracing::debug!(
                %user_id,
                event_type = event.event_type_str(),
                "recipient offline, dropping notification"
            );
            return false;
        };

        let Ok(json) = serde_json::to_string(event) else {
            tracing::warn!(
                event_type = event.event_type_str(),
                "failed to serialize notification event"
            );
            return false;
        };

        if connection.sender.send(Message::text(json)).is_err() {
            // Writer task is gone: the socket broke without a clean close.
            let removed = self
                .connections
                .unregister(user_id, connection.id)
                .await;
            tracing::debug!(
                %user_id,
                connection_id = %connection.id,
                removed,
                "write to dead socket, unregistered connection"
            );
            return false;
        }

        true
    }

    /// Broadcasts `event` to every member of `race_id`'s room except the
    /// optional excluded sender.
    ///
    /// Each member delivery is independent: one broken socket never
    /// aborts delivery to the rest. Returns the number of members the
    /// event was delivered to.
    pub async fn notify_room(
        &self,
        race_id: &RaceId,
        event: &NotificationEvent,
        exclude_user_id: Option<&UserId>,
    ) -> usize {
        let members = self.rooms.members_of(race_id).await;
        let mut delivered = 0;

        for member in &members {
            if exclude_user_id.is_some_and(|excluded| excluded == member) {
                continue;
            }
            if self.notify_user(member, event).await {
                delivered += 1;
            }
        }

        tracing::debug!(
            %race_id,
            event_type = event.event_type_str(),
            members = members.len(),
            delivered,
            "room broadcast"
        );
        delivered
    }

    /// Discards `race_id`'s room. Called after broadcasting a terminal
    /// race event.
    pub async fn close_room(&self, race_id: &RaceId) {
        if self.rooms.remove(race_id).await {
            tracing::debug!(%race_id, "room closed");
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use axum::extract::ws::Message;
    use chrono::Utc;
    use tokio::sync::mpsc;

    use super::*;
    use crate::domain::{Connection, FriendRef};

    fn make_dispatcher() -> Dispatcher {
        Dispatcher::new(
            Arc::new(ConnectionRegistry::new()),
            Arc::new(RoomRegistry::new()),
        )
    }

    async fn connect(
        dispatcher: &Dispatcher,
        user: &str,
    ) -> mpsc::UnboundedReceiver<Message> {
        let (tx, rx) = mpsc::unbounded_channel();
        dispatcher
            .connections()
            .register(Connection::new(UserId::new(user), tx))
            .await;
        rx
    }

    fn friend_request(username: &str) -> NotificationEvent {
        NotificationEvent::FriendRequestReceived {
            from: FriendRef {
                id: UserId::new("u-0"),
                username: username.to_string(),
            },
        }
    }

    fn race_started(race: &str) -> NotificationEvent {
        NotificationEvent::RaceStarted {
            race_id: RaceId::new(race),
            started_at: Utc::now(),
        }
    }

    fn event_type_of(msg: &Message) -> String {
        let Message::Text(text) = msg else {
            panic!("expected a text frame");
        };
        let Ok(value) = serde_json::from_str::<serde_json::Value>(text.as_str()) else {
            panic!("expected json payload");
        };
        value
            .get("type")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string()
    }

    #[tokio::test]
    async fn offline_recipient_is_silent_noop() {
        let dispatcher = make_dispatcher();
        let delivered = dispatcher
            .notify_user(&UserId::new("charlie"), &friend_request("alice"))
            .await;
        assert!(!delivered);
    }

    #[tokio::test]
    async fn delivers_to_live_connection() {
        let dispatcher = make_dispatcher();
        let mut rx = connect(&dispatcher, "alice").await;

        assert!(
            dispatcher
                .notify_user(&UserId::new("alice"), &friend_request("bob"))
                .await
        );

        let msg = rx.recv().await;
        let Some(msg) = msg else {
            panic!("expected a delivered message");
        };
        assert_eq!(event_type_of(&msg), "friend_request_received");
    }

    #[tokio::test]
    async fn preserves_per_recipient_order() {
        let dispatcher = make_dispatcher();
        let mut rx = connect(&dispatcher, "alice").await;
        let alice = UserId::new("alice");

        dispatcher.notify_user(&alice, &friend_request("first")).await;
        dispatcher.notify_user(&alice, &friend_request("second")).await;

        for expected in ["first", "second"] {
            let Some(Message::Text(text)) = rx.recv().await else {
                panic!("expected a text frame");
            };
            assert!(text.as_str().contains(expected));
        }
    }

    #[tokio::test]
    async fn broken_socket_unregisters_and_spares_others() {
        let dispatcher = make_dispatcher();
        let race = RaceId::new("race-42");

        let mut rx1 = connect(&dispatcher, "u1").await;
        let rx2 = connect(&dispatcher, "u2").await;
        let mut rx3 = connect(&dispatcher, "u3").await;
        // Simulate u2's socket breaking without a close event.
        drop(rx2);

        for user in ["u1", "u2", "u3"] {
            dispatcher.rooms().join(&race, &UserId::new(user)).await;
        }

        let delivered = dispatcher
            .notify_room(&race, &race_started("race-42"), None)
            .await;
        assert_eq!(delivered, 2);

        assert!(rx1.try_recv().is_ok());
        assert!(rx3.try_recv().is_ok());

        // The dead entry was pruned from the connection registry.
        assert!(
            dispatcher
                .connections()
                .resolve(&UserId::new("u2"))
                .await
                .is_none()
        );
        // Room membership is retained for a future reconnect.
        assert!(
            dispatcher
                .rooms()
                .members_of(&race)
                .await
                .contains(&UserId::new("u2"))
        );
    }

    #[tokio::test]
    async fn exclude_sender_never_receives() {
        let dispatcher = make_dispatcher();
        let race = RaceId::new("race-42");

        let mut rx1 = connect(&dispatcher, "u1").await;
        let mut rx2 = connect(&dispatcher, "u2").await;

        dispatcher.rooms().join(&race, &UserId::new("u1")).await;
        dispatcher.rooms().join(&race, &UserId::new("u2")).await;

        let delivered = dispatcher
            .notify_room(&race, &race_started("race-42"), Some(&UserId::new("u1")))
            .await;
        assert_eq!(delivered, 1);
        assert!(rx1.try_recv().is_err());
        assert!(rx2.try_recv().is_ok());
    }

    #[tokio::test]
    async fn empty_room_broadcast_delivers_nothing() {
        let dispatcher = make_dispatcher();
        let delivered = dispatcher
            .notify_room(&RaceId::new("race-never"), &race_started("race-never"), None)
            .await;
        assert_eq!(delivered, 0);
    }

    #[tokio::test]
    async fn close_room_discards_audience() {
        let dispatcher = make_dispatcher();
        let race = RaceId::new("race-42");
        dispatcher.rooms().join(&race, &UserId::new("u1")).await;

        dispatcher.close_room(&race).await;
        assert!(dispatcher.rooms().members_of(&race).await.is_empty());
    }
}
