//! Authoritative map from user id to that user's live socket connection.
//!
//! At most one connection is active per user: a reconnect supersedes the
//! previous socket, which is sent a Close frame so no further deliveries
//! land on it. Multi-device fan-out is deliberately unsupported.

use std::collections::HashMap;
use std::fmt;

use axum::extract::ws::{CloseFrame, Message};
use chrono::{DateTime, Utc};
use tokio::sync::{RwLock, mpsc};

use super::UserId;

/// Close code sent to a connection replaced by a newer one for the
/// same user.
pub const CLOSE_SUPERSEDED: u16 = 4000;

/// Opaque identifier of a single socket connection.
///
/// Distinguishes a superseded connection from its replacement so that a
/// late close event for the old socket cannot evict the new one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(uuid::Uuid);

impl ConnectionId {
    /// Creates a new random `ConnectionId` (UUID v4).
    #[must_use]
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One live, authenticated socket connection.
///
/// The `sender` feeds the connection's writer task; pushing a message
/// here never blocks, so a slow consumer cannot stall fan-out to other
/// recipients. Dropped entirely when the socket closes.
#[derive(Debug, Clone)]
pub struct Connection {
    /// Connection identifier, unique per handshake.
    pub id: ConnectionId,
    /// The authenticated user this socket belongs to.
    pub user_id: UserId,
    /// Outbound write queue consumed by the connection's writer task.
    pub sender: mpsc::UnboundedSender<Message>,
    /// When the handshake completed.
    pub connected_at: DateTime<Utc>,
    /// Last inbound activity (refreshed by heartbeats).
    pub last_seen: DateTime<Utc>,
}

impl Connection {
    /// Creates a connection record for a freshly authenticated socket.
    #[must_use]
    pub fn new(user_id: UserId, sender: mpsc::UnboundedSender<Message>) -> Self {
        let now = Utc::now();
        Self {
            id: ConnectionId::new(),
            user_id,
            sender,
            connected_at: now,
            last_seen: now,
        }
    }
}

/// Registry of live connections, keyed by user id.
///
/// Invariant: every entry's `Connection::user_id` equals its key.
/// Mutated only by connection lifecycle events; lookups are concurrent
/// with mutations from other connections.
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    connections: RwLock<HashMap<UserId, Connection>>,
}

impl ConnectionRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a connection, replacing any prior connection for the
    /// same user.
    ///
    /// The superseded socket is sent a [`CLOSE_SUPERSEDED`] Close frame
    /// so it stops receiving deliveries immediately instead of lingering
    /// as a dead entry.
    pub async fn register(&self, connection: Connection) {
        let user_id = connection.user_id.clone();
        let mut map = self.connections.write().await;
        if let Some(previous) = map.insert(user_id.clone(), connection) {
            tracing::debug!(%user_id, superseded = %previous.id, "superseding prior connection");
            let frame = CloseFrame {
                code: CLOSE_SUPERSEDED,
                reason: "superseded by newer connection".into(),
            };
            let _ = previous.sender.send(Message::Close(Some(frame)));
        }
    }

    /// Removes the mapping for `user_id` if it still points at
    /// `connection_id`.
    ///
    /// Guards against the close event of a superseded connection firing
    /// after its replacement registered. Returns `true` if an entry was
    /// removed.
    pub async fn unregister(&self, user_id: &UserId, connection_id: ConnectionId) -> bool {
        let mut map = self.connections.write().await;
        if map.get(user_id).is_some_and(|c| c.id == connection_id) {
            map.remove(user_id);
            true
        } else {
            false
        }
    }

    /// Returns the live connection for `user_id`, if any.
    pub async fn resolve(&self, user_id: &UserId) -> Option<Connection> {
        self.connections.read().await.get(user_id).cloned()
    }

    /// Refreshes the last-activity timestamp for `user_id`.
    pub async fn touch(&self, user_id: &UserId) {
        if let Some(connection) = self.connections.write().await.get_mut(user_id) {
            connection.last_seen = Utc::now();
        }
    }

    /// Returns the number of live connections.
    pub async fn len(&self) -> usize {
        self.connections.read().await.len()
    }

    /// Returns `true` if no connection is registered.
    pub async fn is_empty(&self) -> bool {
        self.connections.read().await.is_empty()
    }
}
