//! Domain layer: identifiers, notification events, and the two
//! in-memory registries.
//!
//! Nothing here is durable. Registry state lives exactly as long as the
//! process; after a restart every client reconnects and rejoins its rooms.

pub mod connection_registry;
pub mod event;
pub mod ids;
pub mod room_registry;

pub use connection_registry::{Connection, ConnectionId, ConnectionRegistry};
pub use event::{FriendRef, NotificationEvent};
pub use ids::{RaceId, UserId};
pub use room_registry::RoomRegistry;
