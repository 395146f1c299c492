//! WebSocket layer: authenticated upgrade, per-connection actor, and
//! inbound message types.
//!
//! The endpoint at `/ws` is the only client-facing surface. Each
//! connection authenticates during the upgrade and then runs an actor
//! with an independent write queue, so one slow client never stalls
//! delivery to another.

pub mod connection;
pub mod handler;
pub mod messages;
