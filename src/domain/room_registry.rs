//! Tracks which users should receive race-scoped broadcasts.
//!
//! A room is the in-memory audience of one race. Membership is explicitly
//! joined (the client sends `join_race` after its join action commits)
//! and is unbounded for the lifetime of the process; a room is discarded
//! when its last member leaves or when the race finishes.

use std::collections::{HashMap, HashSet};

use tokio::sync::RwLock;

use super::{RaceId, UserId};

/// Registry of race rooms, keyed by race id.
///
/// A disconnected user's memberships are retained: delivery to an
/// offline member is already a no-op, and a reconnecting participant
/// keeps receiving broadcasts without rejoining.
#[derive(Debug, Default)]
pub struct RoomRegistry {
    rooms: RwLock<HashMap<RaceId, HashSet<UserId>>>,
}

impl RoomRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `user_id` to the room for `race_id`, creating the room on
    /// first join. Idempotent.
    pub async fn join(&self, race_id: &RaceId, user_id: &UserId) {
        let mut map = self.rooms.write().await;
        map.entry(race_id.clone())
            .or_default()
            .insert(user_id.clone());
    }

    /// Removes `user_id` from the room for `race_id`. An emptied room is
    /// discarded. No-op if the user was not a member.
    pub async fn leave(&self, race_id: &RaceId, user_id: &UserId) {
        let mut map = self.rooms.write().await;
        if let Some(members) = map.get_mut(race_id) {
            members.remove(user_id);
            if members.is_empty() {
                map.remove(race_id);
            }
        }
    }

    /// Returns the member set for `race_id`. An absent room is an empty
    /// set.
    pub async fn members_of(&self, race_id: &RaceId) -> HashSet<UserId> {
        self.rooms
            .read()
            .await
            .get(race_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Discards the room for `race_id` (race reached a terminal status).
    /// Returns `true` if a room existed.
    pub async fn remove(&self, race_id: &RaceId) -> bool {
        self.rooms.write().await.remove(race_id).is_some()
    }

    /// Returns the number of live rooms.
    pub async fn room_count(&self) -> usize {
        self.rooms.read().await.len()
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn join_adds_member() {
        let registry = RoomRegistry::new();
        let race = RaceId::new("race-42");

        registry.join(&race, &UserId::new("alice")).await;
        registry.join(&race, &UserId::new("bob")).await;

        let members = registry.members_of(&race).await;
        assert_eq!(members.len(), 2);
        assert!(members.contains(&UserId::new("alice")));
        assert!(members.contains(&UserId::new("bob")));
    }

    #[tokio::test]
    async fn join_is_idempotent() {
        let registry = RoomRegistry::new();
        let race = RaceId::new("race-42");
        let alice = UserId::new("alice");

        registry.join(&race, &alice).await;
        registry.join(&race, &alice).await;

        assert_eq!(registry.members_of(&race).await.len(), 1);
    }

    #[tokio::test]
    async fn leave_removes_member() {
        let registry = RoomRegistry::new();
        let race = RaceId::new("race-42");
        let alice = UserId::new("alice");
        let bob = UserId::new("bob");

        registry.join(&race, &alice).await;
        registry.join(&race, &bob).await;
        registry.leave(&race, &alice).await;

        let members = registry.members_of(&race).await;
        assert!(!members.contains(&alice));
        assert!(members.contains(&bob));
    }

    #[tokio::test]
    async fn last_leave_discards_room() {
        let registry = RoomRegistry::new();
        let race = RaceId::new("race-42");
        let alice = UserId::new("alice");

        registry.join(&race, &alice).await;
        assert_eq!(registry.room_count().await, 1);

        registry.leave(&race, &alice).await;
        assert_eq!(registry.room_count().await, 0);
    }

    #[tokio::test]
    async fn members_of_absent_room_is_empty() {
        let registry = RoomRegistry::new();
        assert!(
            registry
                .members_of(&RaceId::new("race-never"))
                .await
                .is_empty()
        );
    }

    #[tokio::test]
    async fn leave_unknown_room_is_noop() {
        let registry = RoomRegistry::new();
        registry
            .leave(&RaceId::new("race-never"), &UserId::new("alice"))
            .await;
        assert_eq!(registry.room_count().await, 0);
    }

    #[tokio::test]
    async fn remove_discards_room() {
        let registry = RoomRegistry::new();
        let race = RaceId::new("race-42");

        registry.join(&race, &UserId::new("alice")).await;
        assert!(registry.remove(&race).await);
        assert!(!registry.remove(&race).await);
        assert!(registry.members_of(&race).await.is_empty());
    }
}
