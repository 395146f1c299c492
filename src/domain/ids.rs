//! Type-safe identifiers for users and races.
//!
//! The platform's auth service issues user ids and the race service issues
//! race ids; both are opaque strings to the gateway. Newtype wrappers keep
//! the two from being confused with each other or with raw strings.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of an authenticated platform user.
///
/// Opaque to the gateway: taken verbatim from the `sub` claim of a
/// verified token, and used as the key of the
/// [`super::ConnectionRegistry`] and as a room member.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// Wraps a raw user identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for UserId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for UserId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Identifier of a race, used as the key of the
/// [`super::RoomRegistry`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RaceId(String);

impl RaceId {
    /// Wraps a raw race identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for RaceId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for RaceId {
    fn from(id: String) -> Self {
        Self(id)
    }
}
