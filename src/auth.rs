//! Token verification for the socket handshake.
//!
//! The gateway never issues tokens: clients present the same HS256 JWT
//! they use against the platform's HTTP API, and the gateway only
//! verifies signature and expiry before admitting the connection.

use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};

use crate::domain::UserId;

/// Claims carried by a platform access token.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// User id the token was issued to.
    pub sub: String,
    /// Issued-at (unix seconds).
    pub iat: i64,
    /// Expiry (unix seconds).
    pub exp: i64,
}

/// Identity derived once per connection from a verified token.
///
/// Keys the connection registry and authorizes room joins: a client can
/// only act as the user its token names.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthContext {
    /// The authenticated user.
    pub user_id: UserId,
    /// When the token was issued.
    pub issued_at: DateTime<Utc>,
    /// When the token expires.
    pub expires_at: DateTime<Utc>,
}

/// Why a token was rejected. Mapped to a WebSocket close code by the
/// upgrade handler; never surfaced to any other component.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    /// The token's signature was valid but it has expired.
    #[error("token expired")]
    Expired,
    /// The token was malformed, had a bad signature, or named no user.
    #[error("token invalid")]
    Invalid,
}

/// Verifies platform access tokens against the shared HS256 secret.
pub struct TokenVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenVerifier {
    /// Creates a verifier for tokens signed with `secret`.
    #[must_use]
    pub fn new(secret: &[u8]) -> Self {
        Self {
            decoding_key: DecodingKey::from_secret(secret),
            validation: Validation::new(Algorithm::HS256),
        }
    }

    /// Verifies a token and derives its [`AuthContext`].
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Expired`] for a well-signed but expired
    /// token, [`AuthError::Invalid`] for anything else.
    pub fn verify(&self, token: &str) -> Result<AuthContext, AuthError> {
        let data =
            decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|err| {
                match err.kind() {
                    jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::Expired,
                    _ => AuthError::Invalid,
                }
            })?;

        if data.claims.sub.is_empty() {
            return Err(AuthError::Invalid);
        }

        Ok(AuthContext {
            user_id: UserId::new(data.claims.sub),
            issued_at: DateTime::from_timestamp(data.claims.iat, 0).unwrap_or_default(),
            expires_at: DateTime::from_timestamp(data.claims.exp, 0).unwrap_or_default(),
        })
    }
}

impl std::fmt::Debug for TokenVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenVerifier").finish_non_exhaustive()
    }
}
