/// Access token claims
///
/// Registered JWT claims only (RFC 7519): issuer, subject, issued-at and
/// expiry, all timestamps in Unix seconds (UTC).

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::jwt::TokenError;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    /// Issuer, the token namespace
    pub iss: String,
    /// Subject (account id as UUID string)
    pub sub: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl Claims {
    /// Build claims for `subject`, valid from `issued_at` for `ttl`
    pub fn new(subject: Uuid, issuer: &str, issued_at: DateTime<Utc>, ttl: Duration) -> Self {
        let iat = issued_at.timestamp();
        Self {
            iss: issuer.to_string(),
            sub: subject.to_string(),
            iat,
            exp: iat.saturating_add(ttl.num_seconds()),
        }
    }

    /// Parse the subject back into an account id
    ///
    /// # Errors
    /// `TokenError::Malformed` if the subject is not a UUID
    pub fn subject(&self) -> Result<Uuid, TokenError> {
        Uuid::parse_str(&self.sub)
            .map_err(|_| TokenError::Malformed("subject is not a valid account id".to_string()))
    }

    /// A token is usable only while `now < exp`
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now.timestamp() >= self.exp
    }
}
