/// Storage contracts used by the authentication core
///
/// The gateway only talks to these traits. `PostgresStore` backs the running
/// service; `MemoryStore` serves tests and database-less local runs.

mod memory;
mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::DatabaseError;

pub use memory::MemoryStore;
pub use postgres::PostgresStore;

/// Public view of a user account
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub id: Uuid,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// What login needs to check a password. Never leaves the server.
#[derive(Debug, Clone)]
pub struct Credential {
    pub user_id: Uuid,
    pub email: String,
    pub password_hash: String,
}

/// A stored refresh token. Only the digest of the value is kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshTokenRecord {
    pub token_hash: String,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub revoked_at: Option<DateTime<Utc>>,
}

impl RefreshTokenRecord {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    pub fn is_revoked(&self) -> bool {
        self.revoked_at.is_some()
    }
}

#[async_trait]
pub trait AccountStore: Send + Sync {
    async fn create_account(&self, email: &str, password_hash: &str) -> Result<Account, DatabaseError>;
    async fn find_credential_by_email(&self, email: &str) -> Result<Option<Credential>, DatabaseError>;
    async fn find_account_by_id(&self, id: Uuid) -> Result<Option<Account>, DatabaseError>;
    /// Remove every account along with its refresh tokens, returning the
    /// number of accounts removed
    async fn delete_all_accounts(&self) -> Result<u64, DatabaseError>;
}

/// Refresh token persistence. Takes plaintext token values and is
/// responsible for hashing them before they touch storage.
#[async_trait]
pub trait RefreshTokenStore: Send + Sync {
    async fn insert(
        &self,
        token: &str,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> Result<(), DatabaseError>;
    async fn find_by_value(&self, token: &str) -> Result<Option<RefreshTokenRecord>, DatabaseError>;
    /// Revoke a token only if it is still live at `revoked_at`. Returns
    /// `false` when the token is unknown, already revoked or expired, so
    /// of two concurrent revocations exactly one observes `true`.
    async fn mark_revoked(&self, token: &str, revoked_at: DateTime<Utc>) -> Result<bool, DatabaseError>;
}
