/// In-process store backed by mutex-guarded maps
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use uuid::Uuid;

use super::{Account, AccountStore, Credential, RefreshTokenRecord, RefreshTokenStore};
use crate::auth::hash_token;
use crate::error::DatabaseError;

#[derive(Default)]
struct Tables {
    accounts: HashMap<Uuid, (Account, String)>,
    refresh_tokens: HashMap<String, RefreshTokenRecord>,
}

/// Clones share the same tables
#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Tables>, DatabaseError> {
        self.tables
            .lock()
            .map_err(|_| DatabaseError::UnexpectedError("memory store lock poisoned".to_string()))
    }

    /// Drop an account and, like the Postgres cascade, its refresh tokens
    pub fn delete_account(&self, id: Uuid) -> Result<(), DatabaseError> {
        let mut tables = self.lock()?;
        tables.accounts.remove(&id);
        tables.refresh_tokens.retain(|_, record| record.user_id != id);
        Ok(())
    }
}

#[async_trait]
impl AccountStore for MemoryStore {
    async fn create_account(&self, email: &str, password_hash: &str) -> Result<Account, DatabaseError> {
        let mut tables = self.lock()?;

        if tables.accounts.values().any(|(account, _)| account.email == email) {
            return Err(DatabaseError::UniqueConstraintViolation(
                "Email already registered".to_string(),
            ));
        }

        let now = Utc::now();
        let account = Account {
            id: Uuid::new_v4(),
            email: email.to_string(),
            created_at: now,
            updated_at: now,
        };
        tables
            .accounts
            .insert(account.id, (account.clone(), password_hash.to_string()));

        Ok(account)
    }

    async fn find_credential_by_email(&self, email: &str) -> Result<Option<Credential>, DatabaseError> {
        let tables = self.lock()?;

        Ok(tables
            .accounts
            .values()
            .find(|(account, _)| account.email == email)
            .map(|(account, password_hash)| Credential {
                user_id: account.id,
                email: account.email.clone(),
                password_hash: password_hash.clone(),
            }))
    }

    async fn find_account_by_id(&self, id: Uuid) -> Result<Option<Account>, DatabaseError> {
        let tables = self.lock()?;
        Ok(tables.accounts.get(&id).map(|(account, _)| account.clone()))
    }

    async fn delete_all_accounts(&self) -> Result<u64, DatabaseError> {
        let mut tables = self.lock()?;
        let removed = tables.accounts.len() as u64;
        tables.accounts.clear();
        tables.refresh_tokens.clear();
        Ok(removed)
    }
}

#[async_trait]
impl RefreshTokenStore for MemoryStore {
    async fn insert(
        &self,
        token: &str,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> Result<(), DatabaseError> {
        let mut tables = self.lock()?;
        let token_hash = hash_token(token);

        if tables.refresh_tokens.contains_key(&token_hash) {
            return Err(DatabaseError::UniqueConstraintViolation(
                "refresh token already stored".to_string(),
            ));
        }

        tables.refresh_tokens.insert(
            token_hash.clone(),
            RefreshTokenRecord {
                token_hash,
                user_id,
                created_at: Utc::now(),
                expires_at,
                revoked_at: None,
            },
        );

        Ok(())
    }

    async fn find_by_value(&self, token: &str) -> Result<Option<RefreshTokenRecord>, DatabaseError> {
        let tables = self.lock()?;
        Ok(tables.refresh_tokens.get(&hash_token(token)).cloned())
    }

    async fn mark_revoked(&self, token: &str, revoked_at: DateTime<Utc>) -> Result<bool, DatabaseError> {
        let mut tables = self.lock()?;

        match tables.refresh_tokens.get_mut(&hash_token(token)) {
            Some(record) if !record.is_revoked() && !record.is_expired_at(revoked_at) => {
                record.revoked_at = Some(revoked_at);
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let store = MemoryStore::new();
        store.create_account("a@example.com", "hash").await.unwrap();

        let result = store.create_account("a@example.com", "hash").await;
        assert!(matches!(result, Err(DatabaseError::UniqueConstraintViolation(_))));
    }

    #[tokio::test]
    async fn test_refresh_tokens_stored_by_digest() {
        let store = MemoryStore::new();
        let user_id = Uuid::new_v4();
        let expires_at = Utc::now() + Duration::days(1);

        store.insert("plain-value", user_id, expires_at).await.unwrap();

        let record = store.find_by_value("plain-value").await.unwrap().expect("record");
        assert_eq!(record.user_id, user_id);
        assert_eq!(record.token_hash, hash_token("plain-value"));
        assert!(store.find_by_value("other-value").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_only_first_revocation_applies() {
        let store = MemoryStore::new();
        store
            .insert("t", Uuid::new_v4(), Utc::now() + Duration::days(1))
            .await
            .unwrap();

        let first = Utc::now();
        assert!(store.mark_revoked("t", first).await.unwrap());
        assert!(!store.mark_revoked("t", first + Duration::hours(1)).await.unwrap());

        let record = store.find_by_value("t").await.unwrap().unwrap();
        assert_eq!(record.revoked_at, Some(first));
    }

    #[tokio::test]
    async fn test_expired_or_unknown_tokens_are_not_revoked() {
        let store = MemoryStore::new();
        let expires_at = Utc::now() + Duration::minutes(5);
        store.insert("t", Uuid::new_v4(), expires_at).await.unwrap();

        assert!(!store.mark_revoked("t", expires_at).await.unwrap());
        assert!(!store.mark_revoked("missing", Utc::now()).await.unwrap());

        let record = store.find_by_value("t").await.unwrap().unwrap();
        assert!(!record.is_revoked());
    }

    #[tokio::test]
    async fn test_delete_account_drops_its_tokens() {
        let store = MemoryStore::new();
        let account = store.create_account("a@example.com", "hash").await.unwrap();
        store
            .insert("t", account.id, Utc::now() + Duration::days(1))
            .await
            .unwrap();

        store.delete_account(account.id).unwrap();

        assert!(store.find_account_by_id(account.id).await.unwrap().is_none());
        assert!(store.find_by_value("t").await.unwrap().is_none());
    }
}
