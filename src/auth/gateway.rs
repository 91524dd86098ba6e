/// Authentication gateway
///
/// Orchestrates the session lifecycle on top of the account and refresh token
/// stores:
/// - login: verify password, issue an access/refresh token pair
/// - refresh: trade a live refresh token for a new access token
/// - revoke: retire a live refresh token
/// - authenticate: bearer header to account id for protected handlers
///
/// Refresh token state is read from the store on every call.

use chrono::{Duration, Utc};
use std::sync::Arc;
use uuid::Uuid;

use crate::auth::bearer::extract_bearer;
use crate::auth::jwt::{create_access_token, validate_access_token};
use crate::auth::password::{
    hash_password, validate_password_strength, verify_against_dummy, verify_password, PasswordError,
};
use crate::auth::refresh_token::generate_refresh_token;
use crate::configuration::AuthSettings;
use crate::error::{AppError, AuthError};
use crate::store::{Account, AccountStore, RefreshTokenRecord, RefreshTokenStore};
use crate::validators::is_valid_email;

/// Result of a successful login
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub user_id: Uuid,
    pub email: String,
    pub access_token: String,
    pub refresh_token: String,
    /// Access token lifetime in seconds
    pub expires_in: i64,
}

/// Result of a successful refresh
#[derive(Debug, Clone)]
pub struct AccessGrant {
    pub access_token: String,
    pub expires_in: i64,
}

#[derive(Clone)]
pub struct AuthGateway {
    accounts: Arc<dyn AccountStore>,
    refresh_tokens: Arc<dyn RefreshTokenStore>,
    settings: AuthSettings,
}

impl AuthGateway {
    pub fn new(
        accounts: Arc<dyn AccountStore>,
        refresh_tokens: Arc<dyn RefreshTokenStore>,
        settings: AuthSettings,
    ) -> Self {
        Self {
            accounts,
            refresh_tokens,
            settings,
        }
    }

    /// Create an account with a hashed password
    ///
    /// # Errors
    /// - `Validation` for a bad email or weak password
    /// - `Database(UniqueConstraintViolation)` if the email is taken
    pub async fn register(&self, email: &str, password: &str) -> Result<Account, AppError> {
        let email = is_valid_email(email)?;
        validate_password_strength(password)?;

        let password_hash = run_blocking({
            let password = password.to_string();
            move || hash_password(&password)
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;

        let account = self.accounts.create_account(&email, &password_hash).await?;
        tracing::info!(user_id = %account.id, "Account created");
        Ok(account)
    }

    /// Verify credentials and issue an access/refresh token pair
    ///
    /// Unknown email, wrong password and an unverifiable stored hash all
    /// return `InvalidCredentials`. `requested_ttl` can only shorten the
    /// access token lifetime.
    pub async fn login(
        &self,
        email: &str,
        password: &str,
        requested_ttl: Option<Duration>,
    ) -> Result<TokenPair, AuthError> {
        let credential = match self.accounts.find_credential_by_email(email.trim()).await? {
            Some(credential) => credential,
            None => {
                let password = password.to_string();
                let _ = tokio::task::spawn_blocking(move || verify_against_dummy(&password)).await;

                tracing::info!("Login attempt for unknown account");
                return Err(AuthError::InvalidCredentials);
            }
        };

        let verified = run_blocking({
            let password = password.to_string();
            let stored = credential.password_hash.clone();
            move || verify_password(&password, &stored)
        })
        .await;

        match verified {
            Ok(true) => {}
            Ok(false) => {
                tracing::warn!(user_id = %credential.user_id, "Login with wrong password");
                return Err(AuthError::InvalidCredentials);
            }
            Err(e) => {
                tracing::error!(
                    user_id = %credential.user_id,
                    error = %e,
                    "Stored password hash could not be verified"
                );
                return Err(AuthError::InvalidCredentials);
            }
        }

        let access_ttl = self.access_ttl_for(requested_ttl);
        let access_token = create_access_token(credential.user_id, &self.settings.jwt_secret, access_ttl)
            .map_err(|e| AuthError::Internal(e.to_string()))?;

        let refresh_token = generate_refresh_token().map_err(|e| AuthError::Internal(e.to_string()))?;
        let expires_at = Utc::now()
            .checked_add_signed(self.settings.refresh_token_ttl())
            .ok_or_else(|| AuthError::Internal("refresh token expiry out of range".to_string()))?;
        self.refresh_tokens
            .insert(&refresh_token, credential.user_id, expires_at)
            .await?;

        tracing::info!(user_id = %credential.user_id, "User logged in");

        Ok(TokenPair {
            user_id: credential.user_id,
            email: credential.email,
            access_token,
            refresh_token,
            expires_in: access_ttl.num_seconds(),
        })
    }

    /// Issue a new access token for the owner of a live refresh token
    ///
    /// The refresh token is neither rotated nor extended.
    pub async fn refresh(&self, refresh_token: &str) -> Result<AccessGrant, AuthError> {
        let record = self.live_refresh_token(refresh_token).await?;

        let ttl = self.settings.access_token_ttl();
        let access_token = create_access_token(record.user_id, &self.settings.jwt_secret, ttl)
            .map_err(|e| AuthError::Internal(e.to_string()))?;

        tracing::info!(user_id = %record.user_id, "Access token refreshed");

        Ok(AccessGrant {
            access_token,
            expires_in: ttl.num_seconds(),
        })
    }

    /// Revoke a live refresh token
    ///
    /// Revoking an unknown, expired or already revoked token is
    /// `Unauthorized`, not a silent success.
    pub async fn revoke(&self, refresh_token: &str) -> Result<(), AuthError> {
        let record = self.live_refresh_token(refresh_token).await?;

        if !self.refresh_tokens.mark_revoked(refresh_token, Utc::now()).await? {
            tracing::warn!(user_id = %record.user_id, "Refresh token revoked concurrently");
            return Err(AuthError::Unauthorized);
        }

        tracing::info!(user_id = %record.user_id, "Refresh token revoked");
        Ok(())
    }

    /// Resolve an Authorization header value to the caller's account id
    pub fn authenticate(&self, header: Option<&str>) -> Result<Uuid, AuthError> {
        let token = extract_bearer(header)?;
        let subject = validate_access_token(token, &self.settings.jwt_secret)?;
        Ok(subject)
    }

    /// Account behind an authenticated subject
    pub async fn current_account(&self, subject: Uuid) -> Result<Account, AuthError> {
        match self.accounts.find_account_by_id(subject).await? {
            Some(account) => Ok(account),
            None => {
                tracing::warn!(user_id = %subject, "Valid access token for a missing account");
                Err(AuthError::Unauthorized)
            }
        }
    }

    /// Delete every account and, through the cascade, every refresh token
    pub async fn reset_accounts(&self) -> Result<u64, AppError> {
        let removed = self.accounts.delete_all_accounts().await?;
        tracing::warn!(removed = removed, "All accounts deleted");
        Ok(removed)
    }

    /// Look up a refresh token and reject it unless it is still live.
    /// The three rejection causes are only distinguished in the logs.
    async fn live_refresh_token(&self, token: &str) -> Result<RefreshTokenRecord, AuthError> {
        let now = Utc::now();

        match self.refresh_tokens.find_by_value(token).await? {
            None => {
                tracing::warn!("Refresh token not found");
                Err(AuthError::Unauthorized)
            }
            Some(record) if record.is_revoked() => {
                tracing::warn!(user_id = %record.user_id, "Attempt to use revoked refresh token");
                Err(AuthError::Unauthorized)
            }
            Some(record) if record.is_expired_at(now) => {
                tracing::info!(user_id = %record.user_id, "Refresh token expired");
                Err(AuthError::Unauthorized)
            }
            Some(record) => Ok(record),
        }
    }

    /// Requested lifetimes in `(0, default]` are honoured; anything else
    /// falls back to the configured default.
    fn access_ttl_for(&self, requested: Option<Duration>) -> Duration {
        let default = self.settings.access_token_ttl();
        match requested {
            Some(ttl) if ttl > Duration::zero() && ttl <= default => ttl,
            _ => default,
        }
    }
}

/// Run CPU-heavy password work off the async workers
async fn run_blocking<T, F>(work: F) -> Result<T, PasswordError>
where
    F: FnOnce() -> Result<T, PasswordError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| PasswordError::Hash(format!("password worker failed: {}", e)))?
}
