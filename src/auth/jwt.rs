/// Access Token Creation and Validation
///
/// Access tokens are HS256 JWTs signed with the server secret. They are never
/// stored: a token is valid when its signature checks out, its issuer is
/// `chirpy` and it has not expired.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use std::fmt;
use uuid::Uuid;

use crate::auth::claims::Claims;

/// Issuer stamped into every access token
pub const ACCESS_TOKEN_ISSUER: &str = "chirpy";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    Expired,
    BadSignature,
    WrongIssuer,
    Malformed(String),
    Encoding(String),
}

impl fmt::Display for TokenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenError::Expired => write!(f, "Token has expired"),
            TokenError::BadSignature => write!(f, "Token signature is invalid"),
            TokenError::WrongIssuer => write!(f, "Token issuer is not accepted"),
            TokenError::Malformed(msg) => write!(f, "Malformed token: {}", msg),
            TokenError::Encoding(msg) => write!(f, "Token generation failed: {}", msg),
        }
    }
}

impl std::error::Error for TokenError {}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        match err.kind() {
            ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => TokenError::BadSignature,
            ErrorKind::ExpiredSignature => TokenError::Expired,
            ErrorKind::InvalidIssuer => TokenError::WrongIssuer,
            _ => TokenError::Malformed(err.to_string()),
        }
    }
}

/// Create an access token for `subject`, valid for `ttl` from now
pub fn create_access_token(subject: Uuid, secret: &str, ttl: Duration) -> Result<String, TokenError> {
    create_access_token_at(subject, secret, ttl, Utc::now())
}

/// Same as [`create_access_token`] with an explicit issue time
pub fn create_access_token_at(
    subject: Uuid,
    secret: &str,
    ttl: Duration,
    issued_at: DateTime<Utc>,
) -> Result<String, TokenError> {
    let claims = Claims::new(subject, ACCESS_TOKEN_ISSUER, issued_at, ttl);
    sign(&claims, secret)
}

fn sign(claims: &Claims, secret: &str) -> Result<String, TokenError> {
    encode(
        &Header::new(Algorithm::HS256),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| TokenError::Encoding(e.to_string()))
}

/// Validate an access token and return its subject
///
/// # Errors
/// - `BadSignature` if the token was not signed with `secret`
/// - `WrongIssuer` if it was signed for another namespace
/// - `Expired` once the expiry time is reached
/// - `Malformed` for anything structurally wrong, including a non-UUID subject
pub fn validate_access_token(token: &str, secret: &str) -> Result<Uuid, TokenError> {
    validate_access_token_at(token, secret, Utc::now())
}

/// Same as [`validate_access_token`] evaluated at `now`
pub fn validate_access_token_at(
    token: &str,
    secret: &str,
    now: DateTime<Utc>,
) -> Result<Uuid, TokenError> {
    let mut validation = Validation::new(Algorithm::HS256);
    // Issuer and expiry are checked below, after the signature, with no leeway
    validation.validate_exp = false;
    validation.required_spec_claims.clear();

    let claims = decode::<Claims>(token, &DecodingKey::from_secret(secret.as_bytes()), &validation)
        .map(|data| data.claims)?;

    if claims.iss != ACCESS_TOKEN_ISSUER {
        tracing::warn!(issuer = %claims.iss, "Access token issued for another namespace");
        return Err(TokenError::WrongIssuer);
    }

    if claims.is_expired_at(now) {
        return Err(TokenError::Expired);
    }

    claims.subject()
}
