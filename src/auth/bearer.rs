/// `Authorization: Bearer <token>` parsing

use actix_web::http::header::{HeaderMap, AUTHORIZATION};
use std::fmt;

pub const BEARER_SCHEME: &str = "Bearer";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BearerError {
    MissingHeader,
    Malformed,
}

impl fmt::Display for BearerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BearerError::MissingHeader => write!(f, "Authorization header is missing"),
            BearerError::Malformed => write!(f, "Malformed authorization header"),
        }
    }
}

impl std::error::Error for BearerError {}

/// Extract the token from an Authorization header value
///
/// The value must be exactly two whitespace separated fields, the first
/// being `Bearer` (case-sensitive). A missing or empty header is
/// `MissingHeader`; anything else that does not fit is `Malformed`.
pub fn extract_bearer(header: Option<&str>) -> Result<&str, BearerError> {
    let value = match header {
        Some(v) if !v.is_empty() => v,
        _ => return Err(BearerError::MissingHeader),
    };

    let mut fields = value.split_whitespace();
    match (fields.next(), fields.next(), fields.next()) {
        (Some(BEARER_SCHEME), Some(token), None) => Ok(token),
        _ => Err(BearerError::Malformed),
    }
}

/// Raw Authorization header value; non-ASCII values count as malformed
pub fn authorization_value(headers: &HeaderMap) -> Result<Option<&str>, BearerError> {
    headers
        .get(AUTHORIZATION)
        .map(|value| value.to_str().map_err(|_| BearerError::Malformed))
        .transpose()
}

/// Bearer token from request headers
pub fn bearer_from_headers(headers: &HeaderMap) -> Result<&str, BearerError> {
    extract_bearer(authorization_value(headers)?)
}
