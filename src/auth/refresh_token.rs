/// Refresh Token Generation
///
/// Refresh tokens are:
/// - 32 bytes from the operating system's CSPRNG, hex encoded (64 chars)
/// - Opaque to clients
/// - Stored only as a SHA-256 digest

use rand::rngs::OsRng;
use rand::RngCore;
use sha2::{Digest, Sha256};
use std::fmt;

const REFRESH_TOKEN_BYTES: usize = 32;

/// The secure random source could not produce bytes
#[derive(Debug)]
pub struct EntropyError(pub String);

impl fmt::Display for EntropyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Secure random source unavailable: {}", self.0)
    }
}

impl std::error::Error for EntropyError {}

/// Generate a new refresh token value
///
/// # Errors
/// Returns `EntropyError` if the OS random source fails. There is no
/// fallback generator.
pub fn generate_refresh_token() -> Result<String, EntropyError> {
    let mut bytes = [0u8; REFRESH_TOKEN_BYTES];
    OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(|e| EntropyError(e.to_string()))?;

    Ok(hex::encode(bytes))
}

/// Digest of a refresh token, used as its storage key
pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_refresh_token() {
        let token = generate_refresh_token().expect("Failed to generate token");

        assert_eq!(token.len(), REFRESH_TOKEN_BYTES * 2);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_tokens_are_unique() {
        let first = generate_refresh_token().unwrap();
        let second = generate_refresh_token().unwrap();

        assert_ne!(first, second);
    }

    #[test]
    fn test_token_hashing() {
        let token = generate_refresh_token().unwrap();
        let hash1 = hash_token(&token);
        let hash2 = hash_token(&token);

        assert_eq!(hash1, hash2);
        assert_ne!(token, hash1);
        assert_eq!(hash1.len(), 64);
    }

    #[test]
    fn test_different_tokens_different_hashes() {
        let hash1 = hash_token(&generate_refresh_token().unwrap());
        let hash2 = hash_token(&generate_refresh_token().unwrap());

        assert_ne!(hash1, hash2);
    }
}
