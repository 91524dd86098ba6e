/// Password Hashing and Verification
///
/// Argon2id hashing with a fresh random salt per call. The output is a PHC
/// string (`$argon2id$v=19$m=...,t=...,p=...$salt$hash`), so verification
/// reads every parameter back from the stored value.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use lazy_static::lazy_static;
use std::fmt;

use crate::error::ValidationError;

const MIN_PASSWORD_LENGTH: usize = 8;
const MAX_PASSWORD_LENGTH: usize = 128;

lazy_static! {
    /// Verified against when the login email is unknown
    static ref DUMMY_PASSWORD_HASH: Option<String> =
        hash_password("chirpy-unknown-account-placeholder").ok();
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PasswordError {
    Hash(String),
    Verify(String),
}

impl fmt::Display for PasswordError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PasswordError::Hash(msg) => write!(f, "Password hashing failed: {}", msg),
            PasswordError::Verify(msg) => write!(f, "Password verification failed: {}", msg),
        }
    }
}

impl std::error::Error for PasswordError {}

/// Hash a password with Argon2id
///
/// Two calls with the same input return different strings; both verify.
///
/// # Errors
/// Returns `PasswordError::Hash` if the hasher rejects the input
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| PasswordError::Hash(e.to_string()))
}

/// Verify a password against a stored PHC hash
///
/// `Ok(false)` means the password does not match. An unreadable hash is an
/// error, never a silent mismatch.
pub fn verify_password(password: &str, stored_hash: &str) -> Result<bool, PasswordError> {
    let parsed = PasswordHash::new(stored_hash).map_err(|e| PasswordError::Verify(e.to_string()))?;

    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(PasswordError::Verify(e.to_string())),
    }
}

/// Spend one verification on `password` without a stored hash
///
/// Always reports a mismatch. Returns `false` only if the placeholder hash
/// could not be produced, in which case no work was done.
pub fn verify_against_dummy(password: &str) -> bool {
    match DUMMY_PASSWORD_HASH.as_deref() {
        Some(hash) => {
            let _ = verify_password(password, hash);
            true
        }
        None => false,
    }
}

/// Validate password strength requirements for new accounts
///
/// Requirements:
/// - Minimum 8 characters
/// - Maximum 128 characters
/// - At least one digit, one lowercase and one uppercase letter
pub fn validate_password_strength(password: &str) -> Result<(), ValidationError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(ValidationError::TooShort("password", MIN_PASSWORD_LENGTH));
    }

    // Upper bound keeps hashing cost per request bounded
    if password.len() > MAX_PASSWORD_LENGTH {
        return Err(ValidationError::TooLong("password", MAX_PASSWORD_LENGTH));
    }

    let has_digit = password.chars().any(|c| c.is_numeric());
    let has_lowercase = password.chars().any(|c| c.is_lowercase());
    let has_uppercase = password.chars().any(|c| c.is_uppercase());

    if !has_digit || !has_lowercase || !has_uppercase {
        return Err(ValidationError::WeakPassword);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dummy_hash_is_a_real_argon2_hash() {
        let hash = DUMMY_PASSWORD_HASH.as_deref().expect("placeholder hash");

        assert!(hash.starts_with("$argon2id$"));
        assert_eq!(verify_password("ValidPassword123", hash), Ok(false));
        assert!(verify_against_dummy("ValidPassword123"));
    }

    #[test]
    fn test_hash_password() {
        let password = "ValidPassword123";
        let hash = hash_password(password).expect("Failed to hash password");

        assert_ne!(password, hash);
        assert!(hash.starts_with("$argon2id$"));
    }

    #[test]
    fn test_verify_password() {
        let password = "ValidPassword123";
        let hash = hash_password(password).expect("Failed to hash password");

        let is_valid = verify_password(password, &hash).expect("Failed to verify password");
        assert!(is_valid);
    }

    #[test]
    fn test_verify_wrong_password() {
        let hash = hash_password("ValidPassword123").expect("Failed to hash password");

        let is_valid = verify_password("WrongPassword123", &hash).expect("Failed to verify password");
        assert!(!is_valid);
    }

    #[test]
    fn test_hashes_are_salted() {
        let password = "ValidPassword123";
        let first = hash_password(password).expect("Failed to hash password");
        let second = hash_password(password).expect("Failed to hash password");

        assert_ne!(first, second);
        assert!(verify_password(password, &first).unwrap());
        assert!(verify_password(password, &second).unwrap());
    }

    #[test]
    fn test_garbage_hash_is_an_error() {
        let result = verify_password("ValidPassword123", "not-a-phc-string");
        assert!(matches!(result, Err(PasswordError::Verify(_))));
    }

    #[test]
    fn test_empty_password_still_hashes() {
        let hash = hash_password("").expect("Failed to hash password");
        assert!(verify_password("", &hash).unwrap());
        assert!(!verify_password(" ", &hash).unwrap());
    }

    #[test]
    fn test_too_short_password() {
        assert_eq!(
            validate_password_strength("Short1"),
            Err(ValidationError::TooShort("password", MIN_PASSWORD_LENGTH))
        );
    }

    #[test]
    fn test_too_long_password() {
        let long_password = "a".repeat(MAX_PASSWORD_LENGTH + 1) + "A1";
        assert!(validate_password_strength(&long_password).is_err());
    }

    #[test]
    fn test_missing_character_classes() {
        assert_eq!(
            validate_password_strength("NoDigitsPassword"),
            Err(ValidationError::WeakPassword)
        );
        assert!(validate_password_strength("NOLOWERCASE1").is_err());
        assert!(validate_password_strength("nouppercase1").is_err());
    }

    #[test]
    fn test_valid_password() {
        assert!(validate_password_strength("ValidPassword123").is_ok());
    }
}
