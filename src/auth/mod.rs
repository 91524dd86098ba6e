/// Authentication module
///
/// Password hashing, access token (JWT) creation and validation, refresh
/// token generation, bearer header parsing, and the gateway tying them to
/// the stores.

mod bearer;
mod claims;
mod gateway;
mod jwt;
mod password;
mod refresh_token;

pub use bearer::{authorization_value, bearer_from_headers, extract_bearer, BearerError};
pub use claims::Claims;
pub use gateway::{AccessGrant, AuthGateway, TokenPair};
pub use jwt::{
    create_access_token, create_access_token_at, validate_access_token, validate_access_token_at,
    TokenError, ACCESS_TOKEN_ISSUER,
};
pub use password::{
    hash_password, validate_password_strength, verify_against_dummy, verify_password, PasswordError,
};
pub use refresh_token::{generate_refresh_token, hash_token, EntropyError};
