/// Authentication Routes
///
/// Login, access token refresh, refresh token revocation and the current
/// account of an access token holder.

use actix_web::{web, HttpRequest, HttpResponse};
use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::auth::{bearer_from_headers, AuthGateway};
use crate::error::{AppError, AuthError, ErrorContext};
use crate::middleware::AuthenticatedUser;
use crate::routes::users::UserResponse;

const TOKEN_TYPE: &str = "Bearer";

/// User login request
#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub expires_in_seconds: Option<i64>,
}

/// Login response with access and refresh tokens
#[derive(Serialize)]
pub struct AuthResponse {
    pub user_id: String,
    pub email: String,
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

/// Refresh response carrying only the new access token
#[derive(Serialize)]
pub struct AccessTokenResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

/// POST /api/login
///
/// # Errors
/// - 401 INVALID_CREDENTIALS: unknown email or wrong password, indistinguishable
/// - 500: token issuance failed
pub async fn login(
    form: web::Json<LoginRequest>,
    gateway: web::Data<AuthGateway>,
) -> Result<HttpResponse, AppError> {
    let context = ErrorContext::new("user_login");
    let form = form.into_inner();

    let requested_ttl = form.expires_in_seconds.and_then(Duration::try_seconds);
    let pair = gateway
        .login(&form.email, &form.password, requested_ttl)
        .await
        .map_err(|e| {
            let e = AppError::from(e);
            context.log_error(&e);
            e
        })?;

    tracing::info!(
        request_id = %context.request_id,
        user_id = %pair.user_id,
        "Tokens issued"
    );

    Ok(HttpResponse::Ok().json(AuthResponse {
        user_id: pair.user_id.to_string(),
        email: pair.email,
        access_token: pair.access_token,
        refresh_token: pair.refresh_token,
        token_type: TOKEN_TYPE.to_string(),
        expires_in: pair.expires_in,
    }))
}

/// POST /api/refresh
///
/// Takes the refresh token as `Authorization: Bearer <token>`.
///
/// # Errors
/// - 401 UNAUTHORIZED: unknown, revoked or expired refresh token
/// - 401 MISSING_TOKEN / MALFORMED_HEADER: bad Authorization header
pub async fn refresh(
    req: HttpRequest,
    gateway: web::Data<AuthGateway>,
) -> Result<HttpResponse, AppError> {
    let token = bearer_from_headers(req.headers()).map_err(AuthError::from)?;
    let grant = gateway.refresh(token).await?;

    Ok(HttpResponse::Ok().json(AccessTokenResponse {
        access_token: grant.access_token,
        token_type: TOKEN_TYPE.to_string(),
        expires_in: grant.expires_in,
    }))
}

/// POST /api/revoke
///
/// Takes the refresh token as `Authorization: Bearer <token>`. Responds
/// 204 on success; a second revocation of the same token is 401.
pub async fn revoke(
    req: HttpRequest,
    gateway: web::Data<AuthGateway>,
) -> Result<HttpResponse, AppError> {
    let token = bearer_from_headers(req.headers()).map_err(AuthError::from)?;
    gateway.revoke(token).await?;

    Ok(HttpResponse::NoContent().finish())
}

/// GET /api/me
///
/// Requires `AuthMiddleware`, which injects `AuthenticatedUser`.
pub async fn current_user(
    user: web::ReqData<AuthenticatedUser>,
    gateway: web::Data<AuthGateway>,
) -> Result<HttpResponse, AppError> {
    let AuthenticatedUser(user_id) = user.into_inner();
    let context = ErrorContext::new("current_user").with_user_id(user_id.to_string());

    let account = gateway.current_account(user_id).await.map_err(|e| {
        let e = AppError::from(e);
        context.log_error(&e);
        e
    })?;

    Ok(HttpResponse::Ok().json(UserResponse::from(account)))
}
