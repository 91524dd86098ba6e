use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};

use crate::auth::AuthGateway;
use crate::error::{AppError, ErrorContext};
use crate::store::Account;

/// User registration request
#[derive(Deserialize)]
pub struct CreateUserRequest {
    pub email: String,
    pub password: String,
}

/// Public view of an account
#[derive(Serialize)]
pub struct UserResponse {
    pub id: String,
    pub email: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Account> for UserResponse {
    fn from(account: Account) -> Self {
        Self {
            id: account.id.to_string(),
            email: account.email,
            created_at: account.created_at.to_rfc3339(),
            updated_at: account.updated_at.to_rfc3339(),
        }
    }
}

/// POST /api/users
///
/// # Errors
/// - 400: invalid email or weak password
/// - 409: email already registered
pub async fn create_user(
    form: web::Json<CreateUserRequest>,
    gateway: web::Data<AuthGateway>,
) -> Result<HttpResponse, AppError> {
    let context = ErrorContext::new("user_registration");

    let account = gateway
        .register(&form.email, &form.password)
        .await
        .map_err(|e| {
            context.log_error(&e);
            e
        })?;

    tracing::info!(
        request_id = %context.request_id,
        user_id = %account.id,
        "User registered successfully"
    );

    Ok(HttpResponse::Created().json(UserResponse::from(account)))
}
