mod admin;
mod auth;
mod health_check;
mod users;

pub use admin::{metrics, reset};
pub use auth::{current_user, login, refresh, revoke};
pub use health_check::health_check;
pub use users::create_user;
