use actix_web::{web, HttpResponse};

use crate::auth::AuthGateway;
use crate::configuration::ApplicationSettings;
use crate::error::AppError;
use crate::metrics::HitCounter;

/// GET /admin/metrics
pub async fn metrics(counter: web::Data<HitCounter>) -> HttpResponse {
    let body = format!(
        r#"<html>
  <body>
    <h1>Welcome, Chirpy Admin</h1>
    <p>Chirpy has been visited {} times!</p>
  </body>
</html>"#,
        counter.hits()
    );

    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(body)
}

/// POST /admin/reset
///
/// Zeroes the hit counter and deletes every account. Only available when
/// the platform is `dev`.
pub async fn reset(
    counter: web::Data<HitCounter>,
    gateway: web::Data<AuthGateway>,
    settings: web::Data<ApplicationSettings>,
) -> Result<HttpResponse, AppError> {
    if !settings.is_dev() {
        tracing::warn!(platform = %settings.platform, "Reset rejected outside dev");
        return Ok(HttpResponse::Forbidden().finish());
    }

    counter.reset();
    gateway.reset_accounts().await?;

    Ok(HttpResponse::Ok()
        .content_type("text/plain; charset=utf-8")
        .body("Hits reset to 0"))
}
