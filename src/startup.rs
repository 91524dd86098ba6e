use actix_files as fs;
use actix_web::dev::Server;
use actix_web::{web, App, HttpServer};
use std::net::TcpListener;

use crate::auth::AuthGateway;
use crate::configuration::ApplicationSettings;
use crate::logger::LoggerMiddleware;
use crate::metrics::{HitCounter, MetricsMiddleware};
use crate::middleware::AuthMiddleware;
use crate::routes::{
    create_user, current_user, health_check, login, metrics, refresh, reset, revoke,
};

pub fn run(
    listener: TcpListener,
    gateway: AuthGateway,
    settings: ApplicationSettings,
) -> Result<Server, std::io::Error> {
    let gateway = web::Data::new(gateway);
    let hits = web::Data::new(HitCounter::new());
    let settings = web::Data::new(settings);

    let server = HttpServer::new(move || {
        App::new()
            .wrap(LoggerMiddleware)
            // Shared state
            .app_data(gateway.clone())
            .app_data(hits.clone())
            .app_data(settings.clone())
            .service(
                web::scope("/api")
                    .route("/healthz", web::get().to(health_check))
                    .route("/users", web::post().to(create_user))
                    .route("/login", web::post().to(login))
                    .route("/refresh", web::post().to(refresh))
                    .route("/revoke", web::post().to(revoke))
                    // Protected routes (require an access token)
                    .service(
                        web::resource("/me")
                            .wrap(AuthMiddleware::new(gateway.clone()))
                            .route(web::get().to(current_user)),
                    ),
            )
            .service(
                web::scope("/admin")
                    .route("/metrics", web::get().to(metrics))
                    .route("/reset", web::post().to(reset)),
            )
            .service(
                web::scope("/app")
                    .wrap(MetricsMiddleware::new(hits.clone()))
                    .service(fs::Files::new("", &settings.static_dir).index_file("index.html")),
            )
    })
    .listen(listener)?
    .run();

    Ok(server)
}
