//! Integration tests for the public, unauthenticated endpoints

use std::net::TcpListener;
use std::sync::Arc;

use chirpy::auth::AuthGateway;
use chirpy::configuration::{ApplicationSettings, AuthSettings};
use chirpy::startup::run;
use chirpy::store::MemoryStore;

fn spawn_app(platform: &str) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();

    let store = Arc::new(MemoryStore::new());
    let gateway = AuthGateway::new(store.clone(), store, AuthSettings::new("health-check-secret"));
    let settings = ApplicationSettings {
        host: "127.0.0.1".to_string(),
        port,
        platform: platform.to_string(),
        static_dir: concat!(env!("CARGO_MANIFEST_DIR"), "/public").to_string(),
    };

    let server = run(listener, gateway, settings).expect("Failed to create server");
    let _ = tokio::spawn(async move {
        let _ = server.await;
    });

    format!("http://127.0.0.1:{}", port)
}

#[tokio::test]
async fn health_check_works() {
    let addr = spawn_app("prod");

    let response = reqwest::Client::new()
        .get(&format!("{}/api/healthz", addr))
        .send()
        .await
        .expect("Failed to execute request");

    assert!(response.status().is_success());
    assert!(response.headers().get("x-request-id").is_some());
    assert_eq!(response.text().await.unwrap(), "OK");
}

#[tokio::test]
async fn static_files_are_served_and_counted() {
    let addr = spawn_app("dev");
    let client = reqwest::Client::new();

    for _ in 0..3 {
        let response = client
            .get(&format!("{}/app/", addr))
            .send()
            .await
            .expect("Failed to execute request");
        assert_eq!(200, response.status().as_u16());
    }

    // not counted
    client
        .get(&format!("{}/api/healthz", addr))
        .send()
        .await
        .expect("Failed to execute request");

    let body = client
        .get(&format!("{}/admin/metrics", addr))
        .send()
        .await
        .expect("Failed to execute request")
        .text()
        .await
        .unwrap();

    assert!(body.contains("visited 3 times"), "unexpected metrics page: {}", body);
}

#[tokio::test]
async fn reset_clears_hits_in_dev() {
    let addr = spawn_app("dev");
    let client = reqwest::Client::new();

    client
        .get(&format!("{}/app/", addr))
        .send()
        .await
        .expect("Failed to execute request");

    let response = client
        .post(&format!("{}/admin/reset", addr))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(200, response.status().as_u16());

    let body = client
        .get(&format!("{}/admin/metrics", addr))
        .send()
        .await
        .expect("Failed to execute request")
        .text()
        .await
        .unwrap();
    assert!(body.contains("visited 0 times"));
}

#[tokio::test]
async fn reset_is_forbidden_outside_dev() {
    let addr = spawn_app("prod");

    let response = reqwest::Client::new()
        .post(&format!("{}/admin/reset", addr))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(403, response.status().as_u16());
}
