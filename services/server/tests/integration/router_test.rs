//! Router-level smoke tests against a mock database: routing, session
//! gating, and the error body shape.

use std::sync::Arc;

use axum_test::TestServer;
use sea_orm::{DatabaseBackend, MockDatabase};

use tavola_server::config::ServerConfig;
use tavola_server::router::build_router;
use tavola_server::state::AppState;

fn test_config() -> ServerConfig {
    ServerConfig {
        database_url: "postgres://unused".to_owned(),
        session_secret: "test-session-secret".to_owned(),
        cookie_domain: "test.local".to_owned(),
        server_port: 0,
        mail_api_url: "http://mail.test/send".to_owned(),
        mail_api_key: "unused".to_owned(),
        mail_from: "no-reply@test.local".to_owned(),
        storage_api_url: "http://storage.test".to_owned(),
        storage_api_key: "unused".to_owned(),
        storage_bucket: "recipe-images".to_owned(),
        transcode_api_url: "http://transcode.test/resize".to_owned(),
        transcode_timeout_secs: 15,
        meili_url: "http://meili.test".to_owned(),
        meili_key: "unused".to_owned(),
    }
}

fn test_server() -> TestServer {
    let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
    let state = AppState {
        db,
        http: reqwest::Client::new(),
        transcode_http: reqwest::Client::new(),
        meili: Arc::new(
            meilisearch_sdk::client::Client::new("http://meili.test", Some("unused")).unwrap(),
        ),
        config: test_config(),
    };
    TestServer::new(build_router(state)).unwrap()
}

#[tokio::test]
async fn should_answer_health_checks() {
    let server = test_server();
    server.get("/healthz").await.assert_status_ok();
    server.get("/readyz").await.assert_status_ok();
}

#[tokio::test]
async fn should_require_a_session_for_account_routes() {
    let server = test_server();
    let response = server.get("/account").await;
    response.assert_status(axum::http::StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn should_require_a_session_for_recipe_mutations() {
    let server = test_server();
    let response = server
        .post("/recipes")
        .json(&serde_json::json!({
            "title": "Focaccia",
            "prep_minutes": 45,
            "visibility": "PUBLIC",
        }))
        .await;
    response.assert_status(axum::http::StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn should_reject_non_uuid_recipe_ids() {
    let server = test_server();
    let response = server.get("/recipes/not-a-uuid").await;
    response.assert_status(axum::http::StatusCode::BAD_REQUEST);
}
