use std::sync::Arc;
use std::time::Duration;

use meilisearch_sdk::client::Client as MeiliClient;
use sea_orm::Database;
use tracing::info;

use tavola_core::tracing::init_tracing;
use tavola_server::config::ServerConfig;
use tavola_server::infra::search::init_indexes;
use tavola_server::router::build_router;
use tavola_server::state::AppState;

#[tokio::main]
async fn main() {
    init_tracing();

    let config = ServerConfig::from_env();

    let db = Database::connect(&config.database_url)
        .await
        .expect("failed to connect to database");

    let http = reqwest::Client::new();
    let transcode_http = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.transcode_timeout_secs))
        .build()
        .expect("failed to build transcode http client");

    let meili = Arc::new(
        MeiliClient::new(&config.meili_url, Some(&config.meili_key))
            .expect("failed to build meilisearch client"),
    );
    init_indexes(&meili)
        .await
        .expect("failed to configure search indexes");

    let state = AppState {
        db,
        http,
        transcode_http,
        meili,
        config: config.clone(),
    };

    let router = build_router(state);
    let http_addr = format!("0.0.0.0:{}", config.server_port);
    let listener = tokio::net::TcpListener::bind(&http_addr)
        .await
        .expect("failed to bind");

    info!("tavola server listening on {http_addr}");
    axum::serve(listener, router).await.expect("server error");
}
