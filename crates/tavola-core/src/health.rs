use axum::Json;
use serde::Serialize;

/// Body returned by the health endpoints.
#[derive(Debug, Serialize)]
pub struct Health {
    pub status: &'static str,
    pub service: &'static str,
}

const SERVICE_NAME: &str = "tavola";

/// Handler for `GET /healthz` — liveness check.
pub async fn healthz() -> Json<Health> {
    Json(Health {
        status: "alive",
        service: SERVICE_NAME,
    })
}

/// Handler for `GET /readyz` — readiness check. The server only starts
/// serving after its database and search-index connections are up, so
/// reachability is readiness.
pub async fn readyz() -> Json<Health> {
    Json(Health {
        status: "ready",
        service: SERVICE_NAME,
    })
}
