/// Health check and service info routes
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: DateTime<Utc>,
    pub service: &'static str,
}

#[derive(Debug, Serialize)]
pub struct RootResponse {
    pub message: &'static str,
    pub version: &'static str,
    pub status: &'static str,
    pub timestamp: DateTime<Utc>,
}

/// GET /api/auth/health - liveness only, touches no dependency
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        timestamp: Utc::now(),
        service: "auth-service",
    })
}

/// GET /
pub async fn root() -> Json<RootResponse> {
    Json(RootResponse {
        message: "BetNad Backend API",
        version: env!("CARGO_PKG_VERSION"),
        status: "running",
        timestamp: Utc::now(),
    })
}
