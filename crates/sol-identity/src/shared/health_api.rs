//! Health Check Endpoints
//!
//! Standard health endpoints for Kubernetes probes and monitoring.
//! - /health - Combined health status
//! - /health/live - Liveness probe
//! - /health/ready - Readiness probe
//!
//! The gateway holds no local state, so readiness equals liveness here;
//! Auth0 reachability is checked per request, not probed.

use axum::{http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

/// Health status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum HealthStatus {
    /// Service is healthy
    Up,
    /// Service is unhealthy
    Down,
}

/// Health response
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub timestamp: DateTime<Utc>,
    pub version: &'static str,
}

async fn health() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: HealthStatus::Up,
            timestamp: Utc::now(),
            version: env!("CARGO_PKG_VERSION"),
        }),
    )
}

async fn live() -> StatusCode {
    StatusCode::OK
}

async fn ready() -> StatusCode {
    StatusCode::OK
}

/// Create the health check router.
pub fn health_router() -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/health/live", get(live))
        .route("/health/ready", get(ready))
}
