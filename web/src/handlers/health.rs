//! Health check endpoints.
//!
//! These endpoints are used by load balancers and monitoring systems
//! to verify service health.

use crate::state::AppState;
use axum::{extract::State, http::StatusCode, Json};
use starter_runtime::{HealthCheck, HealthReport};

/// Simple health check endpoint (for basic liveness).
///
/// Returns 200 OK to indicate the service is running.
/// This endpoint does NOT check dependencies.
///
/// # Endpoint
///
/// ```text
/// GET /health
/// ```
#[allow(clippy::unused_async)]
pub async fn health_check() -> (StatusCode, &'static str) {
    (StatusCode::OK, "ok")
}

/// Readiness check including the todo repository.
///
/// # Status Codes
///
/// - 200 OK: Healthy or Degraded
/// - 503 Service Unavailable: Unhealthy
///
/// # Endpoint
///
/// ```text
/// GET /health/ready
/// ```
///
/// # Response
///
/// ```json
/// {
///   "status": "Healthy",
///   "checks": [
///     { "component": "todos", "status": "Healthy", "message": null, "metadata": [["count", "3"]] }
///   ],
///   "timestamp": "2025-01-01T00:00:00Z"
/// }
/// ```
pub async fn readiness(State(state): State<AppState>) -> (StatusCode, Json<HealthReport>) {
    let todos = match state.todos.count().await {
        Ok(count) => HealthCheck::healthy("todos").with_metadata("count", count.to_string()),
        Err(error) => HealthCheck::unhealthy("todos", error.to_string()),
    };

    let report = HealthReport::new(vec![todos]);
    let status = if report.status.is_unhealthy() {
        StatusCode::SERVICE_UNAVAILABLE
    } else {
        StatusCode::OK
    };

    (status, Json(report))
}
