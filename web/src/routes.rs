//! Router construction.

use crate::error::AppError;
use crate::handlers;
use crate::middleware::correlation_id_layer;
use crate::state::AppState;
use axum::{http::HeaderValue, routing::get, Router};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Build the application router.
///
/// Routes:
/// - `GET /health`, `GET /health/ready`
/// - `GET /{base}/hello`
/// - `GET|POST|PUT|DELETE /{base}/todos`
///
/// `{base}` is `config.api.base_path` (default `/api`).
pub fn build_router(state: AppState) -> Router {
    let api = Router::new()
        .route("/hello", get(handlers::hello))
        .route(
            "/todos",
            get(handlers::list_todos)
                .post(handlers::create_todo)
                .put(handlers::update_todo)
                .delete(handlers::delete_todo),
        );

    let base_path = state.config.api.base_path.clone();
    let router = Router::new()
        .route("/health", get(handlers::health_check))
        .route("/health/ready", get(handlers::readiness));

    let router = if base_path.is_empty() {
        router.merge(api)
    } else {
        router.nest(&base_path, api)
    };

    let router = match cors_layer(&state.config.api.cors_allowed_origins) {
        Some(cors) => router.layer(cors),
        None => router,
    };

    router
        .fallback(|| async { AppError::not_found("Route not found") })
        .layer(TraceLayer::new_for_http())
        .layer(correlation_id_layer())
        .with_state(state)
}

/// CORS for the configured origins; `None` keeps the API same-origin only.
fn cors_layer(origins: &[String]) -> Option<CorsLayer> {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(%origin, "Ignoring invalid CORS origin");
                None
            },
        })
        .collect();

    if origins.is_empty() {
        return None;
    }

    Some(
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(tower_http::cors::Any)
            .allow_headers(tower_http::cors::Any),
    )
}
