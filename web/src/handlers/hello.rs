//! Greeting endpoint used to check that the API is reachable.

use crate::state::AppState;
use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Greeting message
pub const HELLO_MESSAGE: &str = "Hello from the API!";

/// Response of `GET /api/hello`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HelloResponse {
    /// Always [`HELLO_MESSAGE`]
    pub message: String,
    /// Server time the response was produced
    pub timestamp: DateTime<Utc>,
}

/// `GET /api/hello`
#[allow(clippy::unused_async)]
pub async fn hello(State(state): State<AppState>) -> Json<HelloResponse> {
    Json(HelloResponse {
        message: HELLO_MESSAGE.to_string(),
        timestamp: state.clock.now(),
    })
}
