//! Custom Axum extractors.
//!
//! This module contains custom extractors for the todo resource:
//! - `JsonBody`: Any JSON value, parsed regardless of `Content-Type`
//! - `TodoQuery`: The `completed` and `id` query parameters
//!
//! Both reject with [`AppError`] so failures use the same JSON error body as
//! every other error.
//!
//! # Examples
//!
//! ```ignore
//! async fn handler(
//!     State(state): State<AppState>,
//!     query: TodoQuery,
//!     JsonBody(body): JsonBody,
//! ) -> Result<Json<Todo>, AppError> {
//!     let id = query.require_id()?;
//!     let changes = validate_changes(&body)?;
//!     Ok(Json(state.todos.update(id, changes).await?))
//! }
//! ```

use crate::error::AppError;
use axum::{
    async_trait,
    body::Bytes,
    extract::{FromRequest, FromRequestParts, Query, Request},
    http::{request::Parts, StatusCode},
};
use serde::Deserialize;

/// Message returned when a todo id is missing or empty
pub const ID_REQUIRED: &str = "Todo ID is required";

/// A request body parsed as an arbitrary JSON value.
///
/// Unlike `axum::Json`, the body is parsed whatever `Content-Type` says and
/// no schema is applied; validation happens afterwards so field problems can
/// be reported individually. Unparseable bodies (including an empty body)
/// are rejected with `INVALID_JSON`; bodies over the configured limit keep
/// axum's 413 status.
#[derive(Debug, Clone)]
pub struct JsonBody(pub serde_json::Value);

#[async_trait]
impl<S> FromRequest<S> for JsonBody
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state).await.map_err(|rejection| {
            tracing::debug!(error = %rejection, "Could not read request body");
            if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
                AppError::new(
                    StatusCode::PAYLOAD_TOO_LARGE,
                    "PAYLOAD_TOO_LARGE",
                    rejection.body_text(),
                )
            } else {
                AppError::invalid_json()
            }
        })?;

        serde_json::from_slice(&bytes).map(Self).map_err(|error| {
            tracing::debug!(error = %error, "Request body is not JSON");
            AppError::invalid_json()
        })
    }
}

/// Query parameters understood by the todo resource.
///
/// # Example
///
/// ```ignore
/// // GET /api/todos?completed=true
/// async fn handler(query: TodoQuery) -> Result<String, AppError> {
///     Ok(format!("{:?}", query.completed()))
/// }
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TodoQuery {
    completed: Option<String>,
    id: Option<String>,
}

impl TodoQuery {
    /// The `completed` filter.
    ///
    /// Absent means no filter. Exactly `true` selects completed todos; any
    /// other value, including an empty one, selects the incomplete ones.
    #[must_use]
    pub fn completed(&self) -> Option<bool> {
        self.completed.as_deref().map(|value| value == "true")
    }

    /// The `id` parameter, which must be present and non-empty.
    ///
    /// # Errors
    ///
    /// Returns a 400 "Todo ID is required" error otherwise.
    pub fn require_id(&self) -> Result<&str, AppError> {
        self.id
            .as_deref()
            .filter(|id| !id.is_empty())
            .ok_or_else(|| AppError::bad_request(ID_REQUIRED))
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for TodoQuery
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let Query(query) = Query::<Self>::try_from_uri(&parts.uri).map_err(|rejection| {
            AppError::bad_request(format!("Invalid query string: {}", rejection.body_text()))
        })?;
        Ok(query)
    }
}
