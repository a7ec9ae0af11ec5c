//! Typed HTTP client for the todo API.
//!
//! Every call has a timeout. Non-2xx responses become an [`ApiError`]
//! carrying the status and the server's message; a timeout becomes status
//! 408 and any other transport failure status 500.

use crate::config::Config;
use crate::handlers::{DeleteResponse, HelloResponse};
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use starter_todos::{Todo, TodoChanges};
use std::time::Duration;
use thiserror::Error;

/// Failure of an API call
#[derive(Error, Debug)]
#[error("{message} (status {status})")]
pub struct ApiError {
    /// HTTP status (408 for timeouts, 500 for transport failures)
    pub status: u16,
    /// Server-provided message, or a description of the failure
    pub message: String,
    /// Parsed error body, when the server sent JSON
    pub data: Option<Value>,
}

impl ApiError {
    fn transport(error: &reqwest::Error) -> Self {
        if error.is_timeout() {
            Self {
                status: StatusCode::REQUEST_TIMEOUT.as_u16(),
                message: "Request timeout".to_string(),
                data: None,
            }
        } else {
            Self {
                status: StatusCode::INTERNAL_SERVER_ERROR.as_u16(),
                message: error.to_string(),
                data: None,
            }
        }
    }

    /// Machine-readable code from the error body, if any
    #[must_use]
    pub fn code(&self) -> Option<&str> {
        self.data.as_ref()?.get("code")?.as_str()
    }
}

/// Client for the todo API mounted at `base_url` (e.g. `http://localhost:3000/api`)
#[derive(Debug, Clone)]
pub struct TodoClient {
    http: reqwest::Client,
    base_url: String,
}

impl TodoClient {
    /// Create a client whose requests give up after `timeout`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] if the HTTP client cannot be constructed.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::transport(&e))?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Create a client for the API described by `config` (`APP_URL` + `API_BASE_PATH`).
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] if the HTTP client cannot be constructed.
    pub fn from_config(config: &Config) -> Result<Self, ApiError> {
        let base = format!(
            "{}{}",
            config.app.url.trim_end_matches('/'),
            config.api.base_path
        );
        Self::new(base, config.api_timeout())
    }

    /// `GET /hello`
    ///
    /// # Errors
    ///
    /// See the module docs.
    pub async fn hello(&self) -> Result<HelloResponse, ApiError> {
        self.send(self.request(Method::GET, "/hello")).await
    }

    /// `GET /todos`, optionally filtered by completion.
    ///
    /// # Errors
    ///
    /// See the module docs.
    pub async fn list(&self, completed: Option<bool>) -> Result<Vec<Todo>, ApiError> {
        let mut request = self.request(Method::GET, "/todos");
        if let Some(completed) = completed {
            request = request.query(&[("completed", completed)]);
        }
        self.send(request).await
    }

    /// `POST /todos`
    ///
    /// # Errors
    ///
    /// See the module docs; invalid input comes back as status 400.
    pub async fn create(&self, text: &str, completed: bool) -> Result<Todo, ApiError> {
        let body = json!({ "text": text, "completed": completed });
        self.send(self.request(Method::POST, "/todos").json(&body))
            .await
    }

    /// `PUT /todos` with only the fields set in `changes`.
    ///
    /// # Errors
    ///
    /// See the module docs; unknown ids come back as status 404.
    pub async fn update(&self, id: &str, changes: &TodoChanges) -> Result<Todo, ApiError> {
        let mut body = json!({ "id": id });
        if let Some(text) = &changes.text {
            body["text"] = json!(text);
        }
        if let Some(completed) = changes.completed {
            body["completed"] = json!(completed);
        }
        self.send(self.request(Method::PUT, "/todos").json(&body))
            .await
    }

    /// `DELETE /todos?id=<id>`
    ///
    /// # Errors
    ///
    /// See the module docs; unknown ids come back as status 404.
    pub async fn delete(&self, id: &str) -> Result<DeleteResponse, ApiError> {
        self.send(self.request(Method::DELETE, "/todos").query(&[("id", id)]))
            .await
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http.request(method, format!("{}{path}", self.base_url))
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        let response = request.send().await.map_err(|e| ApiError::transport(&e))?;
        let status = response.status();

        if status.is_success() {
            return response.json().await.map_err(|e| ApiError::transport(&e));
        }

        let data = response.json::<Value>().await.ok();
        let message = data
            .as_ref()
            .and_then(|d| d.get("message"))
            .and_then(Value::as_str)
            .map_or_else(
                || status.canonical_reason().unwrap_or("Request failed").to_string(),
                String::from,
            );

        tracing::debug!(status = status.as_u16(), %message, "API request failed");
        Err(ApiError {
            status: status.as_u16(),
            message,
            data,
        })
    }
}
