//! Axum HTTP surface for the starter todo service.
//!
//! This crate is the imperative shell around the todo domain: it parses
//! requests, calls the injected [`TodoRepository`](starter_todos::TodoRepository)
//! and maps results and errors to HTTP responses.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │         Imperative Shell (Axum)         │  ← HTTP, JSON, CORS
//! │  - Request parsing and validation       │  ← Correlation IDs, tracing
//! │  - Response serialization               │  ← Metrics
//! ├─────────────────────────────────────────┤
//! │         Domain (starter-todos)          │
//! │  - Todo repository                      │
//! │  - Validation rules                     │
//! └─────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use starter_web::{build_router, AppState, Config};
//!
//! let config = Config::from_env()?;
//! let listener = tokio::net::TcpListener::bind(config.bind_address()).await?;
//! axum::serve(listener, build_router(AppState::from_config(config))).await?;
//! ```

#![allow(clippy::module_name_repetitions)]

pub mod client;
pub mod config;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod state;

// Re-export key types for convenience
pub use client::{ApiError, TodoClient};
pub use config::{Config, ConfigError};
pub use error::AppError;
pub use extractors::{JsonBody, TodoQuery};
pub use middleware::{correlation_id_layer, CORRELATION_ID_HEADER};
pub use routes::build_router;
pub use state::AppState;

/// Result type alias for web handlers.
pub type WebResult<T> = Result<T, AppError>;
