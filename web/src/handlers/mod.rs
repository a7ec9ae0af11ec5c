//! HTTP request handlers.
//!
//! This module contains all HTTP handlers organized by resource.

pub mod health;
pub mod hello;
pub mod todos;

// Re-export handlers for route wiring
pub use health::{health_check, readiness};
pub use hello::{hello, HelloResponse};
pub use todos::{create_todo, delete_todo, list_todos, update_todo, DeleteResponse};
