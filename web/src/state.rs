//! Application state for Axum handlers.

use crate::config::Config;
use starter_core::environment::{Clock, SystemClock};
use starter_todos::{InMemoryTodoRepository, TodoRepository};
use std::sync::Arc;

/// Application state shared across all HTTP handlers.
///
/// Everything is behind an `Arc`, so cloning per request is cheap.
///
/// # Examples
///
/// ```ignore
/// use starter_web::{AppState, Config};
/// use starter_todos::InMemoryTodoRepository;
/// use std::sync::Arc;
///
/// let state = AppState::new(Config::default(), Arc::new(InMemoryTodoRepository::seeded()));
/// let app = starter_web::build_router(state);
/// ```
#[derive(Clone)]
pub struct AppState {
    /// The todo collection
    pub todos: Arc<dyn TodoRepository>,
    /// Time source for response timestamps
    pub clock: Arc<dyn Clock>,
    /// Loaded configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Create state over `todos` using the system clock.
    #[must_use]
    pub fn new(config: Config, todos: Arc<dyn TodoRepository>) -> Self {
        Self {
            todos,
            clock: Arc::new(SystemClock),
            config: Arc::new(config),
        }
    }

    /// Create state with a repository built from `config`: seeded with the
    /// demo todos unless `SEED_DEMO_TODOS` turned that off.
    #[must_use]
    pub fn from_config(config: Config) -> Self {
        let repository = if config.seed_demo_todos {
            InMemoryTodoRepository::seeded()
        } else {
            InMemoryTodoRepository::new()
        };
        Self::new(config, Arc::new(repository))
    }

    /// Replace the clock (tests use a fixed one).
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_state_is_clone() {
        // Axum requires Clone state
        fn assert_clone<T: Clone>() {}
        assert_clone::<AppState>();
    }

    #[tokio::test]
    async fn test_seeding_follows_config() {
        let seeded = AppState::from_config(Config::default());
        assert_eq!(seeded.todos.count().await.unwrap(), 3);

        let config = Config {
            seed_demo_todos: false,
            ..Config::default()
        };
        let empty = AppState::from_config(config);
        assert_eq!(empty.todos.count().await.unwrap(), 0);
    }
}
