//! # Starter Todos
//!
//! The todo domain shared by the HTTP service and the command-line client.
//!
//! - [`types`]: the [`Todo`] record, actions and derived counts
//! - [`validation`]: request body checks with field-level messages
//! - [`reducer`]: the pure [`TodoReducer`] and its environment
//! - [`list`]: [`TodoList`], the shared state container over the runtime store
//! - [`storage`]: durable slots for the persisted list
//! - [`repository`]: the server-side [`TodoRepository`]
//!
//! ## Example
//!
//! ```ignore
//! use starter_todos::{JsonFileStorage, TodoList, DEFAULT_STORAGE_KEY};
//!
//! let list = TodoList::persisted(JsonFileStorage::new(".starter", DEFAULT_STORAGE_KEY)?);
//! list.add("Buy milk").await?;
//!
//! let stats = list.stats().await;
//! assert_eq!(stats.completed + stats.active, stats.total);
//! ```

pub mod list;
pub mod reducer;
pub mod repository;
pub mod storage;
pub mod types;
pub mod validation;

pub use list::{TodoList, TodoStore};
pub use reducer::{SnapshotWriter, TodoEnvironment, TodoReducer};
pub use repository::{InMemoryTodoRepository, TodoError, TodoRepository};
pub use storage::{
    JsonFileStorage, MemoryStorage, StorageError, TodoStorage, DEFAULT_STORAGE_KEY,
};
pub use types::{
    demo_todos, NewTodo, Todo, TodoAction, TodoChanges, TodoFilter, TodoState, TodoStats,
};
pub use validation::{validate_changes, validate_new_todo, ValidationErrors, MAX_TEXT_LEN};
