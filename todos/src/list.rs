//! Shared todo list backed by the [`Store`] runtime.

use crate::reducer::{SnapshotWriter, TodoEnvironment, TodoReducer};
use crate::storage::TodoStorage;
use crate::types::{Todo, TodoAction, TodoFilter, TodoState, TodoStats};
use starter_core::environment::{IdGenerator, UuidIdGenerator};
use starter_runtime::{HealthCheck, Store, StoreError};
use std::sync::Arc;
use std::time::Duration;

/// Store type behind a [`TodoList`]
pub type TodoStore = Store<TodoState, TodoAction, TodoEnvironment, TodoReducer>;

/// An ordered todo collection with add, toggle, delete and bulk operations
///
/// Cloning a `TodoList` is cheap; every clone operates on the same
/// collection, so any number of holders observe each other's changes.
///
/// Two variants are chosen by constructor:
/// - [`TodoList::ephemeral`] keeps the collection in memory only.
/// - [`TodoList::persisted`] loads from a [`TodoStorage`] slot and rewrites
///   it after every change.
///
/// Mutating methods return once the change has been applied and, for the
/// persisted variant, handed to storage.
#[derive(Clone)]
pub struct TodoList {
    store: TodoStore,
}

impl TodoList {
    /// In-memory list seeded with `initial`
    #[must_use]
    pub fn ephemeral(initial: Vec<Todo>) -> Self {
        Self::with_environment(initial, TodoEnvironment::default())
    }

    /// List loaded from and saved to `storage`
    ///
    /// Unreadable or malformed stored data is logged and the list starts
    /// empty; the next change overwrites the slot.
    #[must_use]
    pub fn persisted(storage: impl TodoStorage + 'static) -> Self {
        Self::persisted_with_ids(storage, Arc::new(UuidIdGenerator))
    }

    /// Persisted list drawing ids from `ids`
    #[must_use]
    pub fn persisted_with_ids(storage: impl TodoStorage + 'static, ids: Arc<dyn IdGenerator>) -> Self {
        let storage: Arc<dyn TodoStorage> = Arc::new(storage);

        let initial = match storage.load() {
            Ok(Some(todos)) => {
                tracing::debug!(key = storage.key(), count = todos.len(), "Loaded todos");
                todos
            },
            Ok(None) => Vec::new(),
            Err(error) => {
                tracing::warn!(
                    key = storage.key(),
                    error = %error,
                    "Could not load stored todos, starting empty"
                );
                Vec::new()
            },
        };

        let env = TodoEnvironment::new(ids).with_snapshots(Arc::new(SnapshotWriter::new(storage)));
        Self::with_environment(initial, env)
    }

    /// List over an explicit environment
    #[must_use]
    pub fn with_environment(initial: Vec<Todo>, env: TodoEnvironment) -> Self {
        Self {
            store: Store::new(TodoState::new(initial), TodoReducer::new(), env),
        }
    }

    /// Appends a todo with the trimmed `text`; blank text is ignored
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShutdownInProgress`] after [`TodoList::shutdown`].
    pub async fn add(&self, text: impl Into<String>) -> Result<(), StoreError> {
        self.dispatch(TodoAction::AddTodo { text: text.into() }).await
    }

    /// Flips the completed flag of `id`; unknown ids are ignored
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShutdownInProgress`] after [`TodoList::shutdown`].
    pub async fn toggle(&self, id: impl Into<String>) -> Result<(), StoreError> {
        self.dispatch(TodoAction::ToggleTodo { id: id.into() }).await
    }

    /// Removes `id`; unknown ids are ignored
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShutdownInProgress`] after [`TodoList::shutdown`].
    pub async fn delete(&self, id: impl Into<String>) -> Result<(), StoreError> {
        self.dispatch(TodoAction::DeleteTodo { id: id.into() }).await
    }

    /// Removes every completed todo
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShutdownInProgress`] after [`TodoList::shutdown`].
    pub async fn clear_completed(&self) -> Result<(), StoreError> {
        self.dispatch(TodoAction::ClearCompleted).await
    }

    /// Sets every todo's completed flag to `completed`
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShutdownInProgress`] after [`TodoList::shutdown`].
    pub async fn mark_all_completed(&self, completed: bool) -> Result<(), StoreError> {
        self.dispatch(TodoAction::MarkAllCompleted { completed }).await
    }

    /// Snapshot of the collection in insertion order
    pub async fn todos(&self) -> Vec<Todo> {
        self.store.state(|s| s.todos.clone()).await
    }

    /// Todos matching `filter`, in insertion order
    pub async fn filtered(&self, filter: TodoFilter) -> Vec<Todo> {
        self.store
            .state(|s| s.todos.iter().filter(|t| filter.matches(t)).cloned().collect())
            .await
    }

    /// Looks up a single todo
    pub async fn get(&self, id: &str) -> Option<Todo> {
        self.store.state(|s| s.get(id).cloned()).await
    }

    /// Counts computed from the current collection
    pub async fn stats(&self) -> TodoStats {
        self.store.state(TodoState::stats).await
    }

    /// Number of applied changes since the list was created
    pub async fn revision(&self) -> u64 {
        self.store.state(|s| s.revision).await
    }

    /// Health of the underlying store
    #[must_use]
    pub fn health(&self) -> HealthCheck {
        self.store.health()
    }

    /// Stops accepting changes and waits for pending writes
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShutdownTimeout`] if writes are still running
    /// when `timeout` elapses.
    pub async fn shutdown(&self, timeout: Duration) -> Result<(), StoreError> {
        self.store.shutdown(timeout).await
    }

    async fn dispatch(&self, action: TodoAction) -> Result<(), StoreError> {
        let mut handle = self.store.send(action).await?;
        handle.wait().await;
        Ok(())
    }
}

impl std::fmt::Debug for TodoList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TodoList")
            .field("environment", self.store.environment())
            .finish_non_exhaustive()
    }
}
