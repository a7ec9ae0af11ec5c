//! Server-side todo collection.
//!
//! HTTP handlers talk to a [`TodoRepository`] so the collection is injected
//! rather than global. [`InMemoryTodoRepository`] keeps it for the lifetime
//! of the process.

use crate::types::{demo_todos, NewTodo, Todo, TodoChanges, TodoFilter};
use async_trait::async_trait;
use starter_core::environment::{IdGenerator, UuidIdGenerator};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;

/// Errors returned by [`TodoRepository`] operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TodoError {
    /// No todo has this id
    #[error("todo {0} not found")]
    NotFound(String),

    /// The generated id is already taken
    #[error("todo {0} already exists")]
    Conflict(String),
}

/// Storage for the todo resource
#[async_trait]
pub trait TodoRepository: Send + Sync {
    /// All todos, or only those whose completed flag equals `completed`
    ///
    /// # Errors
    ///
    /// Implementations backed by external systems may fail; the in-memory
    /// repository never does.
    async fn list(&self, completed: Option<bool>) -> Result<Vec<Todo>, TodoError>;

    /// Appends a todo under a fresh id
    ///
    /// # Errors
    ///
    /// Returns [`TodoError::Conflict`] if the fresh id is already in use.
    async fn create(&self, draft: NewTodo) -> Result<Todo, TodoError>;

    /// Applies `changes` to the todo with `id`
    ///
    /// # Errors
    ///
    /// Returns [`TodoError::NotFound`] if no todo has `id`.
    async fn update(&self, id: &str, changes: TodoChanges) -> Result<Todo, TodoError>;

    /// Removes and returns the todo with `id`
    ///
    /// # Errors
    ///
    /// Returns [`TodoError::NotFound`] if no todo has `id`.
    async fn delete(&self, id: &str) -> Result<Todo, TodoError>;

    /// Number of todos
    ///
    /// # Errors
    ///
    /// Same as [`TodoRepository::list`].
    async fn count(&self) -> Result<usize, TodoError>;
}

/// Process-lifetime repository guarded by a read/write lock
pub struct InMemoryTodoRepository {
    todos: RwLock<Vec<Todo>>,
    ids: Arc<dyn IdGenerator>,
}

impl InMemoryTodoRepository {
    /// Empty repository issuing UUID ids
    #[must_use]
    pub fn new() -> Self {
        Self::with_todos(Vec::new())
    }

    /// Repository starting with `todos`
    #[must_use]
    pub fn with_todos(todos: Vec<Todo>) -> Self {
        Self {
            todos: RwLock::new(todos),
            ids: Arc::new(UuidIdGenerator),
        }
    }

    /// Repository starting with the three demo todos
    #[must_use]
    pub fn seeded() -> Self {
        Self::with_todos(demo_todos())
    }

    /// Replaces the id generator
    #[must_use]
    pub fn with_id_generator(mut self, ids: Arc<dyn IdGenerator>) -> Self {
        self.ids = ids;
        self
    }
}

impl Default for InMemoryTodoRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for InMemoryTodoRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryTodoRepository")
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl TodoRepository for InMemoryTodoRepository {
    async fn list(&self, completed: Option<bool>) -> Result<Vec<Todo>, TodoError> {
        let filter = TodoFilter::from(completed);
        let todos = self.todos.read().await;
        Ok(todos.iter().filter(|t| filter.matches(t)).cloned().collect())
    }

    async fn create(&self, draft: NewTodo) -> Result<Todo, TodoError> {
        let mut todos = self.todos.write().await;

        let id = self.ids.next_id();
        if todos.iter().any(|t| t.id == id) {
            tracing::error!(%id, "Id generator returned an id already in use");
            return Err(TodoError::Conflict(id));
        }

        let todo = Todo::new(id, draft.text).with_completed(draft.completed);
        todos.push(todo.clone());
        tracing::info!(id = %todo.id, "Todo created");
        Ok(todo)
    }

    async fn update(&self, id: &str, changes: TodoChanges) -> Result<Todo, TodoError> {
        let mut todos = self.todos.write().await;
        let todo = todos
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| TodoError::NotFound(id.to_owned()))?;

        changes.apply(todo);
        tracing::info!(%id, "Todo updated");
        Ok(todo.clone())
    }

    async fn delete(&self, id: &str) -> Result<Todo, TodoError> {
        let mut todos = self.todos.write().await;
        let index = todos
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| TodoError::NotFound(id.to_owned()))?;

        let removed = todos.remove(index);
        tracing::info!(%id, "Todo deleted");
        Ok(removed)
    }

    async fn count(&self) -> Result<usize, TodoError> {
        Ok(self.todos.read().await.len())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use starter_testing::SequentialIdGenerator;

    fn draft(text: &str) -> NewTodo {
        NewTodo {
            text: text.to_owned(),
            completed: false,
        }
    }

    fn repo() -> InMemoryTodoRepository {
        InMemoryTodoRepository::new()
            .with_id_generator(Arc::new(SequentialIdGenerator::starting_at(10)))
    }

    #[tokio::test]
    async fn create_appends_with_fresh_ids() {
        let repo = repo();
        let first = repo.create(draft("One")).await.unwrap();
        let second = repo.create(draft("Two")).await.unwrap();

        assert_eq!(first, Todo::new("10", "One"));
        assert_eq!(second.id, "11");
        assert_eq!(repo.list(None).await.unwrap(), vec![first, second]);
    }

    #[tokio::test]
    async fn create_refuses_duplicate_ids() {
        let repo = InMemoryTodoRepository::seeded()
            .with_id_generator(Arc::new(SequentialIdGenerator::starting_at(2)));

        let result = repo.create(draft("Clash")).await;

        assert_eq!(result, Err(TodoError::Conflict("2".into())));
        assert_eq!(repo.count().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn list_filters_in_order() {
        let repo = InMemoryTodoRepository::with_todos(vec![
            Todo::new("a", "A").with_completed(true),
            Todo::new("b", "B"),
            Todo::new("c", "C").with_completed(true),
        ]);

        let done: Vec<_> = repo
            .list(Some(true))
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.id)
            .collect();
        assert_eq!(done, ["a", "c"]);

        let open = repo.list(Some(false)).await.unwrap();
        assert_eq!(open, vec![Todo::new("b", "B")]);
    }

    #[tokio::test]
    async fn update_keeps_omitted_fields() {
        let repo = InMemoryTodoRepository::seeded();
        let updated = repo
            .update(
                "1",
                TodoChanges {
                    text: None,
                    completed: Some(false),
                },
            )
            .await
            .unwrap();

        assert_eq!(updated, Todo::new("1", "Learn Next.js 15"));
    }

    #[tokio::test]
    async fn missing_ids_are_not_found() {
        let repo = InMemoryTodoRepository::seeded();

        assert_eq!(
            repo.update("nope", TodoChanges::default()).await,
            Err(TodoError::NotFound("nope".into()))
        );
        assert_eq!(
            repo.delete("nope").await,
            Err(TodoError::NotFound("nope".into()))
        );
        assert_eq!(repo.count().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn delete_returns_removed_todo() {
        let repo = InMemoryTodoRepository::seeded();
        let removed = repo.delete("2").await.unwrap();

        assert_eq!(removed.text, "Build an API with TypeScript");
        let ids: Vec<_> = repo.list(None).await.unwrap().into_iter().map(|t| t.id).collect();
        assert_eq!(ids, ["1", "3"]);
    }

    #[tokio::test]
    async fn concurrent_creates_keep_ids_unique() {
        let repo = Arc::new(InMemoryTodoRepository::new());

        let tasks: Vec<_> = (0..50)
            .map(|i| {
                let repo = Arc::clone(&repo);
                tokio::spawn(async move { repo.create(draft(&format!("todo {i}"))).await })
            })
            .collect();
        for task in tasks {
            task.await.unwrap().unwrap();
        }

        let todos = repo.list(None).await.unwrap();
        let unique: std::collections::HashSet<_> = todos.iter().map(|t| &t.id).collect();
        assert_eq!(todos.len(), 50);
        assert_eq!(unique.len(), 50);
    }
}
