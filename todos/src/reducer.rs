//! Reducer logic for the todo list.
//!
//! Commands are checked against the current state and turned into events.
//! Events are applied to state. When an event changed the collection and the
//! environment carries a [`SnapshotWriter`], the reducer returns an effect
//! that writes the new collection to durable storage.

use crate::storage::TodoStorage;
use crate::types::{Todo, TodoAction, TodoState};
use starter_core::{
    effect::Effect,
    environment::{IdGenerator, UuidIdGenerator},
    reducer::Reducer,
    smallvec, SmallVec,
};
use std::sync::{Arc, Mutex, PoisonError};

/// How many identifiers to draw before giving up on an add
///
/// Only a broken generator (one that keeps repeating ids already in the
/// collection) can exhaust this.
const MAX_ID_ATTEMPTS: usize = 8;

/// Writes collection snapshots to storage, newest revision wins
///
/// Snapshot effects run on separate tasks and may finish out of order. The
/// writer remembers the last revision it handed to storage and drops anything
/// older, so an earlier snapshot never overwrites a later one.
pub struct SnapshotWriter {
    storage: Arc<dyn TodoStorage>,
    last_revision: Mutex<Option<u64>>,
}

impl SnapshotWriter {
    /// Creates a writer for `storage`
    #[must_use]
    pub fn new(storage: Arc<dyn TodoStorage>) -> Self {
        Self {
            storage,
            last_revision: Mutex::new(None),
        }
    }

    /// Storage this writer saves into
    #[must_use]
    pub fn storage(&self) -> &Arc<dyn TodoStorage> {
        &self.storage
    }

    /// Saves `todos` unless a newer revision was already written
    ///
    /// Write failures are logged and otherwise ignored. Returns true when the
    /// snapshot was handed to storage successfully.
    pub fn write(&self, revision: u64, todos: &[Todo]) -> bool {
        let mut last = self
            .last_revision
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        if last.is_some_and(|written| written >= revision) {
            tracing::debug!(revision, "Skipping stale todo snapshot");
            return false;
        }
        *last = Some(revision);

        match self.storage.save(todos) {
            Ok(()) => true,
            Err(error) => {
                tracing::error!(
                    key = self.storage.key(),
                    revision,
                    error = %error,
                    "Failed to persist todos"
                );
                false
            },
        }
    }
}

impl std::fmt::Debug for SnapshotWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SnapshotWriter")
            .field("key", &self.storage.key())
            .finish_non_exhaustive()
    }
}

/// Environment dependencies for the todo reducer
#[derive(Clone)]
pub struct TodoEnvironment {
    /// Source of ids for new todos
    pub ids: Arc<dyn IdGenerator>,
    /// Where snapshots go; `None` keeps the list in memory only
    pub snapshots: Option<Arc<SnapshotWriter>>,
}

impl TodoEnvironment {
    /// In-memory environment using `ids`
    #[must_use]
    pub fn new(ids: Arc<dyn IdGenerator>) -> Self {
        Self {
            ids,
            snapshots: None,
        }
    }

    /// Persist every change through `writer`
    #[must_use]
    pub fn with_snapshots(mut self, writer: Arc<SnapshotWriter>) -> Self {
        self.snapshots = Some(writer);
        self
    }
}

impl Default for TodoEnvironment {
    fn default() -> Self {
        Self::new(Arc::new(UuidIdGenerator))
    }
}

impl std::fmt::Debug for TodoEnvironment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TodoEnvironment")
            .field("snapshots", &self.snapshots)
            .finish_non_exhaustive()
    }
}

/// Reducer for the todo list
#[derive(Clone, Debug, Default)]
pub struct TodoReducer;

impl TodoReducer {
    /// Creates a new `TodoReducer`
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Turns a command into the event it implies, if any
    ///
    /// Commands that would not change anything yield `None`.
    fn decide(state: &TodoState, action: TodoAction, env: &TodoEnvironment) -> Option<TodoAction> {
        match action {
            TodoAction::AddTodo { text } => {
                let text = text.trim();
                if text.is_empty() {
                    return None;
                }
                let id = Self::fresh_id(state, env)?;
                Some(TodoAction::TodoAdded {
                    todo: Todo::new(id, text),
                })
            },
            TodoAction::ToggleTodo { id } => {
                let completed = !state.get(&id)?.completed;
                Some(TodoAction::TodoToggled { id, completed })
            },
            TodoAction::DeleteTodo { id } => {
                state.exists(&id).then_some(TodoAction::TodoDeleted { id })
            },
            TodoAction::ClearCompleted => state
                .todos
                .iter()
                .any(|t| t.completed)
                .then_some(TodoAction::CompletedCleared),
            TodoAction::MarkAllCompleted { completed } => state
                .todos
                .iter()
                .any(|t| t.completed != completed)
                .then_some(TodoAction::AllMarked { completed }),
            event => Some(event),
        }
    }

    /// Draws an id that is not in use yet
    fn fresh_id(state: &TodoState, env: &TodoEnvironment) -> Option<String> {
        let id = (0..MAX_ID_ATTEMPTS)
            .map(|_| env.ids.next_id())
            .find(|id| !state.exists(id));
        if id.is_none() {
            tracing::warn!("Id generator kept returning ids already in use, todo not added");
        }
        id
    }

    /// Applies an event to state, returning whether anything changed
    fn apply_event(state: &mut TodoState, event: TodoAction) -> bool {
        match event {
            TodoAction::TodoAdded { todo } => {
                if state.exists(&todo.id) {
                    return false;
                }
                state.todos.push(todo);
                true
            },
            TodoAction::TodoToggled { id, completed } => {
                match state.todos.iter_mut().find(|t| t.id == id) {
                    Some(todo) if todo.completed != completed => {
                        todo.completed = completed;
                        true
                    },
                    _ => false,
                }
            },
            TodoAction::TodoDeleted { id } => {
                let before = state.todos.len();
                state.todos.retain(|t| t.id != id);
                state.todos.len() != before
            },
            TodoAction::CompletedCleared => {
                let before = state.todos.len();
                state.todos.retain(|t| !t.completed);
                state.todos.len() != before
            },
            TodoAction::AllMarked { completed } => {
                let mut changed = false;
                for todo in state.todos.iter_mut().filter(|t| t.completed != completed) {
                    todo.completed = completed;
                    changed = true;
                }
                changed
            },
            // Commands are not applied to state
            TodoAction::AddTodo { .. }
            | TodoAction::ToggleTodo { .. }
            | TodoAction::DeleteTodo { .. }
            | TodoAction::ClearCompleted
            | TodoAction::MarkAllCompleted { .. } => false,
        }
    }

    /// Effect that hands the current collection to the snapshot writer
    fn persist(writer: Arc<SnapshotWriter>, state: &TodoState) -> Effect<TodoAction> {
        let revision = state.revision;
        let snapshot = state.todos.clone();

        Effect::fire_and_forget(async move {
            let result =
                tokio::task::spawn_blocking(move || writer.write(revision, &snapshot)).await;
            if let Err(error) = result {
                tracing::error!(revision, error = %error, "Todo snapshot task failed");
            }
        })
    }
}

impl Reducer for TodoReducer {
    type State = TodoState;
    type Action = TodoAction;
    type Environment = TodoEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        let Some(event) = Self::decide(state, action, env) else {
            return SmallVec::new();
        };

        tracing::debug!(?event, "Applying todo event");
        if !Self::apply_event(state, event) {
            return SmallVec::new();
        }
        state.revision += 1;

        match &env.snapshots {
            Some(writer) => smallvec![Self::persist(Arc::clone(writer), state)],
            None => SmallVec::new(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;
    use starter_testing::{assertions, ReducerTest, SequentialIdGenerator};

    fn env() -> TodoEnvironment {
        TodoEnvironment::new(Arc::new(SequentialIdGenerator::new()))
    }

    fn persisting_env() -> TodoEnvironment {
        let storage = Arc::new(MemoryStorage::new("todos").unwrap());
        env().with_snapshots(Arc::new(SnapshotWriter::new(storage)))
    }

    fn sample() -> TodoState {
        TodoState::new(vec![
            Todo::new("a", "Done").with_completed(true),
            Todo::new("b", "Open"),
        ])
    }

    #[test]
    fn add_appends_trimmed_open_todo() {
        ReducerTest::new(TodoReducer::new())
            .with_env(env())
            .given_state(TodoState::default())
            .when_action(TodoAction::AddTodo {
                text: "  Learn Rust ".into(),
            })
            .then_state(|state| {
                assert_eq!(state.todos, vec![Todo::new("1", "Learn Rust")]);
                assert_eq!(state.revision, 1);
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn add_ignores_blank_text() {
        ReducerTest::new(TodoReducer::new())
            .with_env(persisting_env())
            .given_state(TodoState::default())
            .when_action(TodoAction::AddTodo { text: " \t ".into() })
            .then_state(|state| {
                assert!(state.todos.is_empty());
                assert_eq!(state.revision, 0);
            })
            .then_effects(|effects| assertions::assert_effects_count(effects, 0))
            .run();
    }

    #[test]
    fn add_skips_ids_already_in_use() {
        ReducerTest::new(TodoReducer::new())
            .with_env(env())
            .given_state(TodoState::new(vec![Todo::new("1", "Loaded")]))
            .when_action(TodoAction::AddTodo { text: "New".into() })
            .then_state(|state| {
                let ids: Vec<_> = state.todos.iter().map(|t| t.id.as_str()).collect();
                assert_eq!(ids, ["1", "2"]);
            })
            .run();
    }

    #[test]
    fn toggle_flips_flag_and_persists() {
        ReducerTest::new(TodoReducer::new())
            .with_env(persisting_env())
            .given_state(sample())
            .when_action(TodoAction::ToggleTodo { id: "b".into() })
            .then_state(|state| assert!(state.get("b").unwrap().completed))
            .then_effects(assertions::assert_has_future_effect)
            .run();
    }

    #[test]
    fn toggle_twice_restores_flag() {
        ReducerTest::new(TodoReducer::new())
            .with_env(env())
            .given_state(sample())
            .given_actions([TodoAction::ToggleTodo { id: "a".into() }])
            .when_action(TodoAction::ToggleTodo { id: "a".into() })
            .then_state(|state| {
                assert_eq!(state.todos, sample().todos);
                assert_eq!(state.revision, 2);
            })
            .run();
    }

    #[test]
    fn unknown_ids_are_no_ops() {
        for action in [
            TodoAction::ToggleTodo { id: "zzz".into() },
            TodoAction::DeleteTodo { id: "zzz".into() },
        ] {
            ReducerTest::new(TodoReducer::new())
                .with_env(persisting_env())
                .given_state(sample())
                .when_action(action)
                .then_state(|state| assert_eq!(*state, sample()))
                .then_effects(|effects| assertions::assert_effects_count(effects, 0))
                .run();
        }
    }

    #[test]
    fn delete_removes_only_that_todo() {
        ReducerTest::new(TodoReducer::new())
            .with_env(env())
            .given_state(sample())
            .when_action(TodoAction::DeleteTodo { id: "a".into() })
            .then_state(|state| assert_eq!(state.todos, vec![Todo::new("b", "Open")]))
            .run();
    }

    #[test]
    fn clear_completed_keeps_open_todos() {
        ReducerTest::new(TodoReducer::new())
            .with_env(env())
            .given_state(sample())
            .when_action(TodoAction::ClearCompleted)
            .then_state(|state| {
                assert_eq!(state.todos, vec![Todo::new("b", "Open")]);
                assert_eq!(state.stats().completed, 0);
            })
            .run();
    }

    #[test]
    fn clear_completed_without_completed_is_no_op() {
        ReducerTest::new(TodoReducer::new())
            .with_env(persisting_env())
            .given_state(TodoState::new(vec![Todo::new("b", "Open")]))
            .when_action(TodoAction::ClearCompleted)
            .then_state(|state| assert_eq!(state.revision, 0))
            .then_effects(|effects| assertions::assert_effects_count(effects, 0))
            .run();
    }

    #[test]
    fn mark_all_sets_every_flag() {
        ReducerTest::new(TodoReducer::new())
            .with_env(env())
            .given_state(sample())
            .given_actions([TodoAction::MarkAllCompleted { completed: true }])
            .when_action(TodoAction::MarkAllCompleted { completed: false })
            .then_state(|state| {
                let ids: Vec<_> = state.todos.iter().map(|t| t.id.as_str()).collect();
                assert_eq!(ids, ["a", "b"]);
                assert!(state.todos.iter().all(|t| !t.completed));
                assert_eq!(state.todos[0].text, "Done");
            })
            .run();
    }

    #[test]
    fn events_replay_as_is() {
        ReducerTest::new(TodoReducer::new())
            .with_env(env())
            .given_state(TodoState::default())
            .given_actions([
                TodoAction::TodoAdded {
                    todo: Todo::new("x", "Replayed"),
                },
                TodoAction::TodoToggled {
                    id: "x".into(),
                    completed: true,
                },
            ])
            .when_action(TodoAction::TodoAdded {
                todo: Todo::new("x", "Duplicate"),
            })
            .then_state(|state| {
                assert_eq!(state.todos, vec![Todo::new("x", "Replayed").with_completed(true)]);
                assert_eq!(state.revision, 2);
            })
            .run();
    }

    #[test]
    fn writer_drops_stale_revisions() {
        let storage = Arc::new(MemoryStorage::new("todos").unwrap());
        let writer = SnapshotWriter::new(Arc::clone(&storage) as Arc<dyn TodoStorage>);

        assert!(writer.write(2, &[Todo::new("new", "Newer")]));
        assert!(!writer.write(1, &[Todo::new("old", "Older")]));

        assert_eq!(storage.load().unwrap(), Some(vec![Todo::new("new", "Newer")]));
    }
}
