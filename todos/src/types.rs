//! Domain types for todos.
//!
//! A todo list is an ordered collection of items that can be added, toggled,
//! deleted and bulk-updated. The same [`Todo`] record is served by the HTTP
//! resource and held by the client-side [`TodoList`](crate::TodoList).

use serde::{Deserialize, Serialize};

/// A single todo item
///
/// Serialized as `{"id": "...", "text": "...", "completed": false}` both on
/// the wire and in durable storage.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    /// Unique identifier, immutable once assigned
    pub id: String,
    /// What needs doing (never blank)
    pub text: String,
    /// Whether the todo is done
    #[serde(default)]
    pub completed: bool,
}

impl Todo {
    /// Creates an open todo
    #[must_use]
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            completed: false,
        }
    }

    /// Sets the completed flag (builder style, mostly for seeding)
    #[must_use]
    pub const fn with_completed(mut self, completed: bool) -> Self {
        self.completed = completed;
        self
    }
}

/// The three demo todos a fresh server starts with
#[must_use]
pub fn demo_todos() -> Vec<Todo> {
    vec![
        Todo::new("1", "Learn Next.js 15").with_completed(true),
        Todo::new("2", "Build an API with TypeScript"),
        Todo::new("3", "Deploy to production"),
    ]
}

/// A validated request to create a todo
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewTodo {
    /// Trimmed, non-empty text
    pub text: String,
    /// Initial completed flag
    pub completed: bool,
}

/// A validated partial update
///
/// `None` means "keep the stored value".
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TodoChanges {
    /// Replacement text (trimmed, non-empty)
    pub text: Option<String>,
    /// Replacement completed flag
    pub completed: Option<bool>,
}

impl TodoChanges {
    /// Returns true when the update would not touch any field
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.text.is_none() && self.completed.is_none()
    }

    /// Applies the provided fields to `todo`
    pub fn apply(&self, todo: &mut Todo) {
        if let Some(text) = &self.text {
            todo.text.clone_from(text);
        }
        if let Some(completed) = self.completed {
            todo.completed = completed;
        }
    }
}

/// Which part of the collection to show
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TodoFilter {
    /// Every todo
    #[default]
    All,
    /// Only todos that are not completed
    Active,
    /// Only completed todos
    Completed,
}

impl TodoFilter {
    /// Returns true if `todo` belongs in this view
    #[must_use]
    pub const fn matches(self, todo: &Todo) -> bool {
        match self {
            Self::All => true,
            Self::Active => !todo.completed,
            Self::Completed => todo.completed,
        }
    }
}

impl From<Option<bool>> for TodoFilter {
    fn from(completed: Option<bool>) -> Self {
        match completed {
            None => Self::All,
            Some(true) => Self::Completed,
            Some(false) => Self::Active,
        }
    }
}

/// Derived counts, recomputed from the collection on every read
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct TodoStats {
    /// Number of todos
    pub total: usize,
    /// Number of completed todos
    pub completed: usize,
    /// Number of open todos
    pub active: usize,
}

impl TodoStats {
    /// Counts the given todos
    #[must_use]
    pub fn from_todos(todos: &[Todo]) -> Self {
        let completed = todos.iter().filter(|t| t.completed).count();
        Self {
            total: todos.len(),
            completed,
            active: todos.len() - completed,
        }
    }
}

/// State held by the todo store
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TodoState {
    /// Todos in insertion order
    pub todos: Vec<Todo>,
    /// Bumped every time an event changes `todos`
    pub revision: u64,
}

impl TodoState {
    /// Creates a state holding `todos` at revision 0
    #[must_use]
    pub const fn new(todos: Vec<Todo>) -> Self {
        Self { todos, revision: 0 }
    }

    /// Returns a todo by ID
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Todo> {
        self.todos.iter().find(|t| t.id == id)
    }

    /// Checks if a todo exists
    #[must_use]
    pub fn exists(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Derived counts for the current collection
    #[must_use]
    pub fn stats(&self) -> TodoStats {
        TodoStats::from_todos(&self.todos)
    }
}

/// Actions representing commands and events for todos
///
/// Commands express intent and may turn out to be no-ops. Events describe a
/// change that happened and are applied to state as-is, which makes a stream
/// of events replayable.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TodoAction {
    // ========== Commands ==========
    /// Command: Append a todo (ignored when the text is blank)
    AddTodo {
        /// Raw text as entered
        text: String,
    },

    /// Command: Flip the completed flag of a todo
    ToggleTodo {
        /// Todo to toggle
        id: String,
    },

    /// Command: Remove a todo
    DeleteTodo {
        /// Todo to delete
        id: String,
    },

    /// Command: Remove every completed todo
    ClearCompleted,

    /// Command: Set the completed flag on every todo
    MarkAllCompleted {
        /// Flag to set
        completed: bool,
    },

    // ========== Events ==========
    /// Event: A todo was appended
    TodoAdded {
        /// The new record
        todo: Todo,
    },

    /// Event: A todo's completed flag changed
    TodoToggled {
        /// Todo identifier
        id: String,
        /// New flag value
        completed: bool,
    },

    /// Event: A todo was removed
    TodoDeleted {
        /// Todo identifier
        id: String,
    },

    /// Event: Completed todos were removed
    CompletedCleared,

    /// Event: Every todo received the same completed flag
    AllMarked {
        /// Flag that was set
        completed: bool,
    },
}

impl TodoAction {
    /// Returns true for commands
    #[must_use]
    pub const fn is_command(&self) -> bool {
        matches!(
            self,
            Self::AddTodo { .. }
                | Self::ToggleTodo { .. }
                | Self::DeleteTodo { .. }
                | Self::ClearCompleted
                | Self::MarkAllCompleted { .. }
        )
    }

    /// Returns true for events
    #[must_use]
    pub const fn is_event(&self) -> bool {
        !self.is_command()
    }
}
