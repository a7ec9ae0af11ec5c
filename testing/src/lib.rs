//! # Starter Testing
//!
//! Testing utilities shared by the crates in the workspace.
//!
//! This crate provides:
//! - Deterministic implementations of Environment traits
//! - A Given-When-Then harness for reducers
//! - Assertion helpers for effects
//!
//! ## Example
//!
//! ```ignore
//! use starter_testing::SequentialIdGenerator;
//! use starter_todos::{TodoEnvironment, TodoList};
//! use std::sync::Arc;
//!
//! #[tokio::test]
//! async fn adds_a_todo() -> Result<(), starter_runtime::StoreError> {
//!     let env = TodoEnvironment::new(Arc::new(SequentialIdGenerator::new()));
//!     let list = TodoList::with_environment(Vec::new(), env);
//!
//!     list.add("Write tests").await?;
//!     assert_eq!(list.todos().await[0].id, "1");
//!     Ok(())
//! }
//! ```

use chrono::{DateTime, Utc};
use starter_core::environment::{Clock, IdGenerator};

pub mod reducer_test;

/// Mock implementations of Environment traits
pub mod mocks {
    use super::{Clock, DateTime, IdGenerator, Utc};
    use std::sync::atomic::{AtomicU64, Ordering};

    /// Fixed clock for deterministic tests
    ///
    /// Always returns the same time, making tests reproducible.
    ///
    /// # Example
    ///
    /// ```
    /// use starter_testing::mocks::FixedClock;
    /// use starter_core::environment::Clock;
    /// use chrono::Utc;
    ///
    /// let clock = FixedClock::new(Utc::now());
    /// let time1 = clock.now();
    /// let time2 = clock.now();
    /// assert_eq!(time1, time2);
    /// ```
    #[derive(Debug, Clone)]
    pub struct FixedClock {
        time: DateTime<Utc>,
    }

    impl FixedClock {
        /// Create a new fixed clock with the given time
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self { time }
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.time
        }
    }

    /// Create a default fixed clock for tests (2025-01-01 00:00:00 UTC)
    ///
    /// # Panics
    ///
    /// This function will panic if the hardcoded timestamp fails to parse,
    /// which should never happen in practice.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(
            DateTime::parse_from_rfc3339("2025-01-01T00:00:00Z")
                .expect("hardcoded timestamp should always parse")
                .with_timezone(&Utc),
        )
    }

    /// Predictable identifiers: "1", "2", "3", ...
    ///
    /// Clones share the counter so a generator handed to an environment can
    /// still be inspected by the test.
    #[derive(Debug, Clone, Default)]
    pub struct SequentialIdGenerator {
        next: std::sync::Arc<AtomicU64>,
    }

    impl SequentialIdGenerator {
        /// Start counting at 1
        #[must_use]
        pub fn new() -> Self {
            Self::starting_at(1)
        }

        /// Start counting at `first`
        #[must_use]
        pub fn starting_at(first: u64) -> Self {
            Self {
                next: std::sync::Arc::new(AtomicU64::new(first)),
            }
        }

        /// Number the next call to [`IdGenerator::next_id`] will return
        #[must_use]
        pub fn peek(&self) -> u64 {
            self.next.load(Ordering::SeqCst)
        }
    }

    impl IdGenerator for SequentialIdGenerator {
        fn next_id(&self) -> String {
            self.next.fetch_add(1, Ordering::SeqCst).to_string()
        }
    }
}

// Re-export commonly used items
pub use mocks::{test_clock, FixedClock, SequentialIdGenerator};
pub use reducer_test::{assertions, ReducerTest};
