//! Task storage module with pluggable backends.
//!
//! Supports:
//! - `memory`: In-memory storage (non-persistent, for tests)
//! - `sqlite`: SQLite database (production)
//!
//! Both backends validate fields against the shared schema before any
//! write, so an invalid submission can never reach the database.

mod memory;
mod sqlite;

pub use memory::InMemoryTaskStore;
pub use sqlite::SqliteTaskStore;

use crate::task::{FieldErrors, Task, TaskFields};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Errors surfaced by a task store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No task with the requested id.
    #[error("task not found")]
    NotFound,

    /// Submitted fields violate the schema constraints.
    #[error("invalid fields: {0}")]
    Invalid(FieldErrors),

    /// The underlying persistence mechanism failed.
    #[error("storage error: {0}")]
    Persistence(#[from] rusqlite::Error),
}

/// Shared handle to a task store.
pub type SharedStore = Arc<dyn TaskStore>;

/// Task store trait - implemented by all storage backends.
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Whether this store persists data across restarts.
    fn is_persistent(&self) -> bool;

    /// List every task in insertion (id) order.
    async fn list_all(&self) -> Result<Vec<Task>, StoreError>;

    /// Get a single task by id.
    async fn get(&self, id: i64) -> Result<Task, StoreError>;

    /// Validate and persist a new task, assigning a fresh id and the
    /// creation timestamp.
    async fn create(&self, fields: TaskFields) -> Result<Task, StoreError>;

    /// Validate and overwrite the mutable fields of an existing task.
    /// `id` and `created_at` are untouched.
    async fn update(&self, id: i64, fields: TaskFields) -> Result<Task, StoreError>;

    /// Remove a task. Deleting a missing id fails with `NotFound`, and
    /// keeps failing the same way on repeat.
    async fn delete(&self, id: i64) -> Result<(), StoreError>;
}
