//! In-memory task store (non-persistent).

use super::{StoreError, TaskStore};
use crate::task::{Task, TaskFields};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Non-persistent backend with the same observable contract as the SQLite
/// store. Used by handler tests.
#[derive(Clone)]
pub struct InMemoryTaskStore {
    inner: Arc<RwLock<Inner>>,
}

#[derive(Default)]
struct Inner {
    // BTreeMap keeps list_all in id (insertion) order
    tasks: BTreeMap<i64, Task>,
    last_id: i64,
}

impl InMemoryTaskStore {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(Inner::default())),
        }
    }
}

impl Default for InMemoryTaskStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TaskStore for InMemoryTaskStore {
    fn is_persistent(&self) -> bool {
        false
    }

    async fn list_all(&self) -> Result<Vec<Task>, StoreError> {
        Ok(self.inner.read().await.tasks.values().cloned().collect())
    }

    async fn get(&self, id: i64) -> Result<Task, StoreError> {
        self.inner
            .read()
            .await
            .tasks
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn create(&self, fields: TaskFields) -> Result<Task, StoreError> {
        fields.validate().map_err(StoreError::Invalid)?;

        let mut inner = self.inner.write().await;
        inner.last_id += 1;
        let task = Task {
            id: inner.last_id,
            created_at: Utc::now(),
            title: fields.title,
            description: fields.description,
            due_date: fields.due_date,
            tags: fields.tags,
        };
        inner.tasks.insert(task.id, task.clone());
        Ok(task)
    }

    async fn update(&self, id: i64, fields: TaskFields) -> Result<Task, StoreError> {
        fields.validate().map_err(StoreError::Invalid)?;

        let mut inner = self.inner.write().await;
        let task = inner.tasks.get_mut(&id).ok_or(StoreError::NotFound)?;
        task.title = fields.title;
        task.description = fields.description;
        task.due_date = fields.due_date;
        task.tags = fields.tags;
        Ok(task.clone())
    }

    async fn delete(&self, id: i64) -> Result<(), StoreError> {
        self.inner
            .write()
            .await
            .tasks
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::NotFound)
    }
}
