//! SQLite-backed task store.

use super::{StoreError, TaskStore};
use crate::task::{Task, TaskFields};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;

const SCHEMA: &str = r#"
PRAGMA journal_mode = WAL;

CREATE TABLE IF NOT EXISTS tasks (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    created_at TEXT NOT NULL,
    title TEXT NOT NULL,
    description TEXT NOT NULL,
    due_date TEXT,
    tags TEXT NOT NULL DEFAULT ''
);
"#;

const SELECT_TASK: &str = "SELECT id, created_at, title, description, due_date, tags FROM tasks";

/// Production backend. One row per task; `created_at` is RFC 3339 text,
/// `due_date` is ISO `YYYY-MM-DD` text or NULL.
///
/// The connection mutex serializes writes, so operations on the same id
/// cannot interleave.
pub struct SqliteTaskStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteTaskStore {
    /// Open (or create) the database at `path` and apply the schema.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        conn.execute_batch(SCHEMA)?;
        tracing::debug!("opened task database at {}", path.display());
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }
}

fn row_to_task(row: &Row<'_>) -> rusqlite::Result<Task> {
    let created_at: String = row.get(1)?;
    let created_at = DateTime::parse_from_rfc3339(&created_at)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(1, rusqlite::types::Type::Text, Box::new(e))
        })?;

    let due_date: Option<String> = row.get(4)?;
    let due_date = due_date
        .map(|raw| {
            NaiveDate::parse_from_str(&raw, "%Y-%m-%d").map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(
                    4,
                    rusqlite::types::Type::Text,
                    Box::new(e),
                )
            })
        })
        .transpose()?;

    Ok(Task {
        id: row.get(0)?,
        created_at,
        title: row.get(2)?,
        description: row.get(3)?,
        due_date,
        tags: row.get(5)?,
    })
}

#[async_trait]
impl TaskStore for SqliteTaskStore {
    fn is_persistent(&self) -> bool {
        true
    }

    async fn list_all(&self) -> Result<Vec<Task>, StoreError> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare(&format!("{} ORDER BY id", SELECT_TASK))?;
        let rows = stmt.query_map([], row_to_task)?;

        let mut tasks = Vec::new();
        for task in rows {
            tasks.push(task?);
        }
        Ok(tasks)
    }

    async fn get(&self, id: i64) -> Result<Task, StoreError> {
        let conn = self.conn.lock().await;
        conn.query_row(
            &format!("{} WHERE id = ?1", SELECT_TASK),
            params![id],
            row_to_task,
        )
        .optional()?
        .ok_or(StoreError::NotFound)
    }

    async fn create(&self, fields: TaskFields) -> Result<Task, StoreError> {
        fields.validate().map_err(StoreError::Invalid)?;

        let created_at = Utc::now();
        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT INTO tasks (created_at, title, description, due_date, tags)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                created_at.to_rfc3339(),
                fields.title,
                fields.description,
                fields.due_date.map(|d| d.to_string()),
                fields.tags,
            ],
        )?;
        let id = conn.last_insert_rowid();
        tracing::debug!(id, "task created");

        Ok(Task {
            id,
            created_at,
            title: fields.title,
            description: fields.description,
            due_date: fields.due_date,
            tags: fields.tags,
        })
    }

    async fn update(&self, id: i64, fields: TaskFields) -> Result<Task, StoreError> {
        fields.validate().map_err(StoreError::Invalid)?;

        let conn = self.conn.lock().await;
        // Read first so the returned task carries the original created_at;
        // the lock is held across both statements.
        let existing = conn
            .query_row(
                &format!("{} WHERE id = ?1", SELECT_TASK),
                params![id],
                row_to_task,
            )
            .optional()?
            .ok_or(StoreError::NotFound)?;

        conn.execute(
            "UPDATE tasks SET title = ?1, description = ?2, due_date = ?3, tags = ?4 WHERE id = ?5",
            params![
                fields.title,
                fields.description,
                fields.due_date.map(|d| d.to_string()),
                fields.tags,
                id,
            ],
        )?;
        tracing::debug!(id, "task updated");

        Ok(Task {
            id,
            created_at: existing.created_at,
            title: fields.title,
            description: fields.description,
            due_date: fields.due_date,
            tags: fields.tags,
        })
    }

    async fn delete(&self, id: i64) -> Result<(), StoreError> {
        let conn = self.conn.lock().await;
        let changed = conn.execute("DELETE FROM tasks WHERE id = ?1", params![id])?;
        if changed == 0 {
            return Err(StoreError::NotFound);
        }
        tracing::debug!(id, "task deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn open_store(dir: &TempDir) -> SqliteTaskStore {
        SqliteTaskStore::open(&dir.path().join("tasks.db")).expect("open store")
    }

    fn sample_fields() -> TaskFields {
        TaskFields {
            title: "Buy milk".to_string(),
            description: "2% milk, 1 gallon".to_string(),
            due_date: NaiveDate::from_ymd_opt(2024, 1, 15),
            tags: "errand".to_string(),
        }
    }

    #[tokio::test]
    async fn create_then_get_round_trips_all_fields() {
        let dir = tempfile::tempdir().unwrap();
        let store = open_store(&dir);

        let created = store.create(sample_fields()).await.unwrap();
        let fetched = store.get(created.id).await.unwrap();

        assert_eq!(fetched.title, "Buy milk");
        assert_eq!(fetched.description, "2% milk, 1 gallon");
        assert_eq!(fetched.due_date, NaiveDate::from_ymd_opt(2024, 1, 15));
        assert_eq!(fetched.tags, "errand");
        // RFC 3339 round trip keeps the instant
        assert_eq!(fetched.created_at, created.created_at);
    }

    #[tokio::test]
    async fn null_due_date_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = open_store(&dir);

        let mut fields = sample_fields();
        fields.due_date = None;
        let created = store.create(fields).await.unwrap();

        assert_eq!(store.get(created.id).await.unwrap().due_date, None);
    }

    #[tokio::test]
    async fn update_keeps_created_at() {
        let dir = tempfile::tempdir().unwrap();
        let store = open_store(&dir);
        let task = store.create(sample_fields()).await.unwrap();

        let mut fields = sample_fields();
        fields.title = "Buy oat milk".to_string();
        let updated = store.update(task.id, fields).await.unwrap();

        assert_eq!(updated.created_at, task.created_at);
        let fetched = store.get(task.id).await.unwrap();
        assert_eq!(fetched.title, "Buy oat milk");
        assert_eq!(fetched.created_at, task.created_at);
    }

    #[tokio::test]
    async fn delete_removes_the_row() {
        let dir = tempfile::tempdir().unwrap();
        let store = open_store(&dir);
        let task = store.create(sample_fields()).await.unwrap();

        store.delete(task.id).await.unwrap();

        assert!(matches!(
            store.get(task.id).await,
            Err(StoreError::NotFound)
        ));
        assert!(matches!(
            store.delete(task.id).await,
            Err(StoreError::NotFound)
        ));
    }

    #[tokio::test]
    async fn invalid_fields_are_rejected_before_any_write() {
        let dir = tempfile::tempdir().unwrap();
        let store = open_store(&dir);

        let mut fields = sample_fields();
        fields.description = String::new();
        assert!(matches!(
            store.create(fields).await,
            Err(StoreError::Invalid(_))
        ));
        assert!(store.list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn tasks_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tasks.db");

        let id = {
            let store = SqliteTaskStore::open(&path).unwrap();
            store.create(sample_fields()).await.unwrap().id
        };

        let store = SqliteTaskStore::open(&path).unwrap();
        assert!(store.is_persistent());
        let task = store.get(id).await.unwrap();
        assert_eq!(task.title, "Buy milk");
    }

    #[tokio::test]
    async fn ids_are_not_reused_after_delete() {
        let dir = tempfile::tempdir().unwrap();
        let store = open_store(&dir);

        let first = store.create(sample_fields()).await.unwrap();
        store.delete(first.id).await.unwrap();
        let second = store.create(sample_fields()).await.unwrap();

        assert_ne!(first.id, second.id);
    }
}
