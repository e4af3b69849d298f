use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::FromRow;
use thiserror::Error;
use uuid::Uuid;

use crate::{
    config::{Config, StoreBackend},
    models::{NewTask, Task, TaskPatch},
};

pub mod postgres;
pub mod sqlite;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("invalid stored record: {0}")]
    Decode(String),
}

/// Equality filter for [`TaskStore::count`].
#[derive(Debug, Clone, Copy)]
pub enum TaskFilter {
    All,
    Done(bool),
}

/// Persistence contract for the task collection. Implementations wrap a lazy
/// connection pool: an unreachable store surfaces as a per-call error rather
/// than aborting the process.
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Liveness probe backing the health endpoint.
    async fn ping(&self) -> Result<(), StoreError>;

    /// Every task, newest first.
    async fn list_all(&self) -> Result<Vec<Task>, StoreError>;

    /// Persists a new record with a server-assigned id and timestamps.
    async fn insert(&self, new: NewTask) -> Result<Task, StoreError>;

    /// `Ok(None)` both for missing records and for ids that do not parse as
    /// UUIDs.
    async fn find_by_id(&self, id: &str) -> Result<Option<Task>, StoreError>;

    /// Applies the supplied fields and bumps `updated_at`; `Ok(None)` when no
    /// record matched.
    async fn update(&self, id: &str, patch: TaskPatch) -> Result<Option<Task>, StoreError>;

    /// Returns whether a record was actually removed.
    async fn delete(&self, id: &str) -> Result<bool, StoreError>;

    async fn count(&self, filter: TaskFilter) -> Result<i64, StoreError>;
}

/// Builds the store selected by `STORE_BACKEND`. Never fails: pools are
/// created lazily and schema init failures are logged, with later calls
/// surfacing the underlying error.
pub async fn connect(config: &Config) -> Arc<dyn TaskStore> {
    match config.store_backend {
        StoreBackend::Sqlite => Arc::new(sqlite::SqliteTaskStore::connect(config).await),
        StoreBackend::Postgres => Arc::new(postgres::PostgresTaskStore::connect(config).await),
    }
}

// Both backends persist the id as its canonical string form, so they share
// one row shape.
#[derive(Debug, FromRow)]
pub(crate) struct TaskRow {
    pub id: String,
    pub title: String,
    pub done: bool,
    pub due_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<TaskRow> for Task {
    type Error = StoreError;

    fn try_from(row: TaskRow) -> Result<Self, StoreError> {
        let id = Uuid::parse_str(&row.id)
            .map_err(|e| StoreError::Decode(format!("bad task id '{}': {}", row.id, e)))?;
        Ok(Task {
            id,
            title: row.title,
            done: row.done,
            due_date: row.due_date,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

impl NewTask {
    /// Assigns the server-generated id and creation timestamps.
    pub(crate) fn into_record(self) -> Task {
        let now = Utc::now();
        Task {
            id: Uuid::new_v4(),
            title: self.title,
            done: self.done,
            due_date: self.due_date,
            created_at: now,
            updated_at: now,
        }
    }
}
