use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use uuid::Uuid;

use crate::{
    config::Config,
    models::{NewTask, Task, TaskPatch},
};

use super::{StoreError, TaskFilter, TaskRow, TaskStore};

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS tasks (
    id TEXT PRIMARY KEY,
    title TEXT NOT NULL,
    done BOOLEAN NOT NULL DEFAULT 0,
    due_date TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
)";

#[derive(Clone)]
pub struct SqliteTaskStore {
    pool: SqlitePool,
}

impl SqliteTaskStore {
    pub async fn connect(config: &Config) -> Self {
        let options = SqliteConnectOptions::new()
            .filename(&config.sqlite_path)
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_lazy_with(options);

        let store = Self { pool };
        if let Err(e) = store.init_schema().await {
            tracing::warn!(
                "could not initialize sqlite schema at '{}': {}",
                config.sqlite_path,
                e
            );
        }
        store
    }

    #[cfg(test)]
    pub async fn in_memory() -> Self {
        // A single connection keeps every query on the same :memory: database.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .expect("in-memory sqlite pool");
        let store = Self { pool };
        store.init_schema().await.expect("sqlite schema");
        store
    }

    async fn init_schema(&self) -> Result<(), StoreError> {
        sqlx::query(SCHEMA).execute(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl TaskStore for SqliteTaskStore {
    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<Task>, StoreError> {
        let rows = sqlx::query_as::<_, TaskRow>(
            "SELECT id, title, done, due_date, created_at, updated_at FROM tasks
             ORDER BY created_at DESC, rowid DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Task::try_from).collect()
    }

    async fn insert(&self, new: NewTask) -> Result<Task, StoreError> {
        let task = new.into_record();

        sqlx::query(
            "INSERT INTO tasks (id, title, done, due_date, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(task.id.to_string())
        .bind(&task.title)
        .bind(task.done)
        .bind(task.due_date)
        .bind(task.created_at)
        .bind(task.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(task)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Task>, StoreError> {
        let Ok(id) = Uuid::parse_str(id) else {
            return Ok(None);
        };

        let row = sqlx::query_as::<_, TaskRow>(
            "SELECT id, title, done, due_date, created_at, updated_at FROM tasks WHERE id = ?",
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Task::try_from).transpose()
    }

    async fn update(&self, id: &str, patch: TaskPatch) -> Result<Option<Task>, StoreError> {
        let Some(mut task) = self.find_by_id(id).await? else {
            return Ok(None);
        };

        patch.apply(&mut task);
        task.updated_at = chrono::Utc::now();

        sqlx::query(
            "UPDATE tasks SET title = ?, done = ?, due_date = ?, updated_at = ? WHERE id = ?",
        )
        .bind(&task.title)
        .bind(task.done)
        .bind(task.due_date)
        .bind(task.updated_at)
        .bind(task.id.to_string())
        .execute(&self.pool)
        .await?;

        Ok(Some(task))
    }

    async fn delete(&self, id: &str) -> Result<bool, StoreError> {
        let Ok(id) = Uuid::parse_str(id) else {
            return Ok(false);
        };

        let result = sqlx::query("DELETE FROM tasks WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn count(&self, filter: TaskFilter) -> Result<i64, StoreError> {
        let count = match filter {
            TaskFilter::All => {
                sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM tasks")
                    .fetch_one(&self.pool)
                    .await?
            }
            TaskFilter::Done(done) => {
                sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM tasks WHERE done = ?")
                    .bind(done)
                    .fetch_one(&self.pool)
                    .await?
            }
        };
        Ok(count)
    }
}
