use async_trait::async_trait;
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions};
use uuid::Uuid;

use crate::{
    config::Config,
    models::{NewTask, Task, TaskPatch},
};

use super::{StoreError, TaskFilter, TaskRow, TaskStore};

// Same schema the original deployment used; ids stay VARCHAR so both
// backends persist the canonical uuid string.
const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS tasks (
    id VARCHAR(50) PRIMARY KEY,
    title VARCHAR(255) NOT NULL,
    done BOOLEAN NOT NULL DEFAULT FALSE,
    due_date DATE,
    created_at TIMESTAMPTZ NOT NULL,
    updated_at TIMESTAMPTZ NOT NULL
)";

#[derive(Clone)]
pub struct PostgresTaskStore {
    pool: PgPool,
}

impl PostgresTaskStore {
    pub async fn connect(config: &Config) -> Self {
        let options = PgConnectOptions::new()
            .host(&config.db_host)
            .port(config.db_port)
            .username(&config.db_user)
            .password(&config.db_password)
            .database(&config.db_name);

        // Lazy pool: an unreachable server degrades to per-request errors
        // instead of aborting startup.
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect_lazy_with(options);

        let store = Self { pool };
        if let Err(e) = store.init_schema().await {
            tracing::warn!(
                "could not initialize postgres schema on {}:{}: {}",
                config.db_host,
                config.db_port,
                e
            );
        }
        store
    }

    async fn init_schema(&self) -> Result<(), StoreError> {
        sqlx::query(SCHEMA).execute(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl TaskStore for PostgresTaskStore {
    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<Task>, StoreError> {
        let rows = sqlx::query_as::<_, TaskRow>(
            "SELECT id, title, done, due_date, created_at, updated_at FROM tasks
             ORDER BY created_at DESC, id DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Task::try_from).collect()
    }

    async fn insert(&self, new: NewTask) -> Result<Task, StoreError> {
        let task = new.into_record();

        sqlx::query(
            "INSERT INTO tasks (id, title, done, due_date, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6)",
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
            "SELECT id, title, done, due_date, created_at, updated_at FROM tasks WHERE id = $1",
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
            "UPDATE tasks SET title = $1, done = $2, due_date = $3, updated_at = $4 WHERE id = $5",
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

        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
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
                sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM tasks WHERE done = $1")
                    .bind(done)
                    .fetch_one(&self.pool)
                    .await?
            }
        };
        Ok(count)
    }
}
