use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};

use super::models::task::{next_updated_at, now};
use super::models::{NewTask, PatchTask, Task};
use super::store::{StoreError, StoreResult, TaskStore};
use crate::config::DatabaseConfig;

const CREATE_TASKS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS tasks (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    done INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
)"#;

const TASK_COLUMNS: &str = "id, name, done, created_at, updated_at";

/// SQLite-backed task store
#[derive(Debug, Clone)]
pub struct SqliteTaskStore {
    pool: SqlitePool,
}

impl SqliteTaskStore {
    /// Open (or create) the database and make sure the `tasks` table exists
    pub async fn connect(config: &DatabaseConfig) -> StoreResult<Self> {
        let options = SqliteConnectOptions::from_str(&config.url)?
            .create_if_missing(true)
            .busy_timeout(Duration::from_secs(config.connection_timeout));

        // An in-memory database lives only as long as its connection
        let in_memory = config.url.contains(":memory:") || config.url.contains("mode=memory");
        let mut pool_options = SqlitePoolOptions::new()
            .acquire_timeout(Duration::from_secs(config.connection_timeout));
        pool_options = if in_memory {
            pool_options
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            pool_options.max_connections(config.max_connections)
        };

        let pool = pool_options.connect_with(options).await?;
        let store = Self::from_pool(pool);
        store.ensure_schema().await?;

        info!(url = %config.url, in_memory, "Opened task database");
        Ok(store)
    }

    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn ensure_schema(&self) -> StoreResult<()> {
        sqlx::query(CREATE_TASKS_TABLE).execute(&self.pool).await?;
        Ok(())
    }

    pub async fn close(&self) {
        self.pool.close().await;
        info!("Closed task database");
    }
}

#[async_trait]
impl TaskStore for SqliteTaskStore {
    async fn insert(&self, task: NewTask) -> StoreResult<Task> {
        let at = now();
        let sql = format!(
            "INSERT INTO tasks (name, done, created_at, updated_at) VALUES (?, ?, ?, ?) RETURNING {}",
            TASK_COLUMNS
        );
        let stored = sqlx::query_as::<_, Task>(&sql)
            .bind(&task.name)
            .bind(task.done)
            .bind(at)
            .bind(at)
            .fetch_one(&self.pool)
            .await?;
        debug!(task_id = stored.id, "Inserted task");
        Ok(stored)
    }

    async fn select_all(&self) -> StoreResult<Vec<Task>> {
        let sql = format!("SELECT {} FROM tasks ORDER BY id", TASK_COLUMNS);
        Ok(sqlx::query_as::<_, Task>(&sql).fetch_all(&self.pool).await?)
    }

    async fn select_by_id(&self, id: i64) -> StoreResult<Option<Task>> {
        let sql = format!("SELECT {} FROM tasks WHERE id = ?", TASK_COLUMNS);
        Ok(sqlx::query_as::<_, Task>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn update_by_id(&self, id: i64, patch: PatchTask) -> StoreResult<Option<Task>> {
        let mut tx = self.pool.begin().await?;

        // Open with the write so the lock is taken (and waited on) before any read
        let update = format!(
            "UPDATE tasks SET name = COALESCE(?, name), done = COALESCE(?, done) WHERE id = ? RETURNING {}",
            TASK_COLUMNS
        );
        let Some(task) = sqlx::query_as::<_, Task>(&update)
            .bind(patch.name.as_deref())
            .bind(patch.done)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
        else {
            return Ok(None);
        };

        let updated_at = next_updated_at(task.updated_at, now());
        sqlx::query("UPDATE tasks SET updated_at = ? WHERE id = ?")
            .bind(updated_at)
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        debug!(task_id = id, "Updated task");
        Ok(Some(Task { updated_at, ..task }))
    }

    async fn delete_by_id(&self, id: i64) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn ping(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        Ok(())
    }
}
