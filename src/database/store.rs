//! Persistence port the task handlers depend on.

use async_trait::async_trait;
use thiserror::Error;

use super::models::{NewTask, PatchTask, Task};

/// Errors from task stores
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Task persistence contract.
///
/// Absence is a normal outcome: lookups return `None` and deletes return
/// `false` rather than erroring.
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Persist a new task; the store assigns `id`, `created_at` and `updated_at`.
    async fn insert(&self, task: NewTask) -> StoreResult<Task>;

    /// All tasks in ascending id order
    async fn select_all(&self) -> StoreResult<Vec<Task>>;

    async fn select_by_id(&self, id: i64) -> StoreResult<Option<Task>>;

    /// Apply a partial update and regenerate `updated_at`.
    ///
    /// Returns `None` when no task has this id.
    async fn update_by_id(&self, id: i64, patch: PatchTask) -> StoreResult<Option<Task>>;

    /// Returns whether a task was removed
    async fn delete_by_id(&self, id: i64) -> StoreResult<bool>;

    /// Connectivity check for health reporting
    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}
