//! In-memory task store for tests and ephemeral runs.

use async_trait::async_trait;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

use super::models::task::now;
use super::models::{NewTask, PatchTask, Task};
use super::store::{StoreResult, TaskStore};

#[derive(Debug, Default)]
pub struct MemoryTaskStore {
    state: RwLock<MemoryState>,
}

#[derive(Debug, Default)]
struct MemoryState {
    last_id: i64,
    tasks: BTreeMap<i64, Task>,
}

impl MemoryTaskStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TaskStore for MemoryTaskStore {
    async fn insert(&self, task: NewTask) -> StoreResult<Task> {
        let mut state = self.state.write().await;
        state.last_id += 1;
        let at = now();
        let stored = Task {
            id: state.last_id,
            name: task.name,
            done: task.done,
            created_at: at,
            updated_at: at,
        };
        state.tasks.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn select_all(&self) -> StoreResult<Vec<Task>> {
        let state = self.state.read().await;
        Ok(state.tasks.values().cloned().collect())
    }

    async fn select_by_id(&self, id: i64) -> StoreResult<Option<Task>> {
        let state = self.state.read().await;
        Ok(state.tasks.get(&id).cloned())
    }

    async fn update_by_id(&self, id: i64, patch: PatchTask) -> StoreResult<Option<Task>> {
        let mut state = self.state.write().await;
        let Some(task) = state.tasks.get_mut(&id) else {
            return Ok(None);
        };
        patch.apply(task, now());
        Ok(Some(task.clone()))
    }

    async fn delete_by_id(&self, id: i64) -> StoreResult<bool> {
        let mut state = self.state.write().await;
        Ok(state.tasks.remove(&id).is_some())
    }
}
