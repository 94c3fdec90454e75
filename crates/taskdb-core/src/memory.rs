use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::{Result, Task, TaskFields, TaskFilter, TaskId, TaskStore};

/// Process-local task store.
#[derive(Clone, Default)]
pub struct InMemoryTaskStore {
    tasks: Arc<RwLock<HashMap<TaskId, Task>>>,
}

impl InMemoryTaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.tasks.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.tasks.read().await.is_empty()
    }
}

#[async_trait]
impl TaskStore for InMemoryTaskStore {
    async fn find(&self, filter: &TaskFilter) -> Result<Vec<Task>> {
        let matcher = filter.matcher()?;
        let tasks = self.tasks.read().await;

        Ok(tasks
            .values()
            .filter(|task| matcher.matches(task))
            .cloned()
            .collect())
    }

    async fn find_by_id(&self, id: &TaskId) -> Result<Option<Task>> {
        let tasks = self.tasks.read().await;
        Ok(tasks.get(id).cloned())
    }

    async fn insert(&self, fields: TaskFields) -> Result<Task> {
        fields.check_core_keys()?;
        let task = Task::from_fields(TaskId::new(), fields);

        let mut tasks = self.tasks.write().await;
        tasks.insert(task.id, task.clone());

        Ok(task)
    }

    async fn update(&self, id: &TaskId, patch: TaskFields) -> Result<Option<Task>> {
        patch.check_core_keys()?;
        let mut tasks = self.tasks.write().await;

        Ok(tasks.get_mut(id).map(|task| {
            task.apply(patch);
            task.clone()
        }))
    }

    async fn delete(&self, id: &TaskId) -> Result<bool> {
        let mut tasks = self.tasks.write().await;
        Ok(tasks.remove(id).is_some())
    }
}
