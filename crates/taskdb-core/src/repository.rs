use std::cmp::Reverse;
use std::sync::Arc;

use crate::clock::{created_at_from, Clock, SystemClock};
use crate::{Result, Task, TaskFields, TaskFilter, TaskId, TaskStore};

/// The task operations exposed to callers.
///
/// Holds no task state of its own; every call is one round trip to the store.
#[derive(Clone)]
pub struct TaskRepository {
    store: Arc<dyn TaskStore>,
    clock: Arc<dyn Clock>,
}

impl TaskRepository {
    pub fn new(store: Arc<dyn TaskStore>) -> Self {
        Self::with_clock(store, Arc::new(SystemClock))
    }

    pub fn with_clock(store: Arc<dyn TaskStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// List tasks matching `filter`, pending ones first, newest first within
    /// each group.
    pub async fn list(&self, filter: &TaskFilter) -> Result<Vec<Task>> {
        let mut tasks = self.store.find(filter).await?;
        sort_for_listing(&mut tasks);

        tracing::debug!(
            "Listed {} tasks (status: {:?}, title: {:?})",
            tasks.len(),
            filter.status,
            filter.title
        );

        Ok(tasks)
    }

    /// Get task by ID. Absence is `Ok(None)`; a malformed id is an error.
    pub async fn get_by_id(&self, id: &str) -> Result<Option<Task>> {
        let id = TaskId::parse(id)?;
        let task = self.store.find_by_id(&id).await?;

        tracing::debug!("Fetched task {} (found: {})", id, task.is_some());

        Ok(task)
    }

    /// Create a task. Any caller-supplied `createdAt` is replaced.
    pub async fn create(&self, mut input: TaskFields) -> Result<Task> {
        warn_reserved(input.strip_reserved());
        input.clear_created_at();
        input.check_core_keys()?;
        input.created_at = Some(created_at_from(self.clock.now()));

        let task = self.store.insert(input).await?;

        tracing::info!("Created task: {} ({})", task.title, task.id);

        Ok(task)
    }

    /// Merge `input` into the stored task and return the result.
    pub async fn update(&self, id: &str, mut input: TaskFields) -> Result<Option<Task>> {
        let id = TaskId::parse(id)?;
        warn_reserved(input.strip_reserved());
        input.check_core_keys()?;

        if input.is_empty() {
            tracing::debug!("Empty update for task {}, nothing to write", id);
            return self.store.find_by_id(&id).await;
        }

        let task = self.store.update(&id, input).await?;

        match &task {
            Some(task) => tracing::info!("Updated task: {} ({})", task.title, task.id),
            None => tracing::debug!("Update skipped, task {} not found", id),
        }

        Ok(task)
    }

    /// Delete task by ID; `false` when nothing matched.
    pub async fn delete(&self, id: &str) -> Result<bool> {
        let id = TaskId::parse(id)?;
        let deleted = self.store.delete(&id).await?;

        if deleted {
            tracing::info!("Deleted task {}", id);
        }

        Ok(deleted)
    }
}

fn warn_reserved(removed: Vec<String>) {
    if !removed.is_empty() {
        tracing::warn!("Ignoring reserved task fields: {:?}", removed);
    }
}

/// Pending partition first, then `createdAt` descending. Tasks without a
/// timestamp go last in their partition.
pub fn sort_for_listing(tasks: &mut [Task]) {
    tasks.sort_by_cached_key(|task| (Reverse(task.is_pending()), Reverse(task.created_at)));
}
