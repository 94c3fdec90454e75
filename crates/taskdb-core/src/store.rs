use async_trait::async_trait;

use crate::{Result, Task, TaskFields, TaskFilter, TaskId};

/// Document-level access to the tasks collection.
///
/// Implementations perform exactly one request per call and apply no
/// ordering; sorting is the repository's job.
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// All tasks matching `filter`, in store order.
    async fn find(&self, filter: &TaskFilter) -> Result<Vec<Task>>;

    async fn find_by_id(&self, id: &TaskId) -> Result<Option<Task>>;

    /// Insert and return the stored task with its new id.
    async fn insert(&self, fields: TaskFields) -> Result<Task>;

    /// Overwrite the fields present in `patch`; `None` when `id` is unknown.
    async fn update(&self, id: &TaskId, patch: TaskFields) -> Result<Option<Task>>;

    /// `true` when a task was removed.
    async fn delete(&self, id: &TaskId) -> Result<bool>;
}
