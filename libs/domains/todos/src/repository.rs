use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use crate::error::TodoResult;
use crate::models::{Category, NewTask, Task};

/// Task store.
///
/// Persists task documents. Knows nothing about categories.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Insert a new task with a store-generated id and `done = false`
    async fn create(&self, input: NewTask) -> TodoResult<Task>;

    /// Get a task by ID
    async fn get_by_id(&self, id: Uuid) -> TodoResult<Option<Task>>;

    /// Fetch every task whose id is in `ids`, in no particular order
    async fn find_by_ids(&self, ids: &[Uuid]) -> TodoResult<Vec<Task>>;

    /// Replace the stored document with `task`
    async fn update(&self, task: &Task) -> TodoResult<Task>;

    /// Delete a task, returning the removed document
    async fn delete(&self, id: Uuid) -> TodoResult<Option<Task>>;

    /// Total number of task documents
    async fn count(&self) -> TodoResult<u64>;
}

/// Lets a caller keep a handle on a store it has handed to the router.
#[async_trait]
impl<T: TaskRepository + ?Sized> TaskRepository for Arc<T> {
    async fn create(&self, input: NewTask) -> TodoResult<Task> {
        (**self).create(input).await
    }

    async fn get_by_id(&self, id: Uuid) -> TodoResult<Option<Task>> {
        (**self).get_by_id(id).await
    }

    async fn find_by_ids(&self, ids: &[Uuid]) -> TodoResult<Vec<Task>> {
        (**self).find_by_ids(ids).await
    }

    async fn update(&self, task: &Task) -> TodoResult<Task> {
        (**self).update(task).await
    }

    async fn delete(&self, id: Uuid) -> TodoResult<Option<Task>> {
        (**self).delete(id).await
    }

    async fn count(&self) -> TodoResult<u64> {
        (**self).count().await
    }
}

/// Category store.
///
/// Category documents are addressed by their unique name. Task list edits
/// are single-document operations so concurrent appends never overwrite
/// each other.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CategoryRepository: Send + Sync {
    /// Insert an empty category. Fails with `CategoryAlreadyExists` if the
    /// name is taken.
    async fn create(&self, name: &str) -> TodoResult<Category>;

    async fn find_by_name(&self, name: &str) -> TodoResult<Option<Category>>;

    /// Append `task_id` to the named category's list. Returns the updated
    /// category, or `None` if no category has that name.
    async fn push_task(&self, name: &str, task_id: Uuid) -> TodoResult<Option<Category>>;

    /// Remove every occurrence of `task_id` from the named category's list.
    async fn pull_task(&self, name: &str, task_id: Uuid) -> TodoResult<Option<Category>>;

    async fn rename(&self, name: &str, new_name: &str) -> TodoResult<Option<Category>>;

    /// Delete a category, returning the removed document
    async fn delete_by_name(&self, name: &str) -> TodoResult<Option<Category>>;

    /// Total number of category documents
    async fn count(&self) -> TodoResult<u64>;
}
