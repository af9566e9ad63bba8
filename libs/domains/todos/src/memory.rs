//! In-memory implementations of the task and category stores.
//!
//! Backed by `tokio::sync::RwLock` maps. Each call takes the lock once, so
//! list edits are atomic per category the same way the MongoDB `$push` /
//! `$pull` updates are. Useful for tests and for running the API without a
//! database.

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{TodoError, TodoResult};
use crate::models::{Category, NewTask, Task};
use crate::repository::{CategoryRepository, TaskRepository};

#[derive(Default)]
pub struct InMemoryTaskRepository {
    tasks: RwLock<HashMap<Uuid, Task>>,
}

impl InMemoryTaskRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every stored task, in no particular order
    pub async fn all(&self) -> Vec<Task> {
        self.tasks.read().await.values().cloned().collect()
    }
}

#[async_trait]
impl TaskRepository for InMemoryTaskRepository {
    async fn create(&self, input: NewTask) -> TodoResult<Task> {
        let task = Task::new(input);
        self.tasks.write().await.insert(task.id, task.clone());
        Ok(task)
    }

    async fn get_by_id(&self, id: Uuid) -> TodoResult<Option<Task>> {
        Ok(self.tasks.read().await.get(&id).cloned())
    }

    async fn find_by_ids(&self, ids: &[Uuid]) -> TodoResult<Vec<Task>> {
        let tasks = self.tasks.read().await;
        Ok(tasks
            .values()
            .filter(|task| ids.contains(&task.id))
            .cloned()
            .collect())
    }

    async fn update(&self, task: &Task) -> TodoResult<Task> {
        let mut tasks = self.tasks.write().await;
        match tasks.get_mut(&task.id) {
            Some(stored) => {
                *stored = task.clone();
                Ok(task.clone())
            }
            None => Err(TodoError::TaskNotFound(task.id)),
        }
    }

    async fn delete(&self, id: Uuid) -> TodoResult<Option<Task>> {
        Ok(self.tasks.write().await.remove(&id))
    }

    async fn count(&self) -> TodoResult<u64> {
        Ok(self.tasks.read().await.len() as u64)
    }
}

/// Categories keyed by name; the name is the unique key callers use.
#[derive(Default)]
pub struct InMemoryCategoryRepository {
    categories: RwLock<HashMap<String, Category>>,
}

impl InMemoryCategoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CategoryRepository for InMemoryCategoryRepository {
    async fn create(&self, name: &str) -> TodoResult<Category> {
        let mut categories = self.categories.write().await;
        if categories.contains_key(name) {
            return Err(TodoError::CategoryAlreadyExists(name.to_string()));
        }

        let category = Category::new(name);
        categories.insert(name.to_string(), category.clone());
        Ok(category)
    }

    async fn find_by_name(&self, name: &str) -> TodoResult<Option<Category>> {
        Ok(self.categories.read().await.get(name).cloned())
    }

    async fn push_task(&self, name: &str, task_id: Uuid) -> TodoResult<Option<Category>> {
        let mut categories = self.categories.write().await;
        Ok(categories.get_mut(name).map(|category| {
            category.tasks.push(task_id);
            category.clone()
        }))
    }

    async fn pull_task(&self, name: &str, task_id: Uuid) -> TodoResult<Option<Category>> {
        let mut categories = self.categories.write().await;
        Ok(categories.get_mut(name).map(|category| {
            category.tasks.retain(|id| *id != task_id);
            category.clone()
        }))
    }

    async fn rename(&self, name: &str, new_name: &str) -> TodoResult<Option<Category>> {
        let mut categories = self.categories.write().await;
        if name != new_name && categories.contains_key(new_name) {
            return Err(TodoError::CategoryAlreadyExists(new_name.to_string()));
        }

        let Some(mut category) = categories.remove(name) else {
            return Ok(None);
        };
        category.name = new_name.to_string();
        categories.insert(new_name.to_string(), category.clone());
        Ok(Some(category))
    }

    async fn delete_by_name(&self, name: &str) -> TodoResult<Option<Category>> {
        Ok(self.categories.write().await.remove(name))
    }

    async fn count(&self) -> TodoResult<u64> {
        Ok(self.categories.read().await.len() as u64)
    }
}
