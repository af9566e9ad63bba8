//! Task/category services.
//!
//! [`AssociationService`] owns every write that touches the link between a
//! task's `category` field and a category's `tasks` list. [`QueryService`]
//! is read-only.
//!
//! Writes spanning both stores run in a fixed order without a transaction.
//! A failure after the first write leaves the first write in place; these
//! partial states are part of the contract:
//!
//! - creating a task with an unknown category still stores the task
//! - changing a task's category appends it to the new category without
//!   removing it from the previous one
//! - renaming or deleting a category leaves member tasks pointing at the old
//!   name

use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;

use crate::error::{TodoError, TodoResult};
use crate::models::{
    Category, CreateTask, NewTask, PopulatedCategory, Task, UpdateTask, non_empty,
};
use crate::repository::{CategoryRepository, TaskRepository};

/// Write operations that keep the task ↔ category association in step
pub struct AssociationService<T: TaskRepository, C: CategoryRepository> {
    tasks: Arc<T>,
    categories: Arc<C>,
}

impl<T: TaskRepository, C: CategoryRepository> AssociationService<T, C> {
    pub fn new(tasks: Arc<T>, categories: Arc<C>) -> Self {
        Self { tasks, categories }
    }

    /// Create a task, then append it to its category if one was named.
    ///
    /// The task is stored before the category is looked up, so an unknown
    /// category yields `CategoryNotFound` with the task already persisted.
    #[instrument(skip(self, input))]
    pub async fn create_task(&self, input: CreateTask) -> TodoResult<Task> {
        let category_name = non_empty(input.category_name);

        let task = self
            .tasks
            .create(NewTask {
                name: input.name,
                category: category_name.clone(),
            })
            .await?;

        if let Some(name) = category_name {
            if self.categories.push_task(&name, task.id).await?.is_none() {
                tracing::warn!(
                    task_id = %task.id,
                    category = %name,
                    "Task stored with a category that does not exist"
                );
                return Err(TodoError::CategoryNotFound(name));
            }
        }

        Ok(task)
    }

    /// Update a task's name and/or category.
    ///
    /// A new category gets the task id appended before the task itself is
    /// saved. If the category does not exist nothing is saved.
    #[instrument(skip(self, input))]
    pub async fn update_task(&self, id: Uuid, input: UpdateTask) -> TodoResult<Task> {
        let mut task = self
            .tasks
            .get_by_id(id)
            .await?
            .ok_or(TodoError::TaskNotFound(id))?;

        if let Some(name) = non_empty(input.name) {
            task.name = Some(name);
        }

        if let Some(category_name) = non_empty(input.category_name) {
            task.category = Some(category_name.clone());
            if self
                .categories
                .push_task(&category_name, id)
                .await?
                .is_none()
            {
                return Err(TodoError::CategoryNotFound(category_name));
            }
        }

        self.tasks.update(&task).await
    }

    /// Delete a task and pull its id out of the category it names.
    #[instrument(skip(self))]
    pub async fn delete_task(&self, id: Uuid) -> TodoResult<Task> {
        let task = self
            .tasks
            .delete(id)
            .await?
            .ok_or(TodoError::TaskNotFound(id))?;

        if let Some(category_name) = &task.category {
            if self.categories.pull_task(category_name, id).await?.is_none() {
                tracing::debug!(
                    task_id = %id,
                    category = %category_name,
                    "Deleted task referenced a missing category"
                );
            }
        }

        Ok(task)
    }

    #[instrument(skip(self))]
    pub async fn mark_task_done(&self, id: Uuid) -> TodoResult<Task> {
        let mut task = self
            .tasks
            .get_by_id(id)
            .await?
            .ok_or(TodoError::TaskNotFound(id))?;

        task.done = true;
        self.tasks.update(&task).await
    }

    #[instrument(skip(self))]
    pub async fn create_category(&self, name: &str) -> TodoResult<Category> {
        if self.categories.find_by_name(name).await?.is_some() {
            return Err(TodoError::CategoryAlreadyExists(name.to_string()));
        }

        self.categories.create(name).await
    }

    /// Rename a category. Member tasks keep the old name.
    #[instrument(skip(self))]
    pub async fn rename_category(&self, name: &str, new_name: &str) -> TodoResult<Category> {
        let existing = self
            .categories
            .find_by_name(name)
            .await?
            .ok_or_else(|| TodoError::CategoryNotFound(name.to_string()))?;

        if name == new_name {
            return Ok(existing);
        }

        if self.categories.find_by_name(new_name).await?.is_some() {
            return Err(TodoError::CategoryAlreadyExists(new_name.to_string()));
        }

        self.categories
            .rename(name, new_name)
            .await?
            .ok_or_else(|| TodoError::CategoryNotFound(name.to_string()))
    }

    /// Delete a category document. Member tasks are left untouched.
    #[instrument(skip(self))]
    pub async fn delete_category(&self, name: &str) -> TodoResult<Category> {
        self.categories
            .delete_by_name(name)
            .await?
            .ok_or_else(|| TodoError::CategoryNotFound(name.to_string()))
    }
}

impl<T: TaskRepository, C: CategoryRepository> Clone for AssociationService<T, C> {
    fn clone(&self) -> Self {
        Self {
            tasks: Arc::clone(&self.tasks),
            categories: Arc::clone(&self.categories),
        }
    }
}

/// Side-effect-free lookups and counts
pub struct QueryService<T: TaskRepository, C: CategoryRepository> {
    tasks: Arc<T>,
    categories: Arc<C>,
}

impl<T: TaskRepository, C: CategoryRepository> QueryService<T, C> {
    pub fn new(tasks: Arc<T>, categories: Arc<C>) -> Self {
        Self { tasks, categories }
    }

    #[instrument(skip(self))]
    pub async fn get_task(&self, id: Uuid) -> TodoResult<Task> {
        self.tasks
            .get_by_id(id)
            .await?
            .ok_or(TodoError::TaskNotFound(id))
    }

    /// Get a category with its task ids resolved to task documents, in
    /// list order
    #[instrument(skip(self))]
    pub async fn get_category(&self, name: &str) -> TodoResult<PopulatedCategory> {
        let category = self
            .categories
            .find_by_name(name)
            .await?
            .ok_or_else(|| TodoError::CategoryNotFound(name.to_string()))?;

        let tasks = self.tasks.find_by_ids(&category.tasks).await?;
        Ok(category.populate(tasks))
    }

    #[instrument(skip(self))]
    pub async fn count_tasks(&self) -> TodoResult<u64> {
        self.tasks.count().await
    }

    #[instrument(skip(self))]
    pub async fn count_categories(&self) -> TodoResult<u64> {
        self.categories.count().await
    }

    /// Length of the category's task list. Counts list entries, not live
    /// task documents.
    #[instrument(skip(self))]
    pub async fn count_category_tasks(&self, name: &str) -> TodoResult<u64> {
        let category = self
            .categories
            .find_by_name(name)
            .await?
            .ok_or_else(|| TodoError::CategoryNotFound(name.to_string()))?;

        Ok(category.tasks.len() as u64)
    }
}

impl<T: TaskRepository, C: CategoryRepository> Clone for QueryService<T, C> {
    fn clone(&self) -> Self {
        Self {
            tasks: Arc::clone(&self.tasks),
            categories: Arc::clone(&self.categories),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::{MockCategoryRepository, MockTaskRepository};

    fn association(
        tasks: MockTaskRepository,
        categories: MockCategoryRepository,
    ) -> AssociationService<MockTaskRepository, MockCategoryRepository> {
        AssociationService::new(Arc::new(tasks), Arc::new(categories))
    }

    fn query(
        tasks: MockTaskRepository,
        categories: MockCategoryRepository,
    ) -> QueryService<MockTaskRepository, MockCategoryRepository> {
        QueryService::new(Arc::new(tasks), Arc::new(categories))
    }

    fn stored_task(name: &str, category: Option<&str>) -> Task {
        Task::new(NewTask {
            name: Some(name.to_string()),
            category: category.map(str::to_string),
        })
    }

    #[tokio::test]
    async fn test_create_task_without_category_skips_category_store() {
        let mut tasks = MockTaskRepository::new();
        tasks
            .expect_create()
            .withf(|input| input.category.is_none())
            .times(1)
            .returning(|input| Ok(Task::new(input)));

        // No expectations: any call on the category store fails the test
        let categories = MockCategoryRepository::new();

        let service = association(tasks, categories);
        let task = service
            .create_task(CreateTask {
                name: Some("write report".into()),
                category_name: None,
            })
            .await
            .unwrap();

        assert_eq!(task.category, None);
        assert!(!task.done);
    }

    #[tokio::test]
    async fn test_create_task_with_empty_category_is_uncategorized() {
        let mut tasks = MockTaskRepository::new();
        tasks
            .expect_create()
            .withf(|input| input.category.is_none())
            .returning(|input| Ok(Task::new(input)));

        let service = association(tasks, MockCategoryRepository::new());
        let task = service
            .create_task(CreateTask {
                name: Some("x".into()),
                category_name: Some(String::new()),
            })
            .await
            .unwrap();

        assert_eq!(task.category, None);
    }

    #[tokio::test]
    async fn test_create_task_appends_to_existing_category() {
        let mut tasks = MockTaskRepository::new();
        tasks
            .expect_create()
            .returning(|input| Ok(Task::new(input)));

        let mut categories = MockCategoryRepository::new();
        categories
            .expect_push_task()
            .withf(|name, _| name == "work")
            .times(1)
            .returning(|name, id| {
                let mut category = Category::new(name);
                category.tasks.push(id);
                Ok(Some(category))
            });

        let service = association(tasks, categories);
        let task = service
            .create_task(CreateTask {
                name: Some("write report".into()),
                category_name: Some("work".into()),
            })
            .await
            .unwrap();

        assert_eq!(task.category.as_deref(), Some("work"));
    }

    #[tokio::test]
    async fn test_create_task_with_unknown_category_keeps_task() {
        let mut tasks = MockTaskRepository::new();
        tasks
            .expect_create()
            .withf(|input| {
                input.name.as_deref() == Some("orphan")
                    && input.category.as_deref() == Some("nowhere")
            })
            .times(1)
            .returning(|input| Ok(Task::new(input)));
        // The task must not be rolled back
        tasks.expect_delete().never();

        let mut categories = MockCategoryRepository::new();
        categories
            .expect_push_task()
            .withf(|name, _| name == "nowhere")
            .times(1)
            .returning(|_, _| Ok(None));

        let service = association(tasks, categories);
        let err = service
            .create_task(CreateTask {
                name: Some("orphan".into()),
                category_name: Some("nowhere".into()),
            })
            .await
            .unwrap_err();

        assert!(matches!(err, TodoError::CategoryNotFound(name) if name == "nowhere"));
    }

    #[tokio::test]
    async fn test_update_task_missing_fails() {
        let mut tasks = MockTaskRepository::new();
        tasks.expect_get_by_id().returning(|_| Ok(None));

        let service = association(tasks, MockCategoryRepository::new());
        let id = Uuid::now_v7();
        let err = service
            .update_task(id, UpdateTask::default())
            .await
            .unwrap_err();

        assert!(matches!(err, TodoError::TaskNotFound(missing) if missing == id));
    }

    #[tokio::test]
    async fn test_update_task_does_not_pull_from_previous_category() {
        let task = stored_task("a", Some("home"));
        let id = task.id;

        let mut tasks = MockTaskRepository::new();
        tasks
            .expect_get_by_id()
            .returning(move |_| Ok(Some(task.clone())));
        tasks
            .expect_update()
            .withf(|task| task.category.as_deref() == Some("work"))
            .returning(|task| Ok(task.clone()));

        let mut categories = MockCategoryRepository::new();
        categories
            .expect_push_task()
            .withf(move |name, task_id| name == "work" && *task_id == id)
            .times(1)
            .returning(|name, _| Ok(Some(Category::new(name))));
        categories.expect_pull_task().never();

        let service = association(tasks, categories);
        let updated = service
            .update_task(
                id,
                UpdateTask {
                    name: None,
                    category_name: Some("work".into()),
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.category.as_deref(), Some("work"));
        assert_eq!(updated.name.as_deref(), Some("a"));
    }

    #[tokio::test]
    async fn test_update_task_unknown_category_saves_nothing() {
        let task = stored_task("a", None);
        let id = task.id;

        let mut tasks = MockTaskRepository::new();
        tasks
            .expect_get_by_id()
            .returning(move |_| Ok(Some(task.clone())));
        tasks.expect_update().never();

        let mut categories = MockCategoryRepository::new();
        categories.expect_push_task().returning(|_, _| Ok(None));

        let service = association(tasks, categories);
        let err = service
            .update_task(
                id,
                UpdateTask {
                    name: Some("b".into()),
                    category_name: Some("nowhere".into()),
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, TodoError::CategoryNotFound(_)));
    }

    #[tokio::test]
    async fn test_update_task_name_only() {
        let task = stored_task("a", Some("work"));
        let id = task.id;

        let mut tasks = MockTaskRepository::new();
        tasks
            .expect_get_by_id()
            .returning(move |_| Ok(Some(task.clone())));
        tasks.expect_update().returning(|task| Ok(task.clone()));

        let mut categories = MockCategoryRepository::new();
        categories.expect_push_task().never();

        let service = association(tasks, categories);
        let updated = service
            .update_task(
                id,
                UpdateTask {
                    name: Some("b".into()),
                    category_name: None,
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.name.as_deref(), Some("b"));
        assert_eq!(updated.category.as_deref(), Some("work"));
    }

    #[tokio::test]
    async fn test_delete_task_pulls_from_its_category() {
        let task = stored_task("a", Some("work"));
        let id = task.id;
        let deleted = task.clone();

        let mut tasks = MockTaskRepository::new();
        tasks
            .expect_delete()
            .returning(move |_| Ok(Some(deleted.clone())));

        let mut categories = MockCategoryRepository::new();
        categories
            .expect_pull_task()
            .withf(move |name, task_id| name == "work" && *task_id == id)
            .times(1)
            .returning(|name, _| Ok(Some(Category::new(name))));

        let service = association(tasks, categories);
        assert_eq!(service.delete_task(id).await.unwrap(), task);
    }

    #[tokio::test]
    async fn test_delete_uncategorized_task_only_deletes_task() {
        let task = stored_task("a", None);
        let id = task.id;

        let mut tasks = MockTaskRepository::new();
        tasks
            .expect_delete()
            .returning(move |_| Ok(Some(task.clone())));

        let mut categories = MockCategoryRepository::new();
        categories.expect_pull_task().never();

        let service = association(tasks, categories);
        service.delete_task(id).await.unwrap();
    }

    #[tokio::test]
    async fn test_delete_task_with_dangling_category_succeeds() {
        let task = stored_task("a", Some("gone"));
        let id = task.id;

        let mut tasks = MockTaskRepository::new();
        tasks
            .expect_delete()
            .returning(move |_| Ok(Some(task.clone())));

        let mut categories = MockCategoryRepository::new();
        categories.expect_pull_task().returning(|_, _| Ok(None));

        let service = association(tasks, categories);
        assert!(service.delete_task(id).await.is_ok());
    }

    #[tokio::test]
    async fn test_mark_task_done_only_sets_done() {
        let task = stored_task("a", Some("work"));
        let id = task.id;

        let mut tasks = MockTaskRepository::new();
        tasks
            .expect_get_by_id()
            .returning(move |_| Ok(Some(task.clone())));
        tasks.expect_update().returning(|task| Ok(task.clone()));

        let service = association(tasks, MockCategoryRepository::new());
        let done = service.mark_task_done(id).await.unwrap();

        assert!(done.done);
        assert_eq!(done.name.as_deref(), Some("a"));
        assert_eq!(done.category.as_deref(), Some("work"));
    }

    #[tokio::test]
    async fn test_mark_task_done_missing_fails() {
        let mut tasks = MockTaskRepository::new();
        tasks.expect_get_by_id().returning(|_| Ok(None));
        tasks.expect_update().never();

        let service = association(tasks, MockCategoryRepository::new());
        let err = service.mark_task_done(Uuid::now_v7()).await.unwrap_err();
        assert!(matches!(err, TodoError::TaskNotFound(_)));
    }

    #[tokio::test]
    async fn test_create_category_rejects_duplicate_name() {
        let mut categories = MockCategoryRepository::new();
        categories
            .expect_find_by_name()
            .returning(|name| Ok(Some(Category::new(name))));
        categories.expect_create().never();

        let service = association(MockTaskRepository::new(), categories);
        let err = service.create_category("work").await.unwrap_err();
        assert!(matches!(err, TodoError::CategoryAlreadyExists(name) if name == "work"));
    }

    #[tokio::test]
    async fn test_rename_category_missing_fails() {
        let mut categories = MockCategoryRepository::new();
        categories.expect_find_by_name().returning(|_| Ok(None));
        categories.expect_rename().never();

        let service = association(MockTaskRepository::new(), categories);
        let err = service.rename_category("work", "job").await.unwrap_err();
        assert!(matches!(err, TodoError::CategoryNotFound(name) if name == "work"));
    }

    #[tokio::test]
    async fn test_rename_category_never_touches_tasks() {
        let mut categories = MockCategoryRepository::new();
        categories
            .expect_find_by_name()
            .withf(|name| name == "work")
            .returning(|name| Ok(Some(Category::new(name))));
        categories
            .expect_find_by_name()
            .withf(|name| name == "job")
            .returning(|_| Ok(None));
        categories
            .expect_rename()
            .returning(|_, new_name| Ok(Some(Category::new(new_name))));

        // No task store expectations at all
        let service = association(MockTaskRepository::new(), categories);
        let renamed = service.rename_category("work", "job").await.unwrap();
        assert_eq!(renamed.name, "job");
    }

    #[tokio::test]
    async fn test_delete_category_missing_fails() {
        let mut categories = MockCategoryRepository::new();
        categories.expect_delete_by_name().returning(|_| Ok(None));

        let service = association(MockTaskRepository::new(), categories);
        let err = service.delete_category("work").await.unwrap_err();
        assert!(matches!(err, TodoError::CategoryNotFound(_)));
    }

    #[tokio::test]
    async fn test_get_category_populates_in_list_order() {
        let first = stored_task("first", Some("work"));
        let second = stored_task("second", Some("work"));

        let mut category = Category::new("work");
        category.tasks = vec![first.id, second.id];

        let mut categories = MockCategoryRepository::new();
        categories
            .expect_find_by_name()
            .returning(move |_| Ok(Some(category.clone())));

        let found = vec![second.clone(), first.clone()];
        let mut tasks = MockTaskRepository::new();
        tasks
            .expect_find_by_ids()
            .returning(move |_| Ok(found.clone()));

        let service = query(tasks, categories);
        let populated = service.get_category("work").await.unwrap();
        assert_eq!(populated.tasks, vec![first, second]);
    }

    #[tokio::test]
    async fn test_count_category_tasks_counts_list_entries() {
        let mut category = Category::new("work");
        category.tasks = vec![Uuid::now_v7(), Uuid::now_v7(), Uuid::now_v7()];

        let mut categories = MockCategoryRepository::new();
        categories
            .expect_find_by_name()
            .returning(move |_| Ok(Some(category.clone())));

        // Task store is never consulted
        let service = query(MockTaskRepository::new(), categories);
        assert_eq!(service.count_category_tasks("work").await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_count_category_tasks_missing_fails() {
        let mut categories = MockCategoryRepository::new();
        categories.expect_find_by_name().returning(|_| Ok(None));

        let service = query(MockTaskRepository::new(), categories);
        let err = service.count_category_tasks("work").await.unwrap_err();
        assert!(matches!(err, TodoError::CategoryNotFound(_)));
    }

    #[tokio::test]
    async fn test_counts_delegate_to_stores() {
        let mut tasks = MockTaskRepository::new();
        tasks.expect_count().returning(|| Ok(7));
        let mut categories = MockCategoryRepository::new();
        categories.expect_count().returning(|| Ok(2));

        let service = query(tasks, categories);
        assert_eq!(service.count_tasks().await.unwrap(), 7);
        assert_eq!(service.count_categories().await.unwrap(), 2);
    }
}
