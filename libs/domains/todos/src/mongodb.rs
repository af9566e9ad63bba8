//! MongoDB implementations of the task and category stores

use async_trait::async_trait;
use futures_util::TryStreamExt;
use mongodb::{
    Collection, Database, IndexModel,
    bson::{Binary, Bson, Document, doc, spec::BinarySubtype},
    options::{IndexOptions, ReturnDocument},
};
use tracing::instrument;
use uuid::Uuid;

use crate::error::{TodoError, TodoResult, is_duplicate_key};
use crate::models::{Category, NewTask, Task};
use crate::repository::{CategoryRepository, TaskRepository};

/// A `Uuid` as the driver stores it inside a serialized `Task` or `Category`.
///
/// Documents go through the binary BSON serializer, which writes a `Uuid` as
/// generic binary. `to_bson` would produce a string instead, and a string
/// never matches a stored binary value, so every filter and list update that
/// names an id must use this encoding.
fn uuid_bson(id: Uuid) -> Bson {
    Bson::Binary(Binary {
        subtype: BinarySubtype::Generic,
        bytes: id.as_bytes().to_vec(),
    })
}

fn id_filter(id: Uuid) -> Document {
    doc! { "_id": uuid_bson(id) }
}

/// MongoDB implementation of the TaskRepository
pub struct MongoTaskRepository {
    collection: Collection<Task>,
}

impl MongoTaskRepository {
    /// Create a new MongoTaskRepository on the `tasks` collection
    pub fn new(db: &Database) -> Self {
        Self::with_collection(db, "tasks")
    }

    /// Create a new MongoTaskRepository with a custom collection name
    pub fn with_collection(db: &Database, collection_name: &str) -> Self {
        let collection = db.collection::<Task>(collection_name);
        Self { collection }
    }

    /// Get the underlying collection for advanced operations
    pub fn collection(&self) -> &Collection<Task> {
        &self.collection
    }

    /// Initialize indexes used by category lookups
    pub async fn init_indexes(&self) -> TodoResult<()> {
        let index = IndexModel::builder()
            .keys(doc! { "category": 1 })
            .options(
                IndexOptions::builder()
                    .name("idx_category".to_string())
                    .build(),
            )
            .build();

        self.collection.create_index(index).await?;
        tracing::info!("Task indexes created successfully");
        Ok(())
    }
}

#[async_trait]
impl TaskRepository for MongoTaskRepository {
    #[instrument(skip(self, input))]
    async fn create(&self, input: NewTask) -> TodoResult<Task> {
        let task = Task::new(input);

        self.collection.insert_one(&task).await?;

        tracing::info!(task_id = %task.id, "Task created successfully");
        Ok(task)
    }

    #[instrument(skip(self))]
    async fn get_by_id(&self, id: Uuid) -> TodoResult<Option<Task>> {
        let task = self.collection.find_one(id_filter(id)).await?;
        Ok(task)
    }

    #[instrument(skip(self, ids), fields(count = ids.len()))]
    async fn find_by_ids(&self, ids: &[Uuid]) -> TodoResult<Vec<Task>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<Bson> = ids.iter().copied().map(uuid_bson).collect();
        let filter = doc! { "_id": { "$in": ids } };
        let cursor = self.collection.find(filter).await?;
        let tasks: Vec<Task> = cursor.try_collect().await?;

        Ok(tasks)
    }

    #[instrument(skip(self, task), fields(task_id = %task.id))]
    async fn update(&self, task: &Task) -> TodoResult<Task> {
        let result = self.collection.replace_one(id_filter(task.id), task).await?;

        if result.matched_count == 0 {
            return Err(TodoError::TaskNotFound(task.id));
        }

        tracing::info!(task_id = %task.id, "Task updated successfully");
        Ok(task.clone())
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: Uuid) -> TodoResult<Option<Task>> {
        let deleted = self.collection.find_one_and_delete(id_filter(id)).await?;

        if deleted.is_some() {
            tracing::info!(task_id = %id, "Task deleted successfully");
        }
        Ok(deleted)
    }

    #[instrument(skip(self))]
    async fn count(&self) -> TodoResult<u64> {
        let count = self.collection.count_documents(doc! {}).await?;
        Ok(count)
    }
}

/// MongoDB implementation of the CategoryRepository
pub struct MongoCategoryRepository {
    collection: Collection<Category>,
}

impl MongoCategoryRepository {
    /// Create a new MongoCategoryRepository on the `categories` collection
    pub fn new(db: &Database) -> Self {
        Self::with_collection(db, "categories")
    }

    /// Create a new MongoCategoryRepository with a custom collection name
    pub fn with_collection(db: &Database, collection_name: &str) -> Self {
        let collection = db.collection::<Category>(collection_name);
        Self { collection }
    }

    pub fn collection(&self) -> &Collection<Category> {
        &self.collection
    }

    /// Initialize the unique name index
    pub async fn init_indexes(&self) -> TodoResult<()> {
        let index = IndexModel::builder()
            .keys(doc! { "name": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name("idx_name_unique".to_string())
                    .build(),
            )
            .build();

        self.collection.create_index(index).await?;
        tracing::info!("Category indexes created successfully");
        Ok(())
    }

    /// Apply `update` to the category called `name` and return the post-image
    async fn update_by_name(
        &self,
        name: &str,
        update: Document,
    ) -> mongodb::error::Result<Option<Category>> {
        self.collection
            .find_one_and_update(doc! { "name": name }, update)
            .return_document(ReturnDocument::After)
            .await
    }
}

#[async_trait]
impl CategoryRepository for MongoCategoryRepository {
    #[instrument(skip(self))]
    async fn create(&self, name: &str) -> TodoResult<Category> {
        let category = Category::new(name);

        match self.collection.insert_one(&category).await {
            Ok(_) => {}
            Err(e) if is_duplicate_key(&e) => {
                return Err(TodoError::CategoryAlreadyExists(name.to_string()));
            }
            Err(e) => return Err(e.into()),
        }

        tracing::info!(category = %name, "Category created successfully");
        Ok(category)
    }

    #[instrument(skip(self))]
    async fn find_by_name(&self, name: &str) -> TodoResult<Option<Category>> {
        let category = self.collection.find_one(doc! { "name": name }).await?;
        Ok(category)
    }

    #[instrument(skip(self))]
    async fn push_task(&self, name: &str, task_id: Uuid) -> TodoResult<Option<Category>> {
        let update = doc! { "$push": { "tasks": uuid_bson(task_id) } };
        Ok(self.update_by_name(name, update).await?)
    }

    #[instrument(skip(self))]
    async fn pull_task(&self, name: &str, task_id: Uuid) -> TodoResult<Option<Category>> {
        let update = doc! { "$pull": { "tasks": uuid_bson(task_id) } };
        Ok(self.update_by_name(name, update).await?)
    }

    #[instrument(skip(self))]
    async fn rename(&self, name: &str, new_name: &str) -> TodoResult<Option<Category>> {
        let update = doc! { "$set": { "name": new_name } };
        match self.update_by_name(name, update).await {
            Ok(category) => Ok(category),
            Err(e) if is_duplicate_key(&e) => {
                Err(TodoError::CategoryAlreadyExists(new_name.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    #[instrument(skip(self))]
    async fn delete_by_name(&self, name: &str) -> TodoResult<Option<Category>> {
        let deleted = self
            .collection
            .find_one_and_delete(doc! { "name": name })
            .await?;

        if deleted.is_some() {
            tracing::info!(category = %name, "Category deleted successfully");
        }
        Ok(deleted)
    }

    #[instrument(skip(self))]
    async fn count(&self) -> TodoResult<u64> {
        let count = self.collection.count_documents(doc! {}).await?;
        Ok(count)
    }
}
