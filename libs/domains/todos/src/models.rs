use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Task entity - a to-do item stored in the `tasks` collection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Task {
    /// Unique identifier (stored as _id in MongoDB)
    #[serde(rename = "_id", alias = "id")]
    pub id: Uuid,
    /// Display name
    #[serde(default)]
    pub name: Option<String>,
    /// Name of the owning category, copied at association time.
    /// `None` means uncategorized.
    #[serde(default)]
    pub category: Option<String>,
    /// Completion flag
    #[serde(default)]
    pub done: bool,
}

/// Category entity - a named group holding references to its tasks
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Category {
    /// Unique identifier (stored as _id in MongoDB). Callers address
    /// categories by `name`.
    #[serde(rename = "_id", alias = "id")]
    pub id: Uuid,
    /// Unique display name
    pub name: String,
    /// Ids of member tasks, in insertion order. May contain duplicates.
    #[serde(default)]
    pub tasks: Vec<Uuid>,
}

/// Category with its task references resolved to full task documents
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PopulatedCategory {
    #[serde(rename = "_id", alias = "id")]
    pub id: Uuid,
    pub name: String,
    pub tasks: Vec<Task>,
}

/// Fields the task store needs to insert a new document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewTask {
    pub name: Option<String>,
    pub category: Option<String>,
}

/// Request body for `POST /tasks`
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateTask {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub category_name: Option<String>,
}

/// Request body for `PUT /tasks/{id}`
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTask {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub category_name: Option<String>,
}

/// Request body for `POST /categories`
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct CreateCategory {
    pub name: String,
}

/// Request body for `PUT /categories/{name}`
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RenameCategory {
    pub new_name: String,
}

/// Response body for the count endpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CountResponse {
    pub count: u64,
}

impl Task {
    /// Build a task document from insert fields, assigning a fresh id
    pub fn new(input: NewTask) -> Self {
        Self {
            id: Uuid::now_v7(),
            name: input.name,
            category: input.category,
            done: false,
        }
    }
}

impl Category {
    /// Build an empty category document, assigning a fresh id
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::now_v7(),
            name: name.into(),
            tasks: Vec::new(),
        }
    }

    /// Resolve the task id list against `found`, keeping list order.
    ///
    /// Ids without a matching task are skipped, repeated ids repeat the task.
    pub fn populate(self, found: Vec<Task>) -> PopulatedCategory {
        let tasks = self
            .tasks
            .iter()
            .filter_map(|id| found.iter().find(|task| task.id == *id).cloned())
            .collect();

        PopulatedCategory {
            id: self.id,
            name: self.name,
            tasks,
        }
    }
}

/// Treat empty strings the same as a missing field.
pub(crate) fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}
