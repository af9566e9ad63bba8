use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put},
};
use axum_helpers::{
    AppError, JsonBody, UuidPath,
    errors::responses::{
        BadRequestResponse, BadRequestUuidResponse, InternalServerErrorResponse, NotFoundResponse,
    },
};
use std::sync::Arc;
use utoipa::OpenApi;

use crate::error::{TodoError, TodoResult};
use crate::models::{
    Category, CountResponse, CreateCategory, CreateTask, PopulatedCategory, RenameCategory, Task,
    UpdateTask,
};
use crate::repository::{CategoryRepository, TaskRepository};
use crate::service::{AssociationService, QueryService};

/// OpenAPI documentation for the Tasks and Categories API
#[derive(OpenApi)]
#[openapi(
    paths(
        create_task,
        update_task,
        delete_task,
        get_task,
        mark_task_done,
        count_tasks,
        create_category,
        rename_category,
        delete_category,
        get_category,
        count_categories,
        count_category_tasks,
    ),
    components(
        schemas(
            Task,
            Category,
            PopulatedCategory,
            CreateTask,
            UpdateTask,
            CreateCategory,
            RenameCategory,
            CountResponse
        ),
        responses(
            NotFoundResponse,
            BadRequestResponse,
            BadRequestUuidResponse,
            InternalServerErrorResponse
        )
    ),
    tags(
        (name = "Tasks", description = "Task management endpoints"),
        (name = "Categories", description = "Category management endpoints")
    )
)]
pub struct ApiDoc;

/// Services shared by every handler
pub struct TodoState<T: TaskRepository, C: CategoryRepository> {
    pub association: AssociationService<T, C>,
    pub query: QueryService<T, C>,
}

impl<T: TaskRepository, C: CategoryRepository> TodoState<T, C> {
    /// Build both services over the same pair of stores
    pub fn new(tasks: T, categories: C) -> Self {
        let tasks = Arc::new(tasks);
        let categories = Arc::new(categories);

        Self {
            association: AssociationService::new(Arc::clone(&tasks), Arc::clone(&categories)),
            query: QueryService::new(tasks, categories),
        }
    }
}

/// Create the router with all task and category endpoints
pub fn router<T, C>(tasks: T, categories: C) -> Router
where
    T: TaskRepository + 'static,
    C: CategoryRepository + 'static,
{
    let state = Arc::new(TodoState::new(tasks, categories));

    Router::new()
        .route("/tasks", post(create_task))
        .route("/tasks/count", get(count_tasks))
        .route(
            "/tasks/{id}",
            get(get_task).put(update_task).delete(delete_task),
        )
        .route("/tasks/{id}/mark_done", put(mark_task_done))
        .route("/categories", post(create_category))
        .route("/categories/count", get(count_categories))
        .route(
            "/categories/{name}",
            get(get_category)
                .put(rename_category)
                .delete(delete_category),
        )
        .route("/categories/{name}/tasks/count", get(count_category_tasks))
        .with_state(state)
}

/// Create a task, optionally adding it to a category
#[utoipa::path(
    post,
    path = "/tasks",
    tag = "Tasks",
    request_body = CreateTask,
    responses(
        (status = 201, description = "Task created successfully", body = Task),
        (status = 400, response = BadRequestResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn create_task<T: TaskRepository, C: CategoryRepository>(
    State(state): State<Arc<TodoState<T, C>>>,
    JsonBody(input): JsonBody<CreateTask>,
) -> Result<impl IntoResponse, AppError> {
    let task = state
        .association
        .create_task(input)
        .await
        .map_err(TodoError::into_task_input_error)?;
    Ok((StatusCode::CREATED, Json(task)))
}

/// Update a task's name and/or category
#[utoipa::path(
    put,
    path = "/tasks/{id}",
    tag = "Tasks",
    params(
        ("id" = Uuid, Path, description = "Task ID")
    ),
    request_body = UpdateTask,
    responses(
        (status = 200, description = "Task updated successfully", body = Task),
        (status = 400, response = BadRequestResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn update_task<T: TaskRepository, C: CategoryRepository>(
    State(state): State<Arc<TodoState<T, C>>>,
    UuidPath(id): UuidPath,
    JsonBody(input): JsonBody<UpdateTask>,
) -> Result<Json<Task>, AppError> {
    let task = state
        .association
        .update_task(id, input)
        .await
        .map_err(TodoError::into_task_input_error)?;
    Ok(Json(task))
}

/// Delete a task and remove it from its category
#[utoipa::path(
    delete,
    path = "/tasks/{id}",
    tag = "Tasks",
    params(
        ("id" = Uuid, Path, description = "Task ID")
    ),
    responses(
        (status = 200, description = "Deleted task", body = Task),
        (status = 400, response = BadRequestUuidResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn delete_task<T: TaskRepository, C: CategoryRepository>(
    State(state): State<Arc<TodoState<T, C>>>,
    UuidPath(id): UuidPath,
) -> TodoResult<Json<Task>> {
    let task = state.association.delete_task(id).await?;
    Ok(Json(task))
}

/// Get a task by ID
#[utoipa::path(
    get,
    path = "/tasks/{id}",
    tag = "Tasks",
    params(
        ("id" = Uuid, Path, description = "Task ID")
    ),
    responses(
        (status = 200, description = "Task found", body = Task),
        (status = 400, response = BadRequestUuidResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_task<T: TaskRepository, C: CategoryRepository>(
    State(state): State<Arc<TodoState<T, C>>>,
    UuidPath(id): UuidPath,
) -> TodoResult<Json<Task>> {
    let task = state.query.get_task(id).await?;
    Ok(Json(task))
}

/// Mark a task as done
#[utoipa::path(
    put,
    path = "/tasks/{id}/mark_done",
    tag = "Tasks",
    params(
        ("id" = Uuid, Path, description = "Task ID")
    ),
    responses(
        (status = 200, description = "Task marked as done", body = Task),
        (status = 400, response = BadRequestUuidResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn mark_task_done<T: TaskRepository, C: CategoryRepository>(
    State(state): State<Arc<TodoState<T, C>>>,
    UuidPath(id): UuidPath,
) -> TodoResult<Json<Task>> {
    let task = state.association.mark_task_done(id).await?;
    Ok(Json(task))
}

/// Count all tasks
#[utoipa::path(
    get,
    path = "/tasks/count",
    tag = "Tasks",
    responses(
        (status = 200, description = "Task count", body = CountResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn count_tasks<T: TaskRepository, C: CategoryRepository>(
    State(state): State<Arc<TodoState<T, C>>>,
) -> TodoResult<Json<CountResponse>> {
    let count = state.query.count_tasks().await?;
    Ok(Json(CountResponse { count }))
}

/// Create an empty category
#[utoipa::path(
    post,
    path = "/categories",
    tag = "Categories",
    request_body = CreateCategory,
    responses(
        (status = 201, description = "Category created successfully", body = Category),
        (status = 400, response = BadRequestResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn create_category<T: TaskRepository, C: CategoryRepository>(
    State(state): State<Arc<TodoState<T, C>>>,
    JsonBody(input): JsonBody<CreateCategory>,
) -> TodoResult<impl IntoResponse> {
    let category = state.association.create_category(&input.name).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

/// Rename a category
#[utoipa::path(
    put,
    path = "/categories/{name}",
    tag = "Categories",
    params(
        ("name" = String, Path, description = "Category name")
    ),
    request_body = RenameCategory,
    responses(
        (status = 200, description = "Category renamed successfully", body = Category),
        (status = 400, response = BadRequestResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn rename_category<T: TaskRepository, C: CategoryRepository>(
    State(state): State<Arc<TodoState<T, C>>>,
    Path(name): Path<String>,
    JsonBody(input): JsonBody<RenameCategory>,
) -> TodoResult<Json<Category>> {
    let category = state
        .association
        .rename_category(&name, &input.new_name)
        .await?;
    Ok(Json(category))
}

/// Delete a category. Member tasks are kept.
#[utoipa::path(
    delete,
    path = "/categories/{name}",
    tag = "Categories",
    params(
        ("name" = String, Path, description = "Category name")
    ),
    responses(
        (status = 200, description = "Deleted category", body = Category),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn delete_category<T: TaskRepository, C: CategoryRepository>(
    State(state): State<Arc<TodoState<T, C>>>,
    Path(name): Path<String>,
) -> TodoResult<Json<Category>> {
    let category = state.association.delete_category(&name).await?;
    Ok(Json(category))
}

/// Get a category with its tasks resolved
#[utoipa::path(
    get,
    path = "/categories/{name}",
    tag = "Categories",
    params(
        ("name" = String, Path, description = "Category name")
    ),
    responses(
        (status = 200, description = "Category found", body = PopulatedCategory),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_category<T: TaskRepository, C: CategoryRepository>(
    State(state): State<Arc<TodoState<T, C>>>,
    Path(name): Path<String>,
) -> TodoResult<Json<PopulatedCategory>> {
    let category = state.query.get_category(&name).await?;
    Ok(Json(category))
}

/// Count all categories
#[utoipa::path(
    get,
    path = "/categories/count",
    tag = "Categories",
    responses(
        (status = 200, description = "Category count", body = CountResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn count_categories<T: TaskRepository, C: CategoryRepository>(
    State(state): State<Arc<TodoState<T, C>>>,
) -> TodoResult<Json<CountResponse>> {
    let count = state.query.count_categories().await?;
    Ok(Json(CountResponse { count }))
}

/// Count the entries in a category's task list
#[utoipa::path(
    get,
    path = "/categories/{name}/tasks/count",
    tag = "Categories",
    params(
        ("name" = String, Path, description = "Category name")
    ),
    responses(
        (status = 200, description = "Number of task references", body = CountResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn count_category_tasks<T: TaskRepository, C: CategoryRepository>(
    State(state): State<Arc<TodoState<T, C>>>,
    Path(name): Path<String>,
) -> TodoResult<Json<CountResponse>> {
    let count = state.query.count_category_tasks(&name).await?;
    Ok(Json(CountResponse { count }))
}
