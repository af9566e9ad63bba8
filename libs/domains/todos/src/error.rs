use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use mongodb::error::{ErrorKind, WriteFailure};
use thiserror::Error;
use uuid::Uuid;

const DUPLICATE_KEY: i32 = 11000;

#[derive(Debug, Error)]
pub enum TodoError {
    #[error("Task not found: {0}")]
    TaskNotFound(Uuid),

    #[error("Category not found: {0}")]
    CategoryNotFound(String),

    #[error("Category '{0}' already exists")]
    CategoryAlreadyExists(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type TodoResult<T> = Result<T, TodoError>;

impl TodoError {
    /// Error conversion for the task write endpoints, where an unknown
    /// category is a problem with the request body rather than a missing
    /// resource.
    pub fn into_task_input_error(self) -> AppError {
        match self {
            TodoError::CategoryNotFound(_) => {
                AppError::BadRequest("Category does not exist.".to_string())
            }
            other => other.into(),
        }
    }
}

/// Convert TodoError to AppError for standardized error responses
impl From<TodoError> for AppError {
    fn from(err: TodoError) -> Self {
        match err {
            TodoError::TaskNotFound(_) => AppError::NotFound("Task not found.".to_string()),
            TodoError::CategoryNotFound(_) => {
                AppError::NotFound("Category not found.".to_string())
            }
            TodoError::CategoryAlreadyExists(_) => {
                AppError::BadRequest("Category already exists.".to_string())
            }
            TodoError::Database(msg) => AppError::InternalServerError(msg),
            TodoError::Internal(msg) => AppError::InternalServerError(msg),
        }
    }
}

impl IntoResponse for TodoError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}

impl From<mongodb::error::Error> for TodoError {
    fn from(err: mongodb::error::Error) -> Self {
        TodoError::Database(err.to_string())
    }
}

/// Whether a MongoDB error was raised by a unique index.
pub(crate) fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    match err.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(write_error)) => {
            write_error.code == DUPLICATE_KEY
        }
        ErrorKind::Command(command_error) => command_error.code == DUPLICATE_KEY,
        _ => false,
    }
}
