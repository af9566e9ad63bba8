//! Todos Domain
//!
//! Tasks and categories backed by two MongoDB collections. A task names its
//! category; a category lists its tasks' ids. The two sides are kept in step
//! by [`AssociationService`], which is the only code that writes either side
//! of that link.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────┐
//! │           Handlers           │  ← HTTP endpoints
//! └──────┬────────────────┬──────┘
//!        │                │
//! ┌──────▼──────┐  ┌──────▼──────┐
//! │ Association │  │    Query    │  ← writes / reads
//! │   Service   │  │   Service   │
//! └──────┬──────┘  └──────┬──────┘
//!        │                │
//! ┌──────▼────────────────▼──────┐
//! │  TaskRepository  │ Category- │  ← store traits (MongoDB, in-memory)
//! │                  │ Repository│
//! └──────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use domain_todos::{MongoCategoryRepository, MongoTaskRepository, handlers};
//! use mongodb::Client;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = Client::with_uri_str("mongodb://localhost:27017").await?;
//! let db = client.database("todoapp");
//!
//! let router = handlers::router(
//!     MongoTaskRepository::new(&db),
//!     MongoCategoryRepository::new(&db),
//! );
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod handlers;
pub mod memory;
pub mod models;
pub mod mongodb;
pub mod repository;
pub mod service;

// Re-export commonly used types
pub use error::{TodoError, TodoResult};
pub use handlers::ApiDoc;
pub use memory::{InMemoryCategoryRepository, InMemoryTaskRepository};
pub use models::{
    Category, CountResponse, CreateCategory, CreateTask, PopulatedCategory, RenameCategory, Task,
    UpdateTask,
};
pub use crate::mongodb::{MongoCategoryRepository, MongoTaskRepository};
pub use repository::{CategoryRepository, TaskRepository};
pub use service::{AssociationService, QueryService};
