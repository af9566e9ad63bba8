//! Tasks and categories routes backed by MongoDB

use axum::Router;
use domain_todos::{MongoCategoryRepository, MongoTaskRepository, handlers};
use tracing::info;

use crate::state::AppState;

pub fn router(state: &AppState) -> Router {
    handlers::router(
        MongoTaskRepository::new(&state.db),
        MongoCategoryRepository::new(&state.db),
    )
}

/// Create the collection indexes, including the unique category name
pub async fn init_indexes(db: &mongodb::Database) -> eyre::Result<()> {
    MongoTaskRepository::new(db)
        .init_indexes()
        .await
        .map_err(|e| eyre::eyre!("Failed to create task indexes: {}", e))?;
    MongoCategoryRepository::new(db)
        .init_indexes()
        .await
        .map_err(|e| eyre::eyre!("Failed to create category indexes: {}", e))?;
    info!("Task and category indexes created");
    Ok(())
}
