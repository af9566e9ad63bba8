//! API routes module

pub mod health;
pub mod todos;

use axum::Router;

use crate::state::AppState;

/// All application routes, merged at the root by `axum_helpers::create_router`
pub fn routes(state: &AppState) -> Router {
    Router::new()
        .merge(todos::router(state))
        .merge(health::router(state.clone()))
}
