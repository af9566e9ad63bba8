//! OpenAPI documentation configuration

use utoipa::{Modify, OpenApi};

/// Combined OpenAPI documentation served at `/api-docs/openapi.json`
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Todo API",
        version = "0.1.0",
        description = "MongoDB-backed REST API for tasks and categories",
        license(name = "MIT")
    ),
    servers(
        (url = "http://localhost:3000", description = "Local development server")
    ),
    modifiers(&TodoPaths)
)]
pub struct ApiDoc;

/// Domain routes are mounted at the root, so their paths are merged as-is.
struct TodoPaths;

impl Modify for TodoPaths {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.merge(domain_todos::ApiDoc::openapi());
    }
}
