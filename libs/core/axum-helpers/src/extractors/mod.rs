//! Custom extractors for Axum handlers.

pub mod json_body;
pub mod uuid_path;

pub use json_body::JsonBody;
pub use uuid_path::UuidPath;
