//! Database connectors and connection utilities.
//!
//! # Features
//!
//! - `mongodb` (default) - MongoDB support
//! - `config` - Configuration support with `core_config::FromEnv`
//! - `all` - All features
//!
//! # Example
//!
//! ```ignore
//! use database::mongodb::{self, MongoConfig};
//! use database::common::RetryConfig;
//! use core_config::FromEnv;
//!
//! let config = MongoConfig::from_env()?;
//! let client = mongodb::connect_from_config_with_retry(&config, RetryConfig::new()).await?;
//! let db = client.database(config.database());
//! ```

pub mod common;

#[cfg(feature = "mongodb")]
pub mod mongodb;

pub use common::{DatabaseError, DatabaseResult};
