use mongodb::{Client, bson::doc, options::ClientOptions};
use std::time::Duration;
use tracing::info;

use super::MongoConfig;
use crate::common::{RetryConfig, retry_with_backoff};

/// Error type for MongoDB connection setup
#[derive(Debug, thiserror::Error)]
pub enum MongoError {
    #[error("MongoDB error: {0}")]
    Mongo(#[from] mongodb::error::Error),

    #[error("Connection failed: {0}")]
    ConnectionFailed(String),
}

/// Connect to MongoDB with the default settings for `url`
///
/// # Example
/// ```ignore
/// let client = database::mongodb::connect("mongodb://localhost:27017").await?;
/// let db = client.database("todoapp");
/// ```
pub async fn connect(url: &str) -> Result<Client, MongoError> {
    connect_from_config(&MongoConfig::new(url)).await
}

/// Connect using a MongoConfig and verify the server answers a `ping`
///
/// # Example
/// ```ignore
/// use database::mongodb::{MongoConfig, connect_from_config};
/// use core_config::FromEnv;
///
/// let config = MongoConfig::from_env()?;
/// let client = connect_from_config(&config).await?;
/// ```
pub async fn connect_from_config(config: &MongoConfig) -> Result<Client, MongoError> {
    info!(database = %config.database, "Attempting to connect to MongoDB");

    let mut options = ClientOptions::parse(&config.url).await?;

    options.max_pool_size = Some(config.max_pool_size);
    options.min_pool_size = Some(config.min_pool_size);
    options.connect_timeout = Some(Duration::from_secs(config.connect_timeout_secs));
    options.server_selection_timeout =
        Some(Duration::from_secs(config.server_selection_timeout_secs));

    if let Some(ref app_name) = config.app_name {
        options.app_name = Some(app_name.clone());
    }

    let client = Client::with_options(options)?;

    client
        .database("admin")
        .run_command(doc! { "ping": 1 })
        .await
        .map_err(|e| MongoError::ConnectionFailed(e.to_string()))?;

    info!("Successfully connected to MongoDB");
    Ok(client)
}

/// Connect from config with exponential backoff between attempts
///
/// # Example
/// ```ignore
/// let retry_config = RetryConfig::new().with_max_retries(5);
/// let client = connect_from_config_with_retry(&config, retry_config).await?;
/// ```
pub async fn connect_from_config_with_retry(
    config: &MongoConfig,
    retry_config: RetryConfig,
) -> Result<Client, MongoError> {
    retry_with_backoff(|| connect_from_config(config), retry_config).await
}
