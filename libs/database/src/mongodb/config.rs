#[cfg(feature = "config")]
use core_config::{ConfigError, FromEnv, env_first_or_default, env_parse_or};

/// Default connection string for a local MongoDB
pub const DEFAULT_URL: &str = "mongodb://localhost:27017";

/// Default database name
pub const DEFAULT_DATABASE: &str = "todoapp";

/// MongoDB connection settings
///
/// Constructed manually or loaded from environment variables (with the
/// `config` feature).
///
/// # Example
///
/// ```ignore
/// use database::mongodb::MongoConfig;
///
/// let config = MongoConfig::with_database("mongodb://localhost:27017", "todoapp")
///     .with_app_name("todo-api");
///
/// // From environment variables (requires `config` feature)
/// let config = MongoConfig::from_env()?;
/// ```
#[derive(Clone, Debug)]
pub struct MongoConfig {
    /// Format: mongodb://[username:password@]host[:port][/database][?options]
    pub url: String,

    /// Database holding the collections
    pub database: String,

    /// Application name reported in server logs
    pub app_name: Option<String>,

    pub max_pool_size: u32,

    pub min_pool_size: u32,

    pub connect_timeout_secs: u64,

    pub server_selection_timeout_secs: u64,
}

impl MongoConfig {
    /// Config for `url` using the default database
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    /// Config for `url` and a specific database
    pub fn with_database(url: impl Into<String>, database: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            database: database.into(),
            ..Self::default()
        }
    }

    /// Set the application name for server logs
    pub fn with_app_name(mut self, app_name: impl Into<String>) -> Self {
        self.app_name = Some(app_name.into());
        self
    }

    /// Override the connection pool bounds
    pub fn with_pool_size(mut self, max_pool_size: u32, min_pool_size: u32) -> Self {
        self.max_pool_size = max_pool_size;
        self.min_pool_size = min_pool_size;
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn database(&self) -> &str {
        &self.database
    }
}

impl Default for MongoConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_URL.to_string(),
            database: DEFAULT_DATABASE.to_string(),
            app_name: None,
            max_pool_size: 100,
            min_pool_size: 5,
            connect_timeout_secs: 10,
            server_selection_timeout_secs: 30,
        }
    }
}

/// Load MongoConfig from environment variables
///
/// - `MONGODB_URL` or `MONGO_URL` (default: `mongodb://localhost:27017`)
/// - `MONGODB_DATABASE` or `MONGO_DATABASE` (default: `todoapp`)
/// - `MONGODB_APP_NAME` (optional)
/// - `MONGODB_MAX_POOL_SIZE` (default: 100)
/// - `MONGODB_MIN_POOL_SIZE` (default: 5)
/// - `MONGODB_CONNECT_TIMEOUT_SECS` (default: 10)
/// - `MONGODB_SERVER_SELECTION_TIMEOUT_SECS` (default: 30)
#[cfg(feature = "config")]
impl FromEnv for MongoConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        Ok(Self {
            url: env_first_or_default(&["MONGODB_URL", "MONGO_URL"], DEFAULT_URL),
            database: env_first_or_default(
                &["MONGODB_DATABASE", "MONGO_DATABASE"],
                DEFAULT_DATABASE,
            ),
            app_name: std::env::var("MONGODB_APP_NAME").ok(),
            max_pool_size: env_parse_or("MONGODB_MAX_POOL_SIZE", defaults.max_pool_size)?,
            min_pool_size: env_parse_or("MONGODB_MIN_POOL_SIZE", defaults.min_pool_size)?,
            connect_timeout_secs: env_parse_or(
                "MONGODB_CONNECT_TIMEOUT_SECS",
                defaults.connect_timeout_secs,
            )?,
            server_selection_timeout_secs: env_parse_or(
                "MONGODB_SERVER_SELECTION_TIMEOUT_SECS",
                defaults.server_selection_timeout_secs,
            )?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mongo_config_new_uses_default_database() {
        let config = MongoConfig::new("mongodb://db:27017");
        assert_eq!(config.url(), "mongodb://db:27017");
        assert_eq!(config.database(), "todoapp");
        assert_eq!(config.max_pool_size, 100);
        assert_eq!(config.min_pool_size, 5);
    }

    #[test]
    fn test_mongo_config_builders() {
        let config = MongoConfig::with_database("mongodb://db:27017", "tasks_test")
            .with_app_name("todo-api")
            .with_pool_size(20, 2);
        assert_eq!(config.database(), "tasks_test");
        assert_eq!(config.app_name.as_deref(), Some("todo-api"));
        assert_eq!(config.max_pool_size, 20);
        assert_eq!(config.min_pool_size, 2);
    }

    #[cfg(feature = "config")]
    const MONGO_VARS: [&str; 5] = [
        "MONGODB_URL",
        "MONGO_URL",
        "MONGODB_DATABASE",
        "MONGO_DATABASE",
        "MONGODB_MAX_POOL_SIZE",
    ];

    #[cfg(feature = "config")]
    #[test]
    fn test_mongo_config_from_env_defaults() {
        temp_env::with_vars_unset(MONGO_VARS, || {
            let config = MongoConfig::from_env().unwrap();
            assert_eq!(config.url, DEFAULT_URL);
            assert_eq!(config.database, DEFAULT_DATABASE);
        });
    }

    #[cfg(feature = "config")]
    #[test]
    fn test_mongo_config_from_env_fallback_names() {
        temp_env::with_vars(
            [
                ("MONGODB_URL", None::<&str>),
                ("MONGO_URL", Some("mongodb://fallback:27017")),
                ("MONGODB_DATABASE", None::<&str>),
                ("MONGO_DATABASE", Some("fallbackdb")),
            ],
            || {
                let config = MongoConfig::from_env().unwrap();
                assert_eq!(config.url, "mongodb://fallback:27017");
                assert_eq!(config.database, "fallbackdb");
            },
        );
    }

    #[cfg(feature = "config")]
    #[test]
    fn test_mongo_config_from_env_invalid_pool_size() {
        temp_env::with_var("MONGODB_MAX_POOL_SIZE", Some("lots"), || {
            let err = MongoConfig::from_env().unwrap_err();
            assert!(err.to_string().contains("MONGODB_MAX_POOL_SIZE"));
        });
    }
}
