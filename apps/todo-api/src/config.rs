use core_config::{AppInfo, FromEnv, app_info, server::ServerConfig};
use database::mongodb::MongoConfig;

pub use core_config::Environment;

/// Application configuration, composed from the shared config components
#[derive(Clone, Debug)]
pub struct Config {
    pub app: AppInfo,
    pub mongodb: MongoConfig,
    pub server: ServerConfig,
    pub environment: Environment,
}

impl Config {
    pub fn from_env() -> eyre::Result<Self> {
        let environment = Environment::from_env();
        let mut mongodb = MongoConfig::from_env()?;
        let server = ServerConfig::from_env()?;
        let app = app_info!();

        if mongodb.app_name.is_none() {
            mongodb = mongodb.with_app_name(app.name);
        }

        Ok(Self {
            app,
            mongodb,
            server,
            environment,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_without_environment() {
        temp_env::with_vars_unset(
            [
                "APP_ENV",
                "PORT",
                "HOST",
                "MONGODB_URL",
                "MONGO_URL",
                "MONGODB_DATABASE",
                "MONGO_DATABASE",
                "MONGODB_APP_NAME",
            ],
            || {
                let config = Config::from_env().unwrap();
                assert_eq!(config.server.port, 3000);
                assert_eq!(config.mongodb.url(), "mongodb://localhost:27017");
                assert_eq!(config.mongodb.database(), "todoapp");
                assert_eq!(config.mongodb.app_name.as_deref(), Some("todo-api"));
                assert_eq!(config.environment, Environment::Development);
                assert_eq!(config.app.name, "todo-api");
            },
        );
    }

    #[test]
    fn test_invalid_port_is_an_error() {
        temp_env::with_var("PORT", Some("http"), || {
            assert!(Config::from_env().is_err());
        });
    }
}
