//! MongoDB test infrastructure
//!
//! Provides a `TestMongo` helper that starts a throwaway MongoDB container.

use mongodb::{Client, Database};
use testcontainers::runners::AsyncRunner;
use testcontainers::{ContainerAsync, ImageExt};
use testcontainers_modules::mongo::Mongo;
use uuid::Uuid;

/// Test MongoDB wrapper that ensures proper cleanup
///
/// The container is stopped and removed when this struct is dropped.
/// Each instance hands out a database with a unique name, so tests that
/// share a container never see each other's documents.
///
/// # Example
///
/// ```no_run
/// use test_utils::TestMongo;
///
/// # async fn example() {
/// let mongo = TestMongo::new().await;
/// let db = mongo.database();
/// let tasks = db.collection::<mongodb::bson::Document>("tasks");
/// # }
/// ```
pub struct TestMongo {
    #[allow(dead_code)]
    container: ContainerAsync<Mongo>,
    client: Client,
    database_name: String,
    pub connection_string: String,
}

impl TestMongo {
    /// Start a MongoDB 8 container and connect to it
    pub async fn new() -> Self {
        let container = Mongo::default()
            .with_tag("8")
            .start()
            .await
            .expect("Failed to start MongoDB container");

        let host_port = container
            .get_host_port_ipv4(27017)
            .await
            .expect("Failed to get MongoDB port");

        let connection_string = format!("mongodb://127.0.0.1:{}", host_port);

        let client = Client::with_uri_str(&connection_string)
            .await
            .expect("Failed to create MongoDB client");

        let database_name = format!("test_{}", Uuid::new_v4().simple());

        tracing::info!(port = host_port, database = %database_name, "Test MongoDB ready (mongo:8)");

        Self {
            container,
            client,
            database_name,
            connection_string,
        }
    }

    /// Database reserved for this instance
    pub fn database(&self) -> Database {
        self.client.database(&self.database_name)
    }

    /// Client connected to the container
    pub fn client(&self) -> Client {
        self.client.clone()
    }

    pub fn database_name(&self) -> &str {
        &self.database_name
    }
}
