use axum_helpers::server::{create_production_app, health_router};
use core_config::tracing::{init_tracing, install_color_eyre};
use database::common::RetryConfig;
use std::time::Duration;
use tracing::info;

mod api;
mod config;
mod openapi;
mod state;

use config::Config;
use state::AppState;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    install_color_eyre();

    let config = Config::from_env()?;

    init_tracing(&config.environment);

    info!(
        database = %config.mongodb.database(),
        "Connecting to MongoDB"
    );

    let retry = RetryConfig::new().with_max_retries(5).with_initial_delay(500);
    let mongo_client =
        database::mongodb::connect_from_config_with_retry(&config.mongodb, retry).await?;

    let db = mongo_client.database(config.mongodb.database());

    api::todos::init_indexes(&db).await?;

    let state = AppState {
        config,
        mongo_client,
        db,
    };

    let api_routes = api::routes(&state);

    let router = axum_helpers::create_router::<openapi::ApiDoc>(api_routes).await?;

    let app = router.merge(health_router(state.config.app));

    info!("Starting Todo API with graceful shutdown (30s timeout)");

    let mongo_client = state.mongo_client.clone();
    create_production_app(
        app,
        &state.config.server,
        Duration::from_secs(30),
        async move {
            info!("Shutting down: closing MongoDB connections");
            mongo_client.shutdown().await;
            info!("MongoDB connection closed successfully");
        },
    )
    .await
    .map_err(|e| eyre::eyre!("Server error: {}", e))?;

    info!("Todo API shutdown complete");
    Ok(())
}
