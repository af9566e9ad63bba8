use super::shutdown::{ShutdownCoordinator, coordinated_shutdown};
use crate::errors::handlers::{method_not_allowed, not_found};
use crate::http::{cors::create_cors_layer, cors::parse_allowed_origins, security::security_headers};
use axum::{Json, Router, middleware, routing::get};
use core_config::server::ServerConfig;
use std::io;
use std::time::Duration;
use tower_http::compression::CompressionLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::{Level, info};
use utoipa::OpenApi;

/// Environment variable holding the comma-separated CORS allow list
pub const CORS_ALLOWED_ORIGIN: &str = "CORS_ALLOWED_ORIGIN";

/// Creates a configured Axum router with common middleware and documentation.
///
/// This function sets up:
/// - OpenAPI documentation (`/api-docs/openapi.json`, `/scalar`, `/redoc`)
/// - API routes merged at the root
/// - Common middleware (tracing, security headers, compression)
/// - CORS when `CORS_ALLOWED_ORIGIN` is set
/// - JSON 404 and 405 fallbacks
///
/// Health endpoints (`/health`, `/ready`) are merged by the app itself
/// using `health_router()` and its own ready handler.
///
/// # Errors
/// Returns `InvalidInput` if `CORS_ALLOWED_ORIGIN` is set but empty or
/// contains an invalid origin.
///
/// # Example
/// ```ignore
/// let api_routes = domain_todos::handlers::router(tasks, categories);
/// let router = create_router::<ApiDoc>(api_routes).await?;
/// ```
pub async fn create_router<T>(apis: Router) -> io::Result<Router>
where
    T: OpenApi + 'static,
{
    use utoipa_redoc::{Redoc, Servable as RedocServable};
    use utoipa_scalar::{Scalar, Servable as ScalarServable};

    let router = Router::new()
        .route(
            "/api-docs/openapi.json",
            get(|| async { Json(T::openapi()) }),
        )
        .merge(Redoc::with_url("/redoc", T::openapi()))
        .merge(Scalar::with_url("/scalar", T::openapi()))
        .merge(apis)
        .fallback(not_found)
        .method_not_allowed_fallback(method_not_allowed)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(middleware::from_fn(security_headers));

    let router = match std::env::var(CORS_ALLOWED_ORIGIN) {
        Ok(raw) => {
            let origins = parse_allowed_origins(&raw)?;
            info!("CORS configured with allowed origins: {}", raw);
            router.layer(create_cors_layer(origins))
        }
        Err(_) => {
            info!("{} not set, cross-origin requests are not allowed", CORS_ALLOWED_ORIGIN);
            router
        }
    };

    // gzip, br, deflate and zstd based on Accept-Encoding
    Ok(router.layer(CompressionLayer::new()))
}

/// Production server with coordinated shutdown and cleanup.
///
/// Waits for SIGINT/SIGTERM, stops accepting connections, drains in-flight
/// requests and then runs `cleanup` bounded by `shutdown_timeout`.
///
/// # Example
/// ```ignore
/// let cleanup = async move {
///     info!("Closing MongoDB connections");
///     drop(db);
/// };
///
/// create_production_app(router, &config, Duration::from_secs(30), cleanup).await?;
/// ```
pub async fn create_production_app<F>(
    router: Router,
    server_config: &ServerConfig,
    shutdown_timeout: Duration,
    cleanup: F,
) -> io::Result<()>
where
    F: std::future::Future<Output = ()> + Send + 'static,
{
    let (coordinator, server_rx) = ShutdownCoordinator::new();
    let mut cleanup_rx = coordinator.subscribe();

    let listener = tokio::net::TcpListener::bind(server_config.address()).await?;
    info!("Server running on port {}", listener.local_addr()?.port());

    let signal_handle = coordinator.clone();
    tokio::spawn(async move { signal_handle.wait_for_signal().await });

    let cleanup_handle = tokio::spawn(async move {
        let _ = cleanup_rx.recv().await;

        info!("Starting cleanup tasks (timeout: {:?})", shutdown_timeout);
        match tokio::time::timeout(shutdown_timeout, cleanup).await {
            Ok(_) => info!("Cleanup completed successfully"),
            Err(_) => {
                tracing::warn!(
                    "Cleanup exceeded timeout of {:?}, forcing shutdown",
                    shutdown_timeout
                );
            }
        }
    });

    let serve_result = axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(coordinated_shutdown(server_rx))
        .await
        .inspect_err(|e| {
            tracing::error!("Server encountered an error: {:?}", e);
        });

    // A serve error ends the process without a signal; release cleanup too.
    coordinator.shutdown();
    cleanup_handle.await.ok();

    serve_result
}
