use super::shutdown::{ShutdownCoordinator, coordinated_shutdown};
use crate::errors::handlers::not_found;
use axum::Router;
use core_config::server::ServerConfig;
use std::io;
use std::time::Duration;
use tokio::task::JoinHandle;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::{Level, info};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Creates a configured Axum router with request tracing and documentation.
///
/// This function sets up:
/// - Swagger UI at `/swagger-ui`, serving the spec at `/api-docs/openapi.json`
/// - API routes nested under `/api`
/// - HTTP request tracing
/// - a JSON 404 fallback
///
/// Liveness and readiness endpoints are added by the app.
///
/// # Example
/// ```ignore
/// use axum_helpers::create_router;
///
/// let api_routes = Router::new().nest("/users", domain_users::router(service, telemetry));
/// let router = create_router::<ApiDoc>(api_routes);
/// ```
pub fn create_router<T>(apis: Router) -> Router
where
    T: OpenApi + 'static,
{
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", T::openapi()))
        .nest("/api", apis)
        .fallback(not_found)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
}

/// Serves `router` until SIGTERM/SIGINT, then runs `cleanup`.
///
/// In-flight requests are drained by axum's graceful shutdown. `cleanup`
/// is bounded by `shutdown_timeout`; when it overruns, the process
/// continues shutting down anyway.
///
/// # Example
/// ```ignore
/// let cleanup = async move {
///     client.shutdown().await;
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
    let (coordinator, _rx) = ShutdownCoordinator::new();

    let listener = tokio::net::TcpListener::bind(server_config.address()).await?;
    info!("Server starting on {}", listener.local_addr()?);

    let cleanup_handle = spawn_cleanup(coordinator.clone(), shutdown_timeout, cleanup);

    let serve_result = axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(coordinated_shutdown(coordinator.clone()))
        .await;

    finish_serving(serve_result, &coordinator, cleanup_handle).await
}

/// Runs `cleanup` once the coordinator reports shutdown, bounded by
/// `shutdown_timeout`.
fn spawn_cleanup<F>(
    coordinator: ShutdownCoordinator,
    shutdown_timeout: Duration,
    cleanup: F,
) -> JoinHandle<()>
where
    F: std::future::Future<Output = ()> + Send + 'static,
{
    tokio::spawn(async move {
        coordinator.wait_for_signal().await;

        info!("Starting cleanup tasks (timeout: {:?})", shutdown_timeout);
        match tokio::time::timeout(shutdown_timeout, cleanup).await {
            Ok(()) => info!("Cleanup completed successfully"),
            Err(_) => {
                tracing::warn!(
                    "Cleanup exceeded timeout of {:?}, forcing shutdown",
                    shutdown_timeout
                );
            }
        }
    })
}

async fn finish_serving(
    serve_result: io::Result<()>,
    coordinator: &ShutdownCoordinator,
    cleanup_handle: JoinHandle<()>,
) -> io::Result<()> {
    if let Err(e) = &serve_result {
        tracing::error!("Server encountered an error: {:?}", e);
        // The cleanup task only wakes up on shutdown
        coordinator.shutdown();
    }

    cleanup_handle.await.ok();

    serve_result
}
