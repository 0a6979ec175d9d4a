use axum_helpers::server::{create_production_app, create_router, health_router};
use core_config::tracing::{init_tracing, install_color_eyre};
use tracing::info;

mod api;
mod config;
mod openapi;
mod state;

use config::Config;
use state::AppState;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    // Install color-eyre first for colored error output
    install_color_eyre();

    let config = Config::from_env()?;

    init_tracing(&config.environment);

    info!("Connecting to MongoDB at {}", config.mongodb.redacted_url());

    // Retries only apply here; request-time store calls fail fast
    let mongo_client =
        database::mongodb::connect_from_config_with_retry(&config.mongodb, None).await?;

    let db = mongo_client.database(config.mongodb.database());

    info!(
        "Successfully connected to MongoDB database: {}",
        config.mongodb.database()
    );

    if config.telemetry.is_enabled() {
        info!(
            service_name = ?config.telemetry.service_name,
            collector = ?config.telemetry.collector_endpoint,
            "Span enrichment enabled"
        );
    }

    let state = AppState {
        config,
        mongo_client,
        db,
    };

    let api_routes = api::routes(&state);

    let app = create_router::<openapi::ApiDoc>(api_routes).merge(health_router(state.config.app));

    let shutdown_timeout = state.config.server.shutdown_timeout();
    info!(
        "Starting Users API with graceful shutdown ({:?} timeout)",
        shutdown_timeout
    );

    let server = state.config.server.clone();
    let mongo_client = state.mongo_client.clone();

    create_production_app(app, &server, shutdown_timeout, async move {
        info!("Shutting down: closing MongoDB connections");
        mongo_client.shutdown().await;
        info!("MongoDB connection closed successfully");
    })
    .await
    .map_err(|e| eyre::eyre!("Server error: {}", e))?;

    info!("Users API shutdown complete");
    Ok(())
}
