/// Server setup and initialization
///
/// Wires the project store into the HTTP routes. The store is built once here and
/// handed to every request through `AppState`; it is closed after the server stops.

use crate::{
    api::projects::{create_project_routes, AppState},
    config::Config,
    project::ProjectStore,
};
use anyhow::Result;
use axum::{routing::get, Router};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

/// Build the application router around an already connected store
pub fn create_app(store: ProjectStore) -> Router {
    let app_state = AppState { store };

    Router::new()
        // Health check endpoint
        .route("/healthz", get(health_check))
        // Project and bug report API routes
        .merge(create_project_routes().with_state(app_state))
}

/// Start the HTTP server with the given configuration
///
/// Connects the store, binds the configured address and serves until Ctrl-C.
pub async fn start_server(config: Config) -> Result<()> {
    // Initialize tracing subscriber for logging, RUST_LOG overrides the default filter
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("bugdeck=info")),
        )
        .with_target(false)
        .with_thread_ids(true)
        .with_level(true)
        .init();

    tracing::info!("Starting bugdeck server...");

    tracing::info!("🏗️ Connecting project store");
    let store = ProjectStore::connect(&config.database)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to open project store: {}", e))?;

    let app = create_app(store.clone());

    // Bind to the configured address
    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&bind_addr).await?;

    tracing::info!("Server listening on http://{}", bind_addr);

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    store.close().await;
    tracing::info!("Server stopped");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("❌ Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

/// Health check endpoint handler
async fn health_check() -> &'static str {
    "ok"
}
