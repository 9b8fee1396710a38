/// bugdeck: project and bug report tracker
///
/// Main entry point. Loads configuration from the environment and starts the
/// HTTP server.

use bugdeck::{config::Config, server::start_server};

/// Application entry point
///
/// The server provides:
/// - Project API at /api/projects/*
/// - Bug report API at /api/projects/{id}/bugs/*
/// - Health check at /healthz
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration (defaults to 0.0.0.0:3000 and data/projects.db)
    let config = Config::default();

    start_server(config).await?;

    Ok(())
}
