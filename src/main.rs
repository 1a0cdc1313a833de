use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use business_intel_api::config::Config;
use business_intel_api::handlers::AppState;
use business_intel_api::routes;

/// Main entry point for the application.
///
/// Initializes logging, loads configuration, wires the OpenAI, NewsAPI and
/// RDAP clients into the enrichment pipeline, and starts the Axum server.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "business_intel_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env()?;
    let port = config.port;

    // Build application state
    let app_state = Arc::new(AppState::from_config(config)?);
    tracing::info!("✓ Enrichment pipeline initialized");

    let app = routes::router(app_state);

    // Start server
    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
