//! Standalone REST API server binary.
//!
//! ## Purpose
//! Runs the REST API server on its own, without the workspace runner's `.env` loading and
//! signal handling. Useful while iterating on handlers.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Main entry point for the MedRef REST API server
///
/// See [`api_rest::ServerConfig::from_env`] for the environment variables read at startup.
///
/// # Errors
/// Returns an error if:
/// - the logging/tracing configuration cannot be initialised,
/// - configuration is invalid or reference data cannot be loaded,
/// - the server address cannot be bound, or
/// - the HTTP server fails while running.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("api_rest=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cfg = api_rest::ServerConfig::from_env()?;
    tracing::info!("-- Starting MedRef REST API on {}", cfg.addr);

    api_rest::serve(cfg).await
}
