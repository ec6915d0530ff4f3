use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Main entry point for the MedRef application
///
/// Loads `.env`, installs tracing, resolves configuration once and runs the REST server
/// (JSON endpoints plus the static page) until Ctrl-C.
///
/// # Environment Variables
/// - `MEDREF_REST_ADDR`: REST server address (default: "0.0.0.0:3000")
/// - `MEDREF_DATA_DIR`: directory containing `medications.json` and `providers.json`
/// - `MEDREF_WEB_ROOT`: directory containing `index.html` and page assets
/// - `MEDREF_HPI_ENGINE`: `template` (default) or `remote`
///
/// # Returns
/// * `Ok(())` - If the server shuts down cleanly
/// * `Err(anyhow::Error)` - If startup or the server fails
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("medref_run=info".parse()?)
                .add_directive("api_rest=info".parse()?)
                .add_directive("medref_core=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cfg = api_rest::ServerConfig::from_env()?;

    tracing::info!("++ Starting MedRef REST on {}", cfg.addr);
    tracing::info!("++ Data directory: {}", cfg.core.data_dir().display());
    tracing::info!("++ Web root: {}", cfg.web_root.display());

    api_rest::serve_with_shutdown(cfg, async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to listen for shutdown signal: {}", e);
            std::future::pending::<()>().await;
        }
        tracing::info!("shutdown signal received");
    })
    .await
}
