use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use triage_api_rest::{router, AppState};
use triage_core::{spawn_refresh, TriageConfig};

/// Main entry point for the triage dashboard service
///
/// Loads configuration, starts the periodic patient refresh (the first load
/// happens immediately) and serves the REST API until Ctrl-C.
///
/// # Environment Variables
/// - `TRIAGE_BACKEND_URL`: Backend base URL (required)
/// - `TRIAGE_REST_ADDR`: REST server address (default: "0.0.0.0:3000")
/// - `TRIAGE_REFRESH_INTERVAL_SECS`: Seconds between patient reloads (default: 3000)
/// - `TRIAGE_ORGANISATION_NAME`: Signature on document request emails
/// - `TRIAGE_HTTP_TIMEOUT_SECS`: Backend request timeout (default: 10)
///
/// # Returns
/// * `Ok(())` - If the server shuts down cleanly
/// * `Err(anyhow::Error)` - If configuration, startup or the server fails
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("triage=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = TriageConfig::from_lookup(|key| std::env::var(key).ok())?;
    let state = AppState::from_config(&config)?;

    tracing::info!("++ Triage backend at {}", config.backend_base_url());
    tracing::info!("++ Starting triage REST on {}", config.rest_addr());

    let refresh = spawn_refresh(state.dashboard.clone(), config.refresh_interval())?;

    let listener = tokio::net::TcpListener::bind(config.rest_addr()).await?;
    axum::serve(listener, router(state))
        .with_graceful_shutdown(async {
            if let Err(err) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %err, "failed to listen for shutdown signal");
            }
        })
        .await?;

    refresh.cancel().await;
    tracing::info!("triage service stopped");

    Ok(())
}
