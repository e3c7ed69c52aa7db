//! Standalone REST API server binary.
//!
//! ## Purpose
//! Runs the REST API server on its own, loading the patient list once at startup.
//!
//! ## Intended use
//! Useful for development and debugging when you only want the REST server (with
//! OpenAPI/Swagger UI). The workspace's main `triage-run` binary also keeps the
//! patient list fresh on a timer.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use triage_api_rest::{router, AppState};
use triage_core::TriageConfig;

/// Main entry point for the triage REST API server
///
/// # Environment Variables
/// - `TRIAGE_BACKEND_URL`: Backend base URL (required)
/// - `TRIAGE_REST_ADDR`: Server address (default: "0.0.0.0:3000")
/// - `TRIAGE_ORGANISATION_NAME`: Signature on document request emails
/// - `TRIAGE_HTTP_TIMEOUT_SECS`: Backend request timeout (default: 10)
///
/// # Errors
/// Returns an error if:
/// - the logging/tracing configuration cannot be initialised,
/// - the configuration is invalid,
/// - the server address cannot be bound, or
/// - the HTTP server fails while running.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("triage_api_rest=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = TriageConfig::from_lookup(|key| std::env::var(key).ok())?;
    let state = AppState::from_config(&config)?;

    // A failed first load is recorded on the dashboard and shown by /dashboard.
    if let Err(err) = state.dashboard.load_patients().await {
        tracing::warn!(error = %err, "initial patient load failed");
    }

    tracing::info!("-- Starting triage REST API on {}", config.rest_addr());

    let listener = tokio::net::TcpListener::bind(config.rest_addr()).await?;
    axum::serve(listener, router(state)).await?;

    Ok(())
}
