//! # API REST
//!
//! REST API for the triage dashboard.
//!
//! Handles:
//! - HTTP endpoints with axum
//! - OpenAPI/Swagger documentation
//! - REST-specific concerns (JSON serialisation, CORS, status codes)
//!
//! Domain rules live in `triage-core`; the backend adapters in `triage-api-client`.

#![warn(rust_2018_idioms)]

pub mod dto;
pub mod error;
pub mod handlers;

use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use triage_api_client::{HttpChatAssistant, HttpPatientBackend};
use triage_core::ports::{
    BusinessHoursScheduler, ChatAssistant, DirectoryHieGateway, DocumentMailer, HieGateway,
    OutboxMailer, SchedulingProvider,
};
use triage_core::{TriageConfig, TriageDashboard, TriageResult};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub use error::ApiError;

/// Application state shared across REST API handlers
///
/// Holds the dashboard and every integration port behind `Arc<dyn ...>` so
/// tests can swap in fakes.
#[derive(Clone)]
pub struct AppState {
    pub dashboard: Arc<TriageDashboard>,
    pub chat: Arc<dyn ChatAssistant>,
    pub mailer: Arc<dyn DocumentMailer>,
    pub hie: Arc<dyn HieGateway>,
    pub scheduler: Arc<dyn SchedulingProvider>,
    /// Signature used on document request emails.
    pub organisation: String,
}

impl AppState {
    /// Build the production state from configuration.
    ///
    /// The patient backend and chat assistant talk to the configured backend
    /// over HTTP. Mail, HIE and scheduling use the in-process implementations.
    ///
    /// # Errors
    ///
    /// Returns `TriageError::InvalidInput` if the HTTP clients cannot be built.
    pub fn from_config(config: &TriageConfig) -> TriageResult<Self> {
        let backend = Arc::new(HttpPatientBackend::from_config(config)?);

        Ok(Self {
            dashboard: Arc::new(TriageDashboard::new(backend)),
            chat: Arc::new(HttpChatAssistant::from_config(config)?),
            mailer: Arc::new(OutboxMailer::new()),
            hie: Arc::new(DirectoryHieGateway::default()),
            scheduler: Arc::new(BusinessHoursScheduler::new()),
            organisation: config.organisation_name().to_string(),
        })
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::health,
        handlers::get_dashboard,
        handlers::refresh_dashboard,
        handlers::get_patient,
        handlers::update_status,
        handlers::email_draft,
        handlers::send_email,
        handlers::hie_sources,
        handlers::request_hie_document,
        handlers::scheduling_slots,
        handlers::schedule_patient,
        handlers::chat,
    ),
    components(schemas(
        dto::HealthRes,
        dto::ErrorRes,
        dto::StatusReq,
        dto::StatusRes,
        dto::SendEmailReq,
        dto::HieRequestReq,
        dto::ScheduleReq,
        dto::ChatReq,
        dto::ChatRes,
    ))
)]
pub struct ApiDoc;

/// Build the REST router with Swagger UI and permissive CORS.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/dashboard", get(handlers::get_dashboard))
        .route("/dashboard/refresh", post(handlers::refresh_dashboard))
        .route("/patients/:id", get(handlers::get_patient))
        .route("/patients/:id/status", post(handlers::update_status))
        .route(
            "/patients/:id/documents/email-draft",
            get(handlers::email_draft),
        )
        .route("/patients/:id/documents/email", post(handlers::send_email))
        .route(
            "/patients/:id/documents/hie",
            post(handlers::request_hie_document),
        )
        .route("/patients/:id/schedule", post(handlers::schedule_patient))
        .route("/patients/:id/chat", post(handlers::chat))
        .route("/hie/sources", get(handlers::hie_sources))
        .route("/scheduling/slots", get(handlers::scheduling_slots))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
