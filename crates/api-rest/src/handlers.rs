//! Route handlers.
//!
//! Each handler resolves its inputs, calls into `triage-core` and lets
//! [`ApiError`] pick the status code for failures.

use crate::dto::{
    ChatReq, ChatRes, DashboardQuery, EmailDraftQuery, ErrorRes, HealthRes, HieRequestReq,
    ScheduleReq, SendEmailReq, StatusReq, StatusRes,
};
use crate::error::ApiError;
use crate::AppState;
use axum::extract::{Path, Query, State};
use axum::response::Json;
use chrono::Utc;
use triage_core::dashboard::DashboardView;
use triage_core::ports::{Booking, DeliveryReceipt, HieSource, TimeSlot};
use triage_core::{EmailDraft, PatientDetail, PatientId, ReviewStatus, TriageError};

type ApiResult<T> = Result<Json<T>, ApiError>;

fn patient_id(raw: &str) -> Result<PatientId, ApiError> {
    PatientId::new(raw).map_err(|err| ApiError(err.into()))
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = HealthRes)
    )
)]
/// Health check endpoint for the REST API
///
/// Used for monitoring and load balancer health checks. Does not contact the backend.
#[axum::debug_handler]
pub async fn health(State(_state): State<AppState>) -> Json<HealthRes> {
    Json(HealthRes {
        ok: true,
        message: "Triage REST API is alive".into(),
    })
}

#[utoipa::path(
    get,
    path = "/dashboard",
    params(DashboardQuery),
    responses(
        (status = 200, description = "Filtered buckets, stats and filter options", body = Object),
        (status = 400, description = "Unknown review status filter", body = ErrorRes)
    )
)]
/// Current dashboard page
///
/// Filters the last loaded patient list, splits it into the three buckets and
/// orders each bucket. Statistics always cover the unfiltered list.
///
/// # Errors
/// Returns `400 Bad Request` if `reviewStatus` is not `all`, `needs-review` or `reviewed`.
#[axum::debug_handler]
pub async fn get_dashboard(
    State(state): State<AppState>,
    Query(query): Query<DashboardQuery>,
) -> ApiResult<DashboardView> {
    let criteria = query.criteria()?;
    Ok(Json(state.dashboard.view(&criteria, query.search())))
}

#[utoipa::path(
    post,
    path = "/dashboard/refresh",
    params(DashboardQuery),
    responses(
        (status = 200, description = "Reloaded dashboard page", body = Object),
        (status = 400, description = "Unknown review status filter", body = ErrorRes),
        (status = 502, description = "Backend failure; the previous list is kept", body = ErrorRes)
    )
)]
/// Reload patients from the backend, then return the dashboard page
///
/// # Errors
/// Returns `502 Bad Gateway` with the backend's message if the fetch fails.
#[axum::debug_handler]
pub async fn refresh_dashboard(
    State(state): State<AppState>,
    Query(query): Query<DashboardQuery>,
) -> ApiResult<DashboardView> {
    let criteria = query.criteria()?;
    state.dashboard.load_patients().await?;
    Ok(Json(state.dashboard.view(&criteria, query.search())))
}

#[utoipa::path(
    get,
    path = "/patients/{id}",
    params(("id" = String, Path, description = "Patient id")),
    responses(
        (status = 200, description = "Patient with review aids", body = Object),
        (status = 404, description = "Unknown patient", body = ErrorRes)
    )
)]
/// Detail view for one patient
///
/// Includes review progress, priority band, readiness and display dates.
#[axum::debug_handler]
pub async fn get_patient(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<PatientDetail> {
    let id = patient_id(&id)?;
    Ok(Json(state.dashboard.detail(&id)?))
}

#[utoipa::path(
    post,
    path = "/patients/{id}/status",
    params(("id" = String, Path, description = "Patient id")),
    request_body = StatusReq,
    responses(
        (status = 200, description = "Status recorded", body = StatusRes),
        (status = 400, description = "Unknown status value", body = ErrorRes),
        (status = 404, description = "Unknown patient", body = ErrorRes),
        (status = 502, description = "Backend rejected the update", body = ErrorRes)
    )
)]
/// Mark a patient reviewed or send them back to needs-review
///
/// The patient list is reloaded after a successful update.
///
/// # Errors
/// Returns `400 Bad Request` for a status other than `reviewed` or `needs-review`,
/// and `502 Bad Gateway` if the backend rejects the update.
#[axum::debug_handler]
pub async fn update_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<StatusReq>,
) -> ApiResult<StatusRes> {
    let id = patient_id(&id)?;
    let status: ReviewStatus = req.status.parse()?;

    state.dashboard.update_status(&id, status).await?;

    Ok(Json(StatusRes {
        id: id.to_string(),
        status: status.to_string(),
    }))
}

#[utoipa::path(
    get,
    path = "/patients/{id}/documents/email-draft",
    params(
        ("id" = String, Path, description = "Patient id"),
        EmailDraftQuery
    ),
    responses(
        (status = 200, description = "Pre-filled document request", body = Object),
        (status = 400, description = "Missing document type", body = ErrorRes),
        (status = 404, description = "Unknown patient", body = ErrorRes)
    )
)]
/// Draft an email to the referring provider asking for a missing document
#[axum::debug_handler]
pub async fn email_draft(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<EmailDraftQuery>,
) -> ApiResult<EmailDraft> {
    let id = patient_id(&id)?;
    let document_type = query
        .document_type
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .ok_or_else(|| TriageError::InvalidInput("documentType is required".into()))?;

    let patient = state.dashboard.patient(&id)?;
    Ok(Json(EmailDraft::for_missing_document(
        &patient.name,
        document_type,
        &patient.referring_provider,
        &state.organisation,
    )))
}

#[utoipa::path(
    post,
    path = "/patients/{id}/documents/email",
    params(("id" = String, Path, description = "Patient id")),
    request_body = SendEmailReq,
    responses(
        (status = 200, description = "Request sent", body = Object),
        (status = 400, description = "Recipient or subject invalid", body = ErrorRes),
        (status = 404, description = "Unknown patient", body = ErrorRes),
        (status = 502, description = "Mail delivery failed", body = ErrorRes)
    )
)]
/// Send an (edited) document request email
#[axum::debug_handler]
pub async fn send_email(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<SendEmailReq>,
) -> ApiResult<DeliveryReceipt> {
    let id = patient_id(&id)?;
    state.dashboard.patient(&id)?;

    let draft = EmailDraft {
        to: req.to,
        subject: req.subject,
        body: req.body,
    };
    let receipt = state.mailer.send(&draft).await?;
    tracing::info!(patient_id = %id, receipt_id = %receipt.id, "document request emailed");

    Ok(Json(receipt))
}

#[utoipa::path(
    get,
    path = "/hie/sources",
    responses(
        (status = 200, description = "Health information exchange sources", body = Object),
        (status = 502, description = "Gateway failure", body = ErrorRes)
    )
)]
/// List the document sources that can be queried
#[axum::debug_handler]
pub async fn hie_sources(State(state): State<AppState>) -> ApiResult<Vec<HieSource>> {
    Ok(Json(state.hie.sources().await?))
}

#[utoipa::path(
    post,
    path = "/patients/{id}/documents/hie",
    params(("id" = String, Path, description = "Patient id")),
    request_body = HieRequestReq,
    responses(
        (status = 200, description = "Request sent to the source", body = Object),
        (status = 400, description = "Missing document type", body = ErrorRes),
        (status = 404, description = "Unknown patient", body = ErrorRes),
        (status = 502, description = "Source unknown or unavailable", body = ErrorRes)
    )
)]
/// Request a missing document from a health information exchange
#[axum::debug_handler]
pub async fn request_hie_document(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<HieRequestReq>,
) -> ApiResult<DeliveryReceipt> {
    let id = patient_id(&id)?;
    let patient = state.dashboard.patient(&id)?;

    let receipt = state
        .hie
        .request_document(&req.source_id, &patient, &req.document_type)
        .await?;
    Ok(Json(receipt))
}

#[utoipa::path(
    get,
    path = "/scheduling/slots",
    responses(
        (status = 200, description = "Upcoming appointment slots", body = Object)
    )
)]
/// Appointment slots offered from tomorrow onwards
#[axum::debug_handler]
pub async fn scheduling_slots(State(state): State<AppState>) -> ApiResult<Vec<TimeSlot>> {
    Ok(Json(state.scheduler.available_slots(Utc::now()).await?))
}

#[utoipa::path(
    post,
    path = "/patients/{id}/schedule",
    params(("id" = String, Path, description = "Patient id")),
    request_body = ScheduleReq,
    responses(
        (status = 200, description = "Slot booked", body = Object),
        (status = 404, description = "Unknown patient", body = ErrorRes),
        (status = 409, description = "Slot unknown or already booked", body = ErrorRes)
    )
)]
/// Book an appointment slot for a patient
#[axum::debug_handler]
pub async fn schedule_patient(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<ScheduleReq>,
) -> ApiResult<Booking> {
    let id = patient_id(&id)?;
    state.dashboard.patient(&id)?;

    let booking = state.scheduler.book(&id, &req.slot_id, Utc::now()).await?;
    tracing::info!(patient_id = %id, slot_id = %booking.slot.id, "booked appointment");

    Ok(Json(booking))
}

#[utoipa::path(
    post,
    path = "/patients/{id}/chat",
    params(("id" = String, Path, description = "Patient id")),
    request_body = ChatReq,
    responses(
        (status = 200, description = "Assistant answer", body = ChatRes),
        (status = 400, description = "Empty question", body = ErrorRes),
        (status = 404, description = "Unknown patient", body = ErrorRes),
        (status = 502, description = "Assistant failure", body = ErrorRes)
    )
)]
/// Ask the assistant a question about one patient
#[axum::debug_handler]
pub async fn chat(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<ChatReq>,
) -> ApiResult<ChatRes> {
    let id = patient_id(&id)?;
    if req.chat.trim().is_empty() {
        return Err(TriageError::InvalidInput("chat cannot be empty".into()).into());
    }

    let patient = state.dashboard.patient(&id)?;
    let response = state.chat.complete(&req.chat, &patient).await?;
    Ok(Json(response.into()))
}
