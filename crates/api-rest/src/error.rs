//! Mapping from [`TriageError`] to HTTP responses.

use crate::dto::ErrorRes;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use triage_core::TriageError;

/// Handler error: a `TriageError` rendered as `{ "message": ... }`.
#[derive(Debug)]
pub struct ApiError(pub TriageError);

impl ApiError {
    /// Status code for the wrapped error.
    ///
    /// - `400` for invalid input
    /// - `404` for unknown patients
    /// - `409` for a slot that is already taken
    /// - `502` when the backend or an integration fails
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            TriageError::InvalidInput(_)
            | TriageError::InvalidPatientId(_)
            | TriageError::NoSelection => StatusCode::BAD_REQUEST,
            TriageError::PatientNotFound(_) => StatusCode::NOT_FOUND,
            TriageError::SlotUnavailable(_) => StatusCode::CONFLICT,
            TriageError::Http { .. }
            | TriageError::Transport(_)
            | TriageError::Decode { .. }
            | TriageError::SourceUnavailable(_)
            | TriageError::Delivery(_) => StatusCode::BAD_GATEWAY,
            TriageError::FixtureRead(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<TriageError> for ApiError {
    fn from(err: TriageError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), error = %self.0, "request failed");
        } else {
            tracing::debug!(status = status.as_u16(), error = %self.0, "request rejected");
        }

        (
            status,
            Json(ErrorRes {
                message: self.0.to_string(),
            }),
        )
            .into_response()
    }
}
