/// Fallback message when a failed backend response carries no `message` field.
pub const UNKNOWN_ERROR_MESSAGE: &str = "Unknown error";

#[derive(Debug, thiserror::Error)]
pub enum TriageError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The backend answered with a non-2xx status.
    #[error("HTTP error! status: {status}, message: {message}")]
    Http { status: u16, message: String },

    /// The backend could not be reached at all.
    #[error("failed to reach backend: {0}")]
    Transport(String),

    #[error("failed to decode response at {path}: {message}")]
    Decode { path: String, message: String },

    #[error("failed to read fixture file: {0}")]
    FixtureRead(std::io::Error),

    #[error("patient not found: {0}")]
    PatientNotFound(String),

    #[error("no patient selected")]
    NoSelection,

    #[error("document source unavailable: {0}")]
    SourceUnavailable(String),

    #[error("time slot unavailable: {0}")]
    SlotUnavailable(String),

    #[error("failed to deliver document request: {0}")]
    Delivery(String),

    #[error("invalid patient id: {0}")]
    InvalidPatientId(#[from] triage_types::TextError),
}

impl TriageError {
    /// Builds an [`TriageError::Http`] from a status code and an optional backend message.
    pub fn http(status: u16, message: Option<String>) -> Self {
        Self::Http {
            status,
            message: message
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| UNKNOWN_ERROR_MESSAGE.into()),
        }
    }
}

pub type TriageResult<T> = std::result::Result<T, TriageError>;
