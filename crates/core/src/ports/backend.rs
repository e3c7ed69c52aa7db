//! Patient backend port and its in-memory fake.

use crate::patient::{Patient, ReviewStatus};
use crate::{TriageError, TriageResult};
use async_trait::async_trait;
use chrono::Utc;
use std::path::Path;
use std::sync::Mutex;
use triage_types::{PatientId, Timestamp};

/// The REST backend that owns patient records.
#[async_trait]
pub trait PatientBackend: Send + Sync {
    /// Fetch the full patient collection.
    async fn fetch_patients(&self) -> TriageResult<Vec<Patient>>;

    /// Ask the backend to move one patient to `status`.
    async fn update_status(&self, id: &PatientId, status: ReviewStatus) -> TriageResult<()>;
}

/// Backend fake holding records in memory.
///
/// Status updates are applied to the stored records, so a reload after an
/// update sees the change. A failure message can be injected to make every
/// call fail until it is cleared.
#[derive(Debug, Default)]
pub struct InMemoryBackend {
    patients: Mutex<Vec<Patient>>,
    failure: Mutex<Option<String>>,
    status_log: Mutex<Vec<(PatientId, ReviewStatus)>>,
}

impl InMemoryBackend {
    pub fn new(patients: Vec<Patient>) -> Self {
        Self {
            patients: Mutex::new(patients),
            ..Default::default()
        }
    }

    /// Seed the backend from a JSON file holding an array of patients.
    ///
    /// # Errors
    ///
    /// Returns `TriageError::FixtureRead` if the file cannot be read, or
    /// `TriageError::Decode` (with the offending JSON path) if it is not a
    /// valid patient array.
    pub fn from_fixture_file(path: &Path) -> TriageResult<Self> {
        let bytes = std::fs::read(path).map_err(TriageError::FixtureRead)?;
        let patients = Patient::decode_list(&bytes)?;
        tracing::debug!(count = patients.len(), path = %path.display(), "loaded patient fixture");
        Ok(Self::new(patients))
    }

    /// Make every subsequent call fail with `message`, or succeed again with `None`.
    pub fn set_failure(&self, message: Option<&str>) {
        *lock(&self.failure) = message.map(str::to_string);
    }

    pub fn replace_patients(&self, patients: Vec<Patient>) {
        *lock(&self.patients) = patients;
    }

    pub fn patients(&self) -> Vec<Patient> {
        lock(&self.patients).clone()
    }

    /// Every status update accepted so far, oldest first.
    pub fn status_log(&self) -> Vec<(PatientId, ReviewStatus)> {
        lock(&self.status_log).clone()
    }

    fn check_failure(&self) -> TriageResult<()> {
        match lock(&self.failure).as_ref() {
            Some(message) => Err(TriageError::Transport(message.clone())),
            None => Ok(()),
        }
    }
}

/// A poisoned lock only means another test thread panicked; the data is still usable.
fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[async_trait]
impl PatientBackend for InMemoryBackend {
    async fn fetch_patients(&self) -> TriageResult<Vec<Patient>> {
        self.check_failure()?;
        Ok(self.patients())
    }

    async fn update_status(&self, id: &PatientId, status: ReviewStatus) -> TriageResult<()> {
        self.check_failure()?;

        let mut patients = lock(&self.patients);
        let patient = patients
            .iter_mut()
            .find(|p| p.id == id.as_str())
            .ok_or_else(|| TriageError::PatientNotFound(id.to_string()))?;

        match status {
            ReviewStatus::Reviewed => {
                patient.needs_review = false;
                patient.reviewed_at = Some(Timestamp::from_datetime(Utc::now()));
            }
            ReviewStatus::NeedsReview => {
                patient.needs_review = true;
                patient.reviewed_at = None;
                patient.scheduled_date = None;
            }
        }
        drop(patients);

        lock(&self.status_log).push((id.clone(), status));
        Ok(())
    }
}
