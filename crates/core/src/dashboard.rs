//! Dashboard aggregation and state.
//!
//! [`build_view`] is the pure aggregator: filter, classify and order, then
//! count. [`TriageDashboard`] wraps it with the in-memory state the dashboard
//! keeps between backend round trips: the last good patient list, the last
//! error, a loading flag and the patient open in the detail view.

use crate::filter::{self, FilterCriteria};
use crate::patient::{Patient, ReviewStatus};
use crate::ports::PatientBackend;
use crate::review::{PriorityBand, Readiness, ReviewProgress};
use crate::stats::SummaryStats;
use crate::triage::{self, Bucket};
use crate::{TriageError, TriageResult};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use triage_types::{format_optional_date, PatientId};

// ============================================================================
// Views
// ============================================================================

/// Distinct dropdown values, in first-seen order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterOptions {
    pub surgery_types: Vec<String>,
    pub providers: Vec<String>,
}

impl FilterOptions {
    pub fn collect(patients: &[Patient]) -> Self {
        let mut options = Self::default();
        for patient in patients {
            if !options.surgery_types.contains(&patient.surgery_type) {
                options.surgery_types.push(patient.surgery_type.clone());
            }
            if !options.providers.contains(&patient.assigned_to) {
                options.providers.push(patient.assigned_to.clone());
            }
        }
        options
    }
}

/// Everything the dashboard page shows.
#[derive(Clone, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardView {
    pub needs_review: Vec<Patient>,
    pub scheduled: Vec<Patient>,
    pub rejected: Vec<Patient>,
    /// Number of patients passing the filters, bucketed or not.
    pub matching: usize,
    pub stats: SummaryStats,
    pub filter_options: FilterOptions,
    pub error: Option<String>,
    pub loading: bool,
    pub last_loaded_at: Option<DateTime<Utc>>,
}

/// Compose filter, classifier and ordering into the three display lists.
///
/// Stats and filter options are computed over the full list, not the
/// filtered one.
pub fn build_view(patients: &[Patient], criteria: &FilterCriteria, search: &str) -> DashboardView {
    let filtered = filter::apply(patients, criteria, search);
    let matching = filtered.len();
    let buckets = triage::classify(filtered);

    fn owned(list: &[&Patient]) -> Vec<Patient> {
        list.iter().map(|p| (*p).clone()).collect()
    }

    DashboardView {
        needs_review: owned(&buckets.needs_review),
        scheduled: owned(&buckets.scheduled),
        rejected: owned(&buckets.rejected),
        matching,
        stats: SummaryStats::compute(patients),
        filter_options: FilterOptions::collect(patients),
        ..Default::default()
    }
}

/// Formatted dates for the detail view.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayDates {
    pub consult_date: String,
    pub last_updated: String,
    pub reviewed_at: String,
    pub scheduled_date: String,
}

/// A patient together with the derived review aids.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientDetail {
    pub patient: Patient,
    pub bucket: Option<Bucket>,
    pub progress: ReviewProgress,
    pub priority_band: PriorityBand,
    pub readiness: Readiness,
    pub readiness_description: &'static str,
    /// What the detail view's action button would send.
    pub next_status: ReviewStatus,
    pub dates: DisplayDates,
}

impl PatientDetail {
    pub fn new(patient: Patient) -> Self {
        let readiness = Readiness::for_patient(&patient);
        let dates = DisplayDates {
            consult_date: format_optional_date(patient.consult_date.as_ref()),
            last_updated: format_optional_date(patient.last_updated.as_ref()),
            reviewed_at: format_optional_date(patient.reviewed_at.as_ref()),
            scheduled_date: format_optional_date(patient.scheduled_date.as_ref()),
        };

        Self {
            bucket: triage::bucket_of(&patient),
            progress: ReviewProgress::for_patient(&patient),
            priority_band: PriorityBand::from_score(patient.priority_score),
            readiness,
            readiness_description: readiness.description(),
            next_status: ReviewStatus::toggled_for(&patient),
            dates,
            patient,
        }
    }
}

// ============================================================================
// State
// ============================================================================

#[derive(Clone, Debug, Default)]
pub struct DashboardState {
    pub patients: Vec<Patient>,
    pub error: Option<String>,
    pub loading: bool,
    pub selected: Option<PatientId>,
    pub last_loaded_at: Option<DateTime<Utc>>,
    loads_in_flight: usize,
}

impl DashboardState {
    fn finish_load(&mut self) {
        self.loads_in_flight = self.loads_in_flight.saturating_sub(1);
        self.loading = self.loads_in_flight > 0;
    }
}

/// Dashboard state bound to a patient backend.
///
/// Loads replace the whole list, so when two loads overlap the one that
/// resolves last wins, for the error as well as the list. `loading` stays set
/// until every overlapping load has finished. Locks are never held across a
/// backend call.
pub struct TriageDashboard {
    backend: Arc<dyn PatientBackend>,
    state: RwLock<DashboardState>,
}

impl TriageDashboard {
    pub fn new(backend: Arc<dyn PatientBackend>) -> Self {
        Self {
            backend,
            state: RwLock::new(DashboardState::default()),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, DashboardState> {
        self.state
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, DashboardState> {
        self.state
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Fetch the patient list from the backend.
    ///
    /// On success the list is replaced. On failure the previous list is kept
    /// as it was and the error text is stored for display.
    ///
    /// # Returns
    ///
    /// The number of patients loaded.
    ///
    /// # Errors
    ///
    /// Returns the backend's `TriageError` after recording it in the state.
    pub async fn load_patients(&self) -> TriageResult<usize> {
        {
            let mut state = self.write();
            state.loads_in_flight += 1;
            state.loading = true;
            state.error = None;
        }

        let result = self.backend.fetch_patients().await;

        match result {
            Ok(patients) => {
                log_consistency(&patients);
                let count = patients.len();
                let mut state = self.write();
                state.finish_load();
                state.error = None;
                state.patients = patients;
                state.last_loaded_at = Some(Utc::now());
                tracing::info!(count, "loaded patients");
                Ok(count)
            }
            Err(err) => {
                tracing::warn!(error = %err, "failed to load patients");
                let mut state = self.write();
                state.finish_load();
                state.error = Some(err.to_string());
                Err(err)
            }
        }
    }

    /// Copy of the current state.
    pub fn snapshot(&self) -> DashboardState {
        self.read().clone()
    }

    pub fn error(&self) -> Option<String> {
        self.read().error.clone()
    }

    pub fn stats(&self) -> SummaryStats {
        SummaryStats::compute(&self.read().patients)
    }

    /// Build the dashboard page for the given filters.
    pub fn view(&self, criteria: &FilterCriteria, search: &str) -> DashboardView {
        let state = self.read();
        DashboardView {
            error: state.error.clone(),
            loading: state.loading,
            last_loaded_at: state.last_loaded_at,
            ..build_view(&state.patients, criteria, search)
        }
    }

    pub fn patient(&self, id: &PatientId) -> TriageResult<Patient> {
        self.read()
            .patients
            .iter()
            .find(|p| p.id == id.as_str())
            .cloned()
            .ok_or_else(|| TriageError::PatientNotFound(id.to_string()))
    }

    pub fn detail(&self, id: &PatientId) -> TriageResult<PatientDetail> {
        self.patient(id).map(PatientDetail::new)
    }

    /// Open the detail view for `id`.
    pub fn select(&self, id: &PatientId) -> TriageResult<Patient> {
        let patient = self.patient(id)?;
        self.write().selected = Some(id.clone());
        tracing::debug!(patient_id = %id, "selected patient");
        Ok(patient)
    }

    pub fn clear_selection(&self) {
        self.write().selected = None;
    }

    pub fn selected_patient(&self) -> Option<Patient> {
        let state = self.read();
        let id = state.selected.as_ref()?;
        state.patients.iter().find(|p| p.id == id.as_str()).cloned()
    }

    /// Send a status change for one patient and reload the list.
    ///
    /// A failed reload is recorded in the state but does not fail the update.
    ///
    /// # Errors
    ///
    /// Returns the backend's `TriageError` if the update itself fails.
    pub async fn update_status(&self, id: &PatientId, status: ReviewStatus) -> TriageResult<()> {
        if let Err(err) = self.backend.update_status(id, status).await {
            tracing::error!(patient_id = %id, %status, error = %err, "failed to update patient status");
            return Err(err);
        }
        tracing::info!(patient_id = %id, %status, "updated patient status");

        if let Err(err) = self.load_patients().await {
            tracing::warn!(error = %err, "reload after status update failed");
        }
        Ok(())
    }

    /// Send `status` for the selected patient and close the detail view.
    ///
    /// If the update fails the detail view stays open.
    ///
    /// # Errors
    ///
    /// Returns `TriageError::NoSelection` when nothing is selected, or the
    /// backend's error when the update fails.
    pub async fn update_selected_status(&self, status: ReviewStatus) -> TriageResult<()> {
        let selected = self.read().selected.clone().ok_or(TriageError::NoSelection)?;

        self.update_status(&selected, status).await?;

        let mut state = self.write();
        if state.selected.as_ref() == Some(&selected) {
            state.selected = None;
        }
        Ok(())
    }

    /// The detail view's action button: mark reviewed, or back to needs-review.
    pub async fn toggle_selected_status(&self) -> TriageResult<ReviewStatus> {
        let patient = self.selected_patient().ok_or(TriageError::NoSelection)?;
        let status = ReviewStatus::toggled_for(&patient);
        self.update_selected_status(status).await?;
        Ok(status)
    }
}

fn log_consistency(patients: &[Patient]) {
    for patient in patients {
        for issue in patient.consistency_issues() {
            tracing::warn!(patient_id = %patient.id, %issue, "inconsistent patient record");
        }
        if patient.is_candidate != patient.requirements_met() {
            tracing::debug!(
                patient_id = %patient.id,
                is_candidate = patient.is_candidate,
                "candidacy flag disagrees with surgery requirements"
            );
        }
    }
}
