//! Summary counts shown above the dashboard.

use crate::patient::Patient;
use serde::Serialize;

/// Counts over the full, unfiltered patient list.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryStats {
    pub total: usize,
    pub needs_review: usize,
    pub reviewed: usize,
}

impl SummaryStats {
    pub fn compute(patients: &[Patient]) -> Self {
        let needs_review = patients.iter().filter(|p| p.needs_review).count();
        Self {
            total: patients.len(),
            needs_review,
            reviewed: patients.len() - needs_review,
        }
    }
}
