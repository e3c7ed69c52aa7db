//! Review aids shown alongside a patient: checklist progress, priority band
//! and the red/orange/green readiness legend.

use crate::constants::{HIGH_PRIORITY_THRESHOLD, MEDIUM_PRIORITY_THRESHOLD};
use crate::patient::Patient;
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ReviewStep {
    pub label: String,
    pub completed: bool,
    pub critical: bool,
}

impl ReviewStep {
    /// One critical step per surgery requirement, then one step per required document.
    pub fn for_patient(patient: &Patient) -> Vec<ReviewStep> {
        let requirements = patient.surgery_requirements.iter().map(|r| ReviewStep {
            label: r.name.clone(),
            completed: r.met,
            critical: true,
        });
        let documents = patient.required_documents.iter().map(|d| ReviewStep {
            label: d.document_type.clone(),
            completed: d.received,
            critical: false,
        });
        requirements.chain(documents).collect()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewProgress {
    pub steps: Vec<ReviewStep>,
    pub completed: usize,
    pub total: usize,
    /// 0 to 100; 0 when there are no steps.
    pub percent: f64,
    pub critical_pending: usize,
}

impl ReviewProgress {
    pub fn from_steps(steps: Vec<ReviewStep>) -> Self {
        let completed = steps.iter().filter(|s| s.completed).count();
        let critical_pending = steps.iter().filter(|s| !s.completed && s.critical).count();
        let total = steps.len();
        let percent = if total == 0 {
            0.0
        } else {
            completed as f64 / total as f64 * 100.0
        };

        Self {
            steps,
            completed,
            total,
            percent,
            critical_pending,
        }
    }

    pub fn for_patient(patient: &Patient) -> Self {
        Self::from_steps(ReviewStep::for_patient(patient))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PriorityBand {
    High,
    Medium,
    Low,
}

impl PriorityBand {
    pub fn from_score(score: f64) -> Self {
        if score >= HIGH_PRIORITY_THRESHOLD {
            Self::High
        } else if score >= MEDIUM_PRIORITY_THRESHOLD {
            Self::Medium
        } else {
            Self::Low
        }
    }
}

/// Status legend colour.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Readiness {
    /// Meets all criteria.
    Green,
    /// Missing auxiliary data.
    Orange,
    /// Critical data missing.
    Red,
}

impl Readiness {
    pub fn for_patient(patient: &Patient) -> Self {
        if !patient.requirements_met() {
            Self::Red
        } else if !patient.documents_received() {
            Self::Orange
        } else {
            Self::Green
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Green => "Meets all criteria",
            Self::Orange => "Missing auxiliary data",
            Self::Red => "Critical data missing",
        }
    }
}
