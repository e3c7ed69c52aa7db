//! Dashboard filter predicate.
//!
//! A patient is shown when all four conditions hold: review status,
//! surgery type, assigned provider and the free-text search.

use crate::constants::FILTER_ALL;
use crate::patient::Patient;
use crate::TriageError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Review-status dropdown value.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReviewStatusFilter {
    #[default]
    All,
    NeedsReview,
    Reviewed,
}

impl ReviewStatusFilter {
    fn matches(&self, patient: &Patient) -> bool {
        match self {
            Self::All => true,
            Self::NeedsReview => patient.needs_review,
            Self::Reviewed => !patient.needs_review,
        }
    }
}

impl std::str::FromStr for ReviewStatusFilter {
    type Err = TriageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "" | FILTER_ALL => Ok(Self::All),
            "needs-review" => Ok(Self::NeedsReview),
            "reviewed" => Ok(Self::Reviewed),
            other => Err(TriageError::InvalidInput(format!(
                "unknown review status filter {other:?}"
            ))),
        }
    }
}

/// A dropdown that is either "all" or one exact value.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Selection {
    #[default]
    All,
    Exactly(String),
}

impl Selection {
    /// `"all"` (or nothing) means no restriction; anything else is an exact match.
    pub fn from_param(value: Option<&str>) -> Self {
        match value {
            None => Self::All,
            Some(v) if v.is_empty() || v == FILTER_ALL => Self::All,
            Some(v) => Self::Exactly(v.to_string()),
        }
    }

    fn matches(&self, value: &str) -> bool {
        match self {
            Self::All => true,
            Self::Exactly(wanted) => !value.is_empty() && value == wanted,
        }
    }
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str(FILTER_ALL),
            Self::Exactly(value) => f.write_str(value),
        }
    }
}

/// The three dropdowns of the dashboard.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FilterCriteria {
    pub review_status: ReviewStatusFilter,
    pub surgery_type: Selection,
    pub provider: Selection,
}

/// Case-insensitive search over name and surgery type. Empty matches everything.
pub fn matches_search(patient: &Patient, search: &str) -> bool {
    if search.is_empty() {
        return true;
    }

    let needle = search.to_lowercase();
    patient.name.to_lowercase().contains(&needle)
        || patient.surgery_type.to_lowercase().contains(&needle)
}

/// True iff `patient` passes every filter and the search term.
pub fn matches(patient: &Patient, criteria: &FilterCriteria, search: &str) -> bool {
    criteria.review_status.matches(patient)
        && criteria.surgery_type.matches(&patient.surgery_type)
        && criteria.provider.matches(&patient.assigned_to)
        && matches_search(patient, search)
}

/// Patients passing the filters, in their original order.
pub fn apply<'a>(
    patients: &'a [Patient],
    criteria: &FilterCriteria,
    search: &str,
) -> Vec<&'a Patient> {
    patients
        .iter()
        .filter(|p| matches(p, criteria, search))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patient::tests::patient;

    fn roster() -> Vec<Patient> {
        let mut a = patient("a");
        a.name = "Ada Byron".into();
        a.surgery_type = "Knee Replacement".into();
        a.assigned_to = "Dr. Smith".into();
        a.needs_review = true;

        let mut b = patient("b");
        b.name = "Ben Okafor".into();
        b.surgery_type = "Gastric Bypass".into();
        b.assigned_to = "Dr. White".into();
        b.needs_review = false;

        let mut c = patient("c");
        c.name = "Cara Singh".into();
        c.surgery_type = "Knee Arthroscopy".into();
        c.assigned_to = "Dr. White".into();
        c.needs_review = true;

        vec![a, b, c]
    }

    fn ids(patients: &[&Patient]) -> Vec<String> {
        patients.iter().map(|p| p.id.clone()).collect()
    }

    #[test]
    fn default_criteria_and_empty_search_match_everyone() {
        let patients = roster();
        let shown = apply(&patients, &FilterCriteria::default(), "");
        assert_eq!(ids(&shown), vec!["a", "b", "c"]);
    }

    #[test]
    fn empty_search_matches_any_patient() {
        let mut odd = patient("x");
        odd.name = String::new();
        odd.surgery_type = String::new();
        assert!(matches_search(&odd, ""));
        assert!(roster().iter().all(|p| matches_search(p, "")));
    }

    #[test]
    fn review_status_filter_follows_needs_review_flag() {
        let patients = roster();
        let needs = FilterCriteria {
            review_status: ReviewStatusFilter::NeedsReview,
            ..Default::default()
        };
        let reviewed = FilterCriteria {
            review_status: ReviewStatusFilter::Reviewed,
            ..Default::default()
        };
        assert_eq!(ids(&apply(&patients, &needs, "")), vec!["a", "c"]);
        assert_eq!(ids(&apply(&patients, &reviewed, "")), vec!["b"]);
    }

    #[test]
    fn search_is_case_insensitive_over_name_and_surgery_type() {
        let patients = roster();
        let criteria = FilterCriteria::default();
        assert_eq!(ids(&apply(&patients, &criteria, "KNEE")), vec!["a", "c"]);
        assert_eq!(ids(&apply(&patients, &criteria, "okafor")), vec!["b"]);
        assert!(apply(&patients, &criteria, "cardiac").is_empty());
    }

    #[test]
    fn conditions_are_conjunctive() {
        let patients = roster();
        let criteria = FilterCriteria {
            review_status: ReviewStatusFilter::NeedsReview,
            surgery_type: Selection::All,
            provider: Selection::Exactly("Dr. White".into()),
        };
        assert_eq!(ids(&apply(&patients, &criteria, "knee")), vec!["c"]);
        assert!(apply(&patients, &criteria, "ada").is_empty());
    }

    #[test]
    fn exact_selection_does_not_match_substrings_or_blank_fields() {
        let mut blank = patient("blank");
        blank.surgery_type = String::new();
        let criteria = FilterCriteria {
            surgery_type: Selection::Exactly("Knee".into()),
            ..Default::default()
        };
        assert!(!matches(&roster()[0], &criteria, ""));
        assert!(!matches(&blank, &criteria, ""));
    }

    #[test]
    fn filtering_is_idempotent() {
        let patients = roster();
        let criteria = FilterCriteria {
            review_status: ReviewStatusFilter::NeedsReview,
            ..Default::default()
        };
        let once: Vec<Patient> = apply(&patients, &criteria, "knee")
            .into_iter()
            .cloned()
            .collect();
        let twice = apply(&once, &criteria, "knee");
        assert_eq!(ids(&twice), once.iter().map(|p| p.id.clone()).collect::<Vec<_>>());
    }

    #[test]
    fn parses_dropdown_values() {
        assert_eq!(
            "all".parse::<ReviewStatusFilter>().expect("parse"),
            ReviewStatusFilter::All
        );
        assert_eq!(
            "needs-review".parse::<ReviewStatusFilter>().expect("parse"),
            ReviewStatusFilter::NeedsReview
        );
        assert!("pending".parse::<ReviewStatusFilter>().is_err());
        assert_eq!(Selection::from_param(Some("all")), Selection::All);
        assert_eq!(Selection::from_param(None), Selection::All);
        assert_eq!(
            Selection::from_param(Some("Dr. Smith")),
            Selection::Exactly("Dr. Smith".into())
        );
    }
}
