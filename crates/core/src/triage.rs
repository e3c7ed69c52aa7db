//! Triage classification and per-bucket ordering.
//!
//! Patients are split on two flags:
//!
//! | needsReview | isCandidate | bucket            |
//! |-------------|-------------|-------------------|
//! | true        | true        | needs review      |
//! | false       | true        | reviewed/scheduled|
//! | false       | false       | rejected          |
//! | true        | false       | none              |
//!
//! Every sort is stable, so ties keep the order the backend sent.

use crate::patient::Patient;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::cmp::Ordering;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Bucket {
    NeedsReview,
    Scheduled,
    Rejected,
}

/// Which bucket `patient` belongs to, if any.
///
/// Non-candidates still awaiting review belong to no bucket.
pub fn bucket_of(patient: &Patient) -> Option<Bucket> {
    match (patient.needs_review, patient.is_candidate) {
        (true, true) => Some(Bucket::NeedsReview),
        (false, true) => Some(Bucket::Scheduled),
        (false, false) => Some(Bucket::Rejected),
        (true, false) => None,
    }
}

/// Priority score, highest first.
pub fn by_priority_desc(a: &Patient, b: &Patient) -> Ordering {
    b.priority_score.total_cmp(&a.priority_score)
}

/// Scheduled date, earliest first. Missing or invalid dates go last.
pub fn by_scheduled_asc(a: &Patient, b: &Patient) -> Ordering {
    let a = instant(a.scheduled_date.as_ref());
    let b = instant(b.scheduled_date.as_ref());
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Review time, latest first. Missing or invalid dates count as the earliest.
pub fn by_reviewed_desc(a: &Patient, b: &Patient) -> Ordering {
    // `None < Some(_)`, which is exactly "treat as earliest".
    instant(b.reviewed_at.as_ref()).cmp(&instant(a.reviewed_at.as_ref()))
}

fn instant(value: Option<&triage_types::Timestamp>) -> Option<DateTime<Utc>> {
    value.and_then(|ts| ts.instant())
}

/// The three ordered display lists.
#[derive(Clone, Debug, Default)]
pub struct TriageBuckets<'a> {
    pub needs_review: Vec<&'a Patient>,
    pub scheduled: Vec<&'a Patient>,
    pub rejected: Vec<&'a Patient>,
}

impl<'a> TriageBuckets<'a> {
    pub fn get(&self, bucket: Bucket) -> &[&'a Patient] {
        match bucket {
            Bucket::NeedsReview => &self.needs_review,
            Bucket::Scheduled => &self.scheduled,
            Bucket::Rejected => &self.rejected,
        }
    }

    pub fn len(&self) -> usize {
        self.needs_review.len() + self.scheduled.len() + self.rejected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Partition `patients` into buckets and order each one.
pub fn classify<'a, I>(patients: I) -> TriageBuckets<'a>
where
    I: IntoIterator<Item = &'a Patient>,
{
    let mut buckets = TriageBuckets::default();

    for patient in patients {
        match bucket_of(patient) {
            Some(Bucket::NeedsReview) => buckets.needs_review.push(patient),
            Some(Bucket::Scheduled) => buckets.scheduled.push(patient),
            Some(Bucket::Rejected) => buckets.rejected.push(patient),
            None => {}
        }
    }

    buckets.needs_review.sort_by(|a, b| by_priority_desc(a, b));
    buckets.scheduled.sort_by(|a, b| by_scheduled_asc(a, b));
    buckets.rejected.sort_by(|a, b| by_reviewed_desc(a, b));

    buckets
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patient::tests::patient;
    use triage_types::Timestamp;

    fn with_flags(id: &str, needs_review: bool, is_candidate: bool) -> Patient {
        let mut p = patient(id);
        p.needs_review = needs_review;
        p.is_candidate = is_candidate;
        p
    }

    fn ids(list: &[&Patient]) -> Vec<String> {
        list.iter().map(|p| p.id.clone()).collect()
    }

    #[test]
    fn needs_review_is_ordered_by_priority_descending() {
        let mut low = with_flags("low", true, true);
        low.priority_score = 40.0;
        let mut high = with_flags("high", true, true);
        high.priority_score = 80.0;

        let patients = vec![low, high];
        let buckets = classify(&patients);
        let scores: Vec<f64> = buckets
            .needs_review
            .iter()
            .map(|p| p.priority_score)
            .collect();
        assert_eq!(scores, vec![80.0, 40.0]);
    }

    #[test]
    fn priority_ties_keep_original_order() {
        let mut patients = Vec::new();
        for (id, score) in [("a", 50.0), ("b", 70.0), ("c", 50.0), ("d", 50.0)] {
            let mut p = with_flags(id, true, true);
            p.priority_score = score;
            patients.push(p);
        }
        let buckets = classify(&patients);
        assert_eq!(ids(&buckets.needs_review), vec!["b", "a", "c", "d"]);
        assert!(buckets
            .needs_review
            .windows(2)
            .all(|w| w[0].priority_score >= w[1].priority_score));
    }

    #[test]
    fn each_patient_lands_in_exactly_one_bucket() {
        let patients = vec![
            with_flags("pending", true, true),
            with_flags("accepted", false, true),
            with_flags("rejected", false, false),
            with_flags("pending-non-candidate", true, false),
        ];
        let buckets = classify(&patients);

        assert_eq!(ids(&buckets.needs_review), vec!["pending"]);
        assert_eq!(ids(&buckets.scheduled), vec!["accepted"]);
        assert_eq!(ids(&buckets.rejected), vec!["rejected"]);
        assert_eq!(buckets.len(), 3);

        for p in &patients {
            let appearances = [Bucket::NeedsReview, Bucket::Scheduled, Bucket::Rejected]
                .iter()
                .filter(|b| buckets.get(**b).iter().any(|q| q.id == p.id))
                .count();
            let expected = usize::from(bucket_of(p).is_some());
            assert_eq!(appearances, expected, "patient {}", p.id);
        }

        // Every candidate is covered.
        for p in patients.iter().filter(|p| p.is_candidate) {
            assert!(bucket_of(p).is_some());
        }
    }

    #[test]
    fn unscheduled_patients_sort_last_without_panicking() {
        let mut later = with_flags("later", false, true);
        later.scheduled_date = Some(Timestamp::parse("2024-05-02T09:00:00Z"));
        let unscheduled = with_flags("unscheduled", false, true);
        let mut garbage = with_flags("garbage", false, true);
        garbage.scheduled_date = Some(Timestamp::parse("TBD"));
        let mut sooner = with_flags("sooner", false, true);
        sooner.scheduled_date = Some(Timestamp::parse("2024-05-01T09:00:00Z"));

        let patients = vec![unscheduled, later, garbage, sooner];
        let buckets = classify(&patients);
        assert_eq!(
            ids(&buckets.scheduled),
            vec!["sooner", "later", "unscheduled", "garbage"]
        );
    }

    #[test]
    fn rejected_are_latest_review_first_with_missing_dates_last() {
        let mut old = with_flags("old", false, false);
        old.reviewed_at = Some(Timestamp::parse("2024-01-01T00:00:00Z"));
        let missing = with_flags("missing", false, false);
        let mut new = with_flags("new", false, false);
        new.reviewed_at = Some(Timestamp::parse("2024-03-01T00:00:00Z"));
        let mut invalid = with_flags("invalid", false, false);
        invalid.reviewed_at = Some(Timestamp::parse("yesterday-ish"));

        let patients = vec![missing, old, invalid, new];
        let buckets = classify(&patients);
        assert_eq!(
            ids(&buckets.rejected),
            vec!["new", "old", "missing", "invalid"]
        );
    }
}
