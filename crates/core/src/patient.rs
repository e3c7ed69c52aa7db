//! Patient record wire model.
//!
//! Patient records are owned by the external backend and arrive as JSON with
//! camelCase keys. The dashboard only reads them and requests review status
//! changes; it never constructs or deletes records.
//!
//! Decoding is forgiving about *missing* fields (they default to empty,
//! false or zero) and about malformed dates (see [`Timestamp`]), so one
//! partial record never fails the whole fetch.

use crate::{TriageError, TriageResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use triage_types::{PatientId, Timestamp};

// ============================================================================
// Patient
// ============================================================================

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub age: u32,
    #[serde(default)]
    pub gender: Gender,
    #[serde(default)]
    pub bmi: f64,
    #[serde(default)]
    pub reason: String,
    #[serde(default)]
    pub needs_review: bool,
    /// Stored independently of `surgery_requirements`; never derived from them.
    #[serde(default)]
    pub is_candidate: bool,
    #[serde(default)]
    pub assigned_to: String,
    #[serde(default)]
    pub referring_provider: String,
    #[serde(default)]
    pub referral_notes: String,
    #[serde(default)]
    pub surgery_type: String,
    #[serde(default)]
    pub surgery_requirements: Vec<SurgeryRequirement>,
    #[serde(default)]
    pub medical_history: Vec<String>,
    #[serde(default)]
    pub medications: Vec<String>,
    #[serde(default)]
    pub required_documents: Vec<RequiredDocument>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<Timestamp>,
    #[serde(default)]
    pub notes: Vec<Note>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub consult_date: Option<Timestamp>,
    #[serde(default)]
    pub urgency_level: UrgencyLevel,
    /// Externally computed; only used for ordering.
    #[serde(default)]
    pub priority_score: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reviewed_at: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheduled_date: Option<Timestamp>,
    #[serde(default)]
    pub ehr_id: String,
    #[serde(default)]
    pub referral_type: ReferralType,
}

impl Patient {
    /// Validated id of this record.
    ///
    /// # Errors
    ///
    /// Returns `TriageError::InvalidPatientId` if the backend sent a blank id.
    pub fn patient_id(&self) -> TriageResult<PatientId> {
        Ok(PatientId::new(&self.id)?)
    }

    /// True when every listed surgery requirement is met (vacuously true for none).
    pub fn requirements_met(&self) -> bool {
        self.surgery_requirements.iter().all(|r| r.met)
    }

    /// True when every required document has been received.
    pub fn documents_received(&self) -> bool {
        self.required_documents.iter().all(|d| d.received)
    }

    /// Required documents that have not arrived yet.
    pub fn missing_documents(&self) -> impl Iterator<Item = &RequiredDocument> {
        self.required_documents.iter().filter(|d| !d.received)
    }

    /// Workflow fields that disagree with each other.
    ///
    /// The backend does not enforce these relationships, so the dashboard only
    /// reports them; it never rewrites a record.
    pub fn consistency_issues(&self) -> Vec<ConsistencyIssue> {
        let mut issues = Vec::new();

        match (self.needs_review, self.reviewed_at.is_some()) {
            (true, true) => issues.push(ConsistencyIssue::ReviewedAtWhilePending),
            (false, false) => issues.push(ConsistencyIssue::ReviewedWithoutReviewedAt),
            _ => {}
        }

        if self.scheduled_date.is_some() && (self.needs_review || !self.is_candidate) {
            issues.push(ConsistencyIssue::ScheduledWithoutAcceptance);
        }

        issues
    }

    /// Decode a JSON array of patients, reporting the path of the first bad field.
    ///
    /// # Errors
    ///
    /// Returns `TriageError::Decode` with a path such as `[3].priorityScore`.
    pub fn decode_list(json: &[u8]) -> TriageResult<Vec<Patient>> {
        let mut deserializer = serde_json::Deserializer::from_slice(json);
        serde_path_to_error::deserialize(&mut deserializer).map_err(|err| {
            let path = err.path().to_string();
            let path = if path.is_empty() || path == "." {
                "<root>".to_string()
            } else {
                path
            };
            TriageError::Decode {
                path,
                message: err.into_inner().to_string(),
            }
        })
    }
}

/// A mismatch between workflow fields on one record.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConsistencyIssue {
    ReviewedAtWhilePending,
    ReviewedWithoutReviewedAt,
    ScheduledWithoutAcceptance,
}

impl fmt::Display for ConsistencyIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::ReviewedAtWhilePending => "reviewedAt is set but the patient still needs review",
            Self::ReviewedWithoutReviewedAt => "patient is reviewed but reviewedAt is missing",
            Self::ScheduledWithoutAcceptance => {
                "scheduledDate is set but the patient is not a reviewed candidate"
            }
        };
        f.write_str(text)
    }
}

// ============================================================================
// Nested records
// ============================================================================

/// Current value of a surgery requirement and the value it must reach.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SurgeryRequirement {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "value", default)]
    pub current_value: RequirementValue,
    #[serde(rename = "required", default)]
    pub required_value: RequirementValue,
    #[serde(default)]
    pub met: bool,
}

/// A requirement value as sent by the backend: a number, a string or a boolean.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RequirementValue {
    Flag(bool),
    Number(f64),
    Text(String),
}

impl Default for RequirementValue {
    fn default() -> Self {
        Self::Text(String::new())
    }
}

impl fmt::Display for RequirementValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Flag(value) => write!(f, "{value}"),
            Self::Number(value) if value.fract() == 0.0 && value.is_finite() => {
                write!(f, "{}", *value as i64)
            }
            Self::Number(value) => write!(f, "{value}"),
            Self::Text(value) => f.write_str(value),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequiredDocument {
    #[serde(rename = "type", default)]
    pub document_type: String,
    #[serde(default)]
    pub received: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_received: Option<Timestamp>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Note {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub author: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<Timestamp>,
    #[serde(rename = "type", default)]
    pub category: NoteCategory,
}

// ============================================================================
// Enumerations
// ============================================================================

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    #[default]
    #[serde(other)]
    Unspecified,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoteCategory {
    #[default]
    General,
    Surgical,
    Medical,
    Requirement,
}

/// Informational only; ordering uses `priority_score`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UrgencyLevel {
    #[default]
    Low,
    Medium,
    High,
    Critical,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReferralType {
    #[serde(rename = "self")]
    SelfReferred,
    #[default]
    External,
    Internal,
}

// ============================================================================
// Review status
// ============================================================================

/// Status value sent to the backend when a patient is marked.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReviewStatus {
    Reviewed,
    NeedsReview,
}

impl ReviewStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Reviewed => "reviewed",
            Self::NeedsReview => "needs-review",
        }
    }

    /// The status the detail view's action button would send for `patient`.
    pub fn toggled_for(patient: &Patient) -> Self {
        if patient.needs_review {
            Self::Reviewed
        } else {
            Self::NeedsReview
        }
    }
}

impl fmt::Display for ReviewStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ReviewStatus {
    type Err = TriageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "reviewed" => Ok(Self::Reviewed),
            "needs-review" => Ok(Self::NeedsReview),
            other => Err(TriageError::InvalidInput(format!(
                "unknown review status {other:?} (expected \"reviewed\" or \"needs-review\")"
            ))),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Minimal record used by tests across the crate.
    pub(crate) fn patient(id: &str) -> Patient {
        Patient {
            id: id.into(),
            name: format!("Patient {id}"),
            age: 50,
            gender: Gender::Unspecified,
            bmi: 27.5,
            reason: String::new(),
            needs_review: true,
            is_candidate: true,
            assigned_to: "Dr. Smith".into(),
            referring_provider: "Dr. Referrer".into(),
            referral_notes: String::new(),
            surgery_type: "Knee Replacement".into(),
            surgery_requirements: Vec::new(),
            medical_history: Vec::new(),
            medications: Vec::new(),
            required_documents: Vec::new(),
            last_updated: None,
            notes: Vec::new(),
            consult_date: None,
            urgency_level: UrgencyLevel::Low,
            priority_score: 0.0,
            reviewed_at: None,
            scheduled_date: None,
            ehr_id: String::new(),
            referral_type: ReferralType::External,
        }
    }

    const FULL_RECORD: &str = r#"[{
        "id": "p-100",
        "name": "Maria Lopez",
        "age": 61,
        "gender": "female",
        "bmi": 31.2,
        "reason": "Severe osteoarthritis",
        "needsReview": false,
        "isCandidate": true,
        "assignedTo": "Dr. Smith",
        "referringProvider": "Dr. Patel",
        "referralNotes": "Failed conservative therapy",
        "surgeryType": "Hip Replacement",
        "surgeryRequirements": [
            {"name": "BMI", "value": 31.2, "required": "< 35", "met": true},
            {"name": "Smoking", "value": false, "required": false, "met": true}
        ],
        "medicalHistory": ["Hypertension"],
        "medications": ["Lisinopril"],
        "requiredDocuments": [
            {"type": "X-Ray", "received": true, "url": "https://docs.example/xray", "dateReceived": "2024-02-10"},
            {"type": "Cardiac Clearance", "received": false}
        ],
        "lastUpdated": "2024-02-12T08:00:00Z",
        "notes": [{"id": "n1", "content": "Stable", "author": "RN Kim", "timestamp": "2024-02-11T10:00:00Z", "type": "medical"}],
        "consultDate": "2024-02-01",
        "urgencyLevel": "high",
        "priorityScore": 82,
        "reviewedAt": "2024-02-12T09:00:00Z",
        "scheduledDate": "2024-03-04T09:00:00Z",
        "ehrId": "EHR-1",
        "referralType": "self"
    }]"#;

    #[test]
    fn decodes_full_record() {
        let patients = Patient::decode_list(FULL_RECORD.as_bytes()).expect("decode");
        let p = &patients[0];

        assert_eq!(p.gender, Gender::Female);
        assert_eq!(p.referral_type, ReferralType::SelfReferred);
        assert_eq!(p.urgency_level, UrgencyLevel::High);
        assert_eq!(p.priority_score, 82.0);
        assert_eq!(
            p.surgery_requirements[0].current_value,
            RequirementValue::Number(31.2)
        );
        assert_eq!(
            p.surgery_requirements[0].required_value,
            RequirementValue::Text("< 35".into())
        );
        assert_eq!(p.required_documents[1].document_type, "Cardiac Clearance");
        assert_eq!(p.notes[0].category, NoteCategory::Medical);
        assert!(p.consistency_issues().is_empty());
        assert!(!p.documents_received());
        assert_eq!(p.missing_documents().count(), 1);
    }

    #[test]
    fn odd_date_value_does_not_fail_the_list() {
        let patients =
            Patient::decode_list(br#"[{"id":"good"},{"id":"bad","scheduledDate":false}]"#)
                .expect("decode");

        assert_eq!(patients.len(), 2);
        assert!(patients[0].scheduled_date.is_none());
        let scheduled = patients[1].scheduled_date.as_ref().expect("kept");
        assert!(!scheduled.is_valid());
        assert_eq!(scheduled.format_date(), "Invalid Date");
    }

    #[test]
    fn missing_fields_default() {
        let patients = Patient::decode_list(br#"[{"id": "p-1"}]"#).expect("decode");
        let p = &patients[0];
        assert!(!p.needs_review);
        assert!(!p.is_candidate);
        assert!(p.reviewed_at.is_none());
        assert!(p.requirements_met());
        assert_eq!(p.gender, Gender::Unspecified);
    }

    #[test]
    fn malformed_dates_do_not_fail_decoding() {
        let patients =
            Patient::decode_list(br#"[{"id": "p-1", "scheduledDate": "whenever"}]"#)
                .expect("decode");
        let scheduled = patients[0].scheduled_date.as_ref().expect("kept as invalid");
        assert!(!scheduled.is_valid());
    }

    #[test]
    fn decode_errors_carry_the_field_path() {
        let err = Patient::decode_list(br#"[{"id": "p-1"}, {"id": "p-2", "priorityScore": "high"}]"#)
            .expect_err("wrong type");
        match err {
            TriageError::Decode { path, .. } => assert_eq!(path, "[1].priorityScore"),
            other => panic!("expected Decode error, got {other:?}"),
        }
    }

    #[test]
    fn consistency_issues_are_reported() {
        let mut p = patient("p-1");
        p.needs_review = true;
        p.reviewed_at = Some(Timestamp::parse("2024-01-01"));
        p.scheduled_date = Some(Timestamp::parse("2024-02-01"));

        assert_eq!(
            p.consistency_issues(),
            vec![
                ConsistencyIssue::ReviewedAtWhilePending,
                ConsistencyIssue::ScheduledWithoutAcceptance
            ]
        );

        p.needs_review = false;
        p.reviewed_at = None;
        p.scheduled_date = None;
        assert_eq!(
            p.consistency_issues(),
            vec![ConsistencyIssue::ReviewedWithoutReviewedAt]
        );
    }

    #[test]
    fn review_status_toggles_and_parses() {
        let mut p = patient("p-1");
        assert_eq!(ReviewStatus::toggled_for(&p), ReviewStatus::Reviewed);
        p.needs_review = false;
        assert_eq!(ReviewStatus::toggled_for(&p), ReviewStatus::NeedsReview);

        assert_eq!(
            "needs-review".parse::<ReviewStatus>().expect("parse"),
            ReviewStatus::NeedsReview
        );
        assert!("done".parse::<ReviewStatus>().is_err());
        assert_eq!(
            serde_json::to_string(&ReviewStatus::NeedsReview).expect("serialise"),
            "\"needs-review\""
        );
    }

    #[test]
    fn requirement_values_display_like_the_backend_sent_them() {
        assert_eq!(RequirementValue::Number(40.0).to_string(), "40");
        assert_eq!(RequirementValue::Number(12.5).to_string(), "12.5");
        assert_eq!(RequirementValue::Flag(true).to_string(), "true");
        assert_eq!(RequirementValue::Text("< 35".into()).to_string(), "< 35");
    }
}
