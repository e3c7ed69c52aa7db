//! Document request drafts.
//!
//! When a required document is missing, staff can email the referring
//! provider. The draft is pre-filled and editable before sending.

use crate::{TriageError, TriageResult};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailDraft {
    pub to: String,
    pub subject: String,
    pub body: String,
}

impl EmailDraft {
    /// Pre-filled request for `document_type`, addressed to `referring_provider`
    /// and signed by `organisation`. The recipient address starts empty.
    pub fn for_missing_document(
        patient_name: &str,
        document_type: &str,
        referring_provider: &str,
        organisation: &str,
    ) -> Self {
        let subject = format!("Request for {document_type} - Patient: {patient_name}");
        let body = format!(
            "Dear {referring_provider},\n\
             \n\
             We are requesting {document_type} for patient {patient_name}. \
             This document is required for their upcoming surgical evaluation.\n\
             \n\
             Could you please send this document at your earliest convenience? \
             If you have any questions, please don't hesitate to reach out.\n\
             \n\
             Thank you for your assistance.\n\
             \n\
             Best regards,\n\
             {organisation}"
        );

        Self {
            to: String::new(),
            subject,
            body,
        }
    }

    /// Check the draft is sendable.
    ///
    /// # Errors
    ///
    /// Returns `TriageError::InvalidInput` if the recipient is not an email
    /// address or the subject is blank.
    pub fn validate(&self) -> TriageResult<()> {
        let to = self.to.trim();
        let Some((local, domain)) = to.split_once('@') else {
            return Err(TriageError::InvalidInput(
                "recipient must be an email address".into(),
            ));
        };
        if local.is_empty() || domain.is_empty() || to.contains(char::is_whitespace) {
            return Err(TriageError::InvalidInput(format!(
                "recipient is not a valid email address: {to}"
            )));
        }
        if self.subject.trim().is_empty() {
            return Err(TriageError::InvalidInput("subject cannot be empty".into()));
        }
        Ok(())
    }
}
