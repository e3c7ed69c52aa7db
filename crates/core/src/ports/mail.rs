//! Outgoing document-request email port.

use crate::documents::EmailDraft;
use crate::{TriageError, TriageResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Mutex;
use uuid::Uuid;

/// Proof that a document request left the building.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryReceipt {
    pub id: Uuid,
    /// `email` or the name of the HIE source.
    pub channel: String,
    pub recipient: String,
    pub sent_at: DateTime<Utc>,
}

#[async_trait]
pub trait DocumentMailer: Send + Sync {
    async fn send(&self, draft: &EmailDraft) -> TriageResult<DeliveryReceipt>;
}

/// Mailer fake that keeps every sent draft in memory.
#[derive(Debug, Default)]
pub struct OutboxMailer {
    sent: Mutex<Vec<EmailDraft>>,
    failure: Mutex<Option<String>>,
}

impl OutboxMailer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<EmailDraft> {
        self.sent
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn set_failure(&self, message: Option<&str>) {
        *self
            .failure
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = message.map(str::to_string);
    }
}

#[async_trait]
impl DocumentMailer for OutboxMailer {
    async fn send(&self, draft: &EmailDraft) -> TriageResult<DeliveryReceipt> {
        draft.validate()?;

        if let Some(message) = self
            .failure
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
        {
            return Err(TriageError::Delivery(message));
        }

        self.sent
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(draft.clone());

        tracing::info!(to = %draft.to, subject = %draft.subject, "document request queued");

        Ok(DeliveryReceipt {
            id: Uuid::new_v4(),
            channel: "email".into(),
            recipient: draft.to.clone(),
            sent_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(to: &str) -> EmailDraft {
        let mut draft =
            EmailDraft::for_missing_document("Ada Byron", "MRI", "Dr. Patel", "Corvus Medical Center");
        draft.to = to.into();
        draft
    }

    #[tokio::test]
    async fn sends_and_records_valid_drafts() {
        let mailer = OutboxMailer::new();
        let receipt = mailer
            .send(&draft("records@clinic.example"))
            .await
            .expect("send");

        assert_eq!(receipt.channel, "email");
        assert_eq!(receipt.recipient, "records@clinic.example");
        assert_eq!(mailer.sent().len(), 1);
    }

    #[tokio::test]
    async fn rejects_drafts_without_recipient() {
        let mailer = OutboxMailer::new();
        let err = mailer.send(&draft("")).await.expect_err("no recipient");
        assert!(matches!(err, TriageError::InvalidInput(_)));
        assert!(mailer.sent().is_empty());
    }

    #[tokio::test]
    async fn injected_failure_is_a_delivery_error() {
        let mailer = OutboxMailer::new();
        mailer.set_failure(Some("smtp down"));
        let err = mailer
            .send(&draft("records@clinic.example"))
            .await
            .expect_err("should fail");
        assert!(matches!(err, TriageError::Delivery(msg) if msg == "smtp down"));
    }
}
