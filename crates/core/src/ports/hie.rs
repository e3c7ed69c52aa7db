//! Health Information Exchange port.
//!
//! An HIE is an external document source that can be asked for a patient's
//! missing document as an alternative to emailing the referring provider.

use super::mail::DeliveryReceipt;
use crate::patient::Patient;
use crate::{TriageError, TriageResult};
use async_trait::async_trait;
use chrono::Utc;
use serde::Serialize;
use uuid::Uuid;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum SourceKind {
    #[serde(rename = "HIE")]
    Hie,
    #[serde(rename = "EHR")]
    Ehr,
    Registry,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HieSource {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: SourceKind,
    pub available: bool,
}

#[async_trait]
pub trait HieGateway: Send + Sync {
    async fn sources(&self) -> TriageResult<Vec<HieSource>>;

    async fn request_document(
        &self,
        source_id: &str,
        patient: &Patient,
        document_type: &str,
    ) -> TriageResult<DeliveryReceipt>;
}

/// Gateway fake backed by a fixed source directory.
#[derive(Clone, Debug)]
pub struct DirectoryHieGateway {
    sources: Vec<HieSource>,
}

impl DirectoryHieGateway {
    pub fn new(sources: Vec<HieSource>) -> Self {
        Self { sources }
    }
}

impl Default for DirectoryHieGateway {
    fn default() -> Self {
        let source = |id: &str, name: &str, kind, available| HieSource {
            id: id.into(),
            name: name.into(),
            kind,
            available,
        };

        Self::new(vec![
            source("1", "CommonWell Health Alliance", SourceKind::Hie, true),
            source("2", "Carequality", SourceKind::Hie, true),
            source("3", "State Health Information Network", SourceKind::Hie, false),
            source("4", "Regional Medical Records", SourceKind::Ehr, true),
            source("5", "National Patient Registry", SourceKind::Registry, true),
        ])
    }
}

#[async_trait]
impl HieGateway for DirectoryHieGateway {
    async fn sources(&self) -> TriageResult<Vec<HieSource>> {
        Ok(self.sources.clone())
    }

    async fn request_document(
        &self,
        source_id: &str,
        patient: &Patient,
        document_type: &str,
    ) -> TriageResult<DeliveryReceipt> {
        if document_type.trim().is_empty() {
            return Err(TriageError::InvalidInput(
                "document type cannot be empty".into(),
            ));
        }

        let source = self
            .sources
            .iter()
            .find(|s| s.id == source_id)
            .ok_or_else(|| TriageError::SourceUnavailable(format!("unknown source {source_id}")))?;

        if !source.available {
            return Err(TriageError::SourceUnavailable(source.name.clone()));
        }

        tracing::info!(
            source = %source.name,
            patient_id = %patient.id,
            document_type,
            "requested document from HIE"
        );

        Ok(DeliveryReceipt {
            id: Uuid::new_v4(),
            channel: source.name.clone(),
            recipient: patient.ehr_id.clone(),
            sent_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patient::tests::patient;

    #[tokio::test]
    async fn default_directory_lists_five_sources() {
        let sources = DirectoryHieGateway::default().sources().await.expect("sources");
        assert_eq!(sources.len(), 5);
        assert_eq!(sources.iter().filter(|s| !s.available).count(), 1);
        assert_eq!(sources[4].kind, SourceKind::Registry);
    }

    #[tokio::test]
    async fn requests_from_available_source() {
        let receipt = DirectoryHieGateway::default()
            .request_document("2", &patient("p-1"), "MRI")
            .await
            .expect("request");
        assert_eq!(receipt.channel, "Carequality");
    }

    #[tokio::test]
    async fn unavailable_and_unknown_sources_fail() {
        let gateway = DirectoryHieGateway::default();
        let p = patient("p-1");

        let err = gateway
            .request_document("3", &p, "MRI")
            .await
            .expect_err("offline source");
        assert!(matches!(err, TriageError::SourceUnavailable(name) if name == "State Health Information Network"));

        assert!(gateway.request_document("99", &p, "MRI").await.is_err());
    }

    #[test]
    fn source_kind_serialises_like_the_directory() {
        let json = serde_json::to_value(SourceKind::Hie).expect("serialise");
        assert_eq!(json, "HIE");
    }
}
