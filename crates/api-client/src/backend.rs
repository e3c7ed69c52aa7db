//! HTTP implementation of [`PatientBackend`].

use crate::http::{api_root, build_client, check_status, endpoint, transport};
use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Serialize;
use std::time::Duration;
use triage_core::ports::PatientBackend;
use triage_core::{Patient, PatientId, ReviewStatus, TriageConfig, TriageResult};

#[derive(Serialize)]
struct StatusUpdate<'a> {
    status: &'a str,
}

/// Patient backend reached over HTTP.
///
/// - `GET {base}/api/patients` returns the full patient list
/// - `POST {base}/api/patients/{id}/status` with `{"status": ...}` records a review decision
#[derive(Clone, Debug)]
pub struct HttpPatientBackend {
    client: Client,
    root: Url,
}

impl HttpPatientBackend {
    /// Create a backend client for `base_url`.
    ///
    /// # Errors
    ///
    /// Returns `TriageError::InvalidInput` if the URL cannot be parsed or the
    /// HTTP client cannot be built.
    pub fn new(base_url: &str, timeout: Duration) -> TriageResult<Self> {
        Ok(Self {
            client: build_client(timeout)?,
            root: api_root(base_url)?,
        })
    }

    pub fn from_config(config: &TriageConfig) -> TriageResult<Self> {
        Self::new(config.backend_base_url(), config.http_timeout())
    }
}

#[async_trait]
impl PatientBackend for HttpPatientBackend {
    async fn fetch_patients(&self) -> TriageResult<Vec<Patient>> {
        let url = endpoint(&self.root, &["patients"])?;
        tracing::debug!(%url, "fetching patients");

        let response = self.client.get(url).send().await.map_err(transport)?;
        let body = check_status(response)
            .await?
            .bytes()
            .await
            .map_err(transport)?;

        Patient::decode_list(&body)
    }

    async fn update_status(&self, id: &PatientId, status: ReviewStatus) -> TriageResult<()> {
        let url = endpoint(&self.root, &["patients", id.as_str(), "status"])?;
        tracing::debug!(%url, %status, "updating patient status");

        let response = self
            .client
            .post(url)
            .json(&StatusUpdate {
                status: status.as_str(),
            })
            .send()
            .await
            .map_err(transport)?;
        check_status(response).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::{Path, State};
    use axum::http::StatusCode;
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use serde_json::{json, Value};
    use std::sync::{Arc, Mutex};
    use triage_core::TriageError;

    type Log = Arc<Mutex<Vec<(String, Value)>>>;

    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind");
        let addr = listener.local_addr().expect("addr");
        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("serve");
        });
        format!("http://{addr}")
    }

    fn backend(base: &str) -> HttpPatientBackend {
        HttpPatientBackend::new(base, Duration::from_secs(5)).expect("backend")
    }

    async fn record_status(
        State(log): State<Log>,
        Path(id): Path<String>,
        Json(body): Json<Value>,
    ) -> (StatusCode, Json<Value>) {
        if id == "locked" {
            return (
                StatusCode::CONFLICT,
                Json(json!({ "message": "record locked" })),
            );
        }
        log.lock().expect("lock").push((id, body));
        (StatusCode::OK, Json(json!({})))
    }

    fn patients_router(log: Log) -> Router {
        Router::new()
            .route(
                "/api/patients",
                get(|| async {
                    Json(json!([
                        { "id": "p1", "name": "Ada", "needsReview": true, "isCandidate": true,
                          "priorityScore": 80 },
                        { "id": "p2", "name": "Ben", "needsReview": false, "isCandidate": false }
                    ]))
                }),
            )
            .route("/api/patients/:id/status", post(record_status))
            .with_state(log)
    }

    #[tokio::test]
    async fn fetches_and_decodes_patients() {
        let base = serve(patients_router(Log::default())).await;

        let patients = backend(&base).fetch_patients().await.expect("fetch");
        assert_eq!(patients.len(), 2);
        assert_eq!(patients[0].name, "Ada");
        assert_eq!(patients[0].priority_score, 80.0);
        assert!(!patients[1].is_candidate);
    }

    #[tokio::test]
    async fn posts_status_updates() {
        let log = Log::default();
        let base = serve(patients_router(log.clone())).await;
        let id = PatientId::new("p1").expect("id");

        backend(&base)
            .update_status(&id, ReviewStatus::NeedsReview)
            .await
            .expect("update");

        let log = log.lock().expect("lock");
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].0, "p1");
        assert_eq!(log[0].1, json!({ "status": "needs-review" }));
    }

    #[tokio::test]
    async fn error_body_message_is_surfaced() {
        let base = serve(patients_router(Log::default())).await;
        let id = PatientId::new("locked").expect("id");

        let err = backend(&base)
            .update_status(&id, ReviewStatus::Reviewed)
            .await
            .expect_err("conflict");
        assert_eq!(err.to_string(), "HTTP error! status: 409, message: record locked");
    }

    #[tokio::test]
    async fn missing_error_body_falls_back_to_unknown() {
        let router = Router::new().route(
            "/api/patients",
            get(|| async { StatusCode::INTERNAL_SERVER_ERROR }),
        );
        let base = serve(router).await;

        let err = backend(&base).fetch_patients().await.expect_err("500");
        assert!(matches!(err, TriageError::Http { status: 500, .. }));
        assert_eq!(err.to_string(), "HTTP error! status: 500, message: Unknown error");
    }

    #[tokio::test]
    async fn malformed_payload_reports_the_path() {
        let router = Router::new().route(
            "/api/patients",
            get(|| async { Json(json!([{ "id": "p1", "age": "old" }])) }),
        );
        let base = serve(router).await;

        let err = backend(&base).fetch_patients().await.expect_err("decode");
        match err {
            TriageError::Decode { path, .. } => assert_eq!(path, "[0].age"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn unreachable_backend_is_a_transport_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind");
        let addr = listener.local_addr().expect("addr");
        drop(listener);

        let err = backend(&format!("http://{addr}"))
            .fetch_patients()
            .await
            .expect_err("refused");
        assert!(matches!(err, TriageError::Transport(_)));
    }
}
