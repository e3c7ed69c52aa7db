//! HTTP implementation of [`ChatAssistant`].

use crate::http::{api_root, build_client, check_status, decode, endpoint, transport};
use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use triage_core::ports::{ChatAssistant, ChatResponse};
use triage_core::{Patient, TriageConfig, TriageResult};

#[derive(Serialize)]
struct ChatRequest<'a> {
    chat: &'a str,
    patient: &'a Patient,
}

#[derive(Deserialize)]
struct ChatEnvelope {
    response: RawChatResponse,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawChatResponse {
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    stat_value: Option<Value>,
}

/// Stat values may arrive as strings, numbers or booleans.
fn stat_text(value: Option<Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(text)) => text,
        Some(other) => other.to_string(),
    }
}

impl From<RawChatResponse> for ChatResponse {
    /// Unrecognised response types are treated as a refusal.
    fn from(raw: RawChatResponse) -> Self {
        match raw.kind.as_str() {
            "STAT_RESPONSE" => ChatResponse::Stat {
                stat_value: stat_text(raw.stat_value),
            },
            "REQUEST_RESPONSE" => ChatResponse::Request,
            _ => ChatResponse::Rejected,
        }
    }
}

/// Chat assistant hosted by the backend at `POST {base}/api/chat-completion`.
#[derive(Clone, Debug)]
pub struct HttpChatAssistant {
    client: Client,
    root: Url,
}

impl HttpChatAssistant {
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
impl ChatAssistant for HttpChatAssistant {
    async fn complete(&self, chat: &str, patient: &Patient) -> TriageResult<ChatResponse> {
        let url = endpoint(&self.root, &["chat-completion"])?;
        tracing::debug!(%url, patient = %patient.id, "requesting chat completion");

        let response = self
            .client
            .post(url)
            .json(&ChatRequest { chat, patient })
            .send()
            .await
            .map_err(transport)?;
        let body = check_status(response)
            .await?
            .bytes()
            .await
            .map_err(transport)?;
        let envelope: ChatEnvelope = decode(&body)?;

        Ok(envelope.response.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::routing::post;
    use axum::{Json, Router};
    use serde_json::json;
    use triage_core::TriageError;

    async fn answer(Json(body): Json<Value>) -> Json<Value> {
        let chat = body["chat"].as_str().unwrap_or_default();
        let name = body["patient"]["name"].as_str().unwrap_or_default();
        let response = match chat {
            "stat" => json!({ "type": "STAT_RESPONSE", "statValue": format!("{name}: 13.5") }),
            "request" => json!({ "type": "REQUEST_RESPONSE" }),
            "odd" => json!({ "type": "SOMETHING_NEW" }),
            "hemo" => json!({ "type": "STAT_RESPONSE", "statValue": 13.5 }),
            "flag" => json!({ "type": "STAT_RESPONSE", "statValue": true }),
            "broken" => return Json(json!({ "response": "not an object" })),
            _ => json!({ "type": "NO_RESPONSE" }),
        };
        Json(json!({ "response": response }))
    }

    async fn assistant() -> HttpChatAssistant {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind");
        let addr = listener.local_addr().expect("addr");
        let router = Router::new().route("/api/chat-completion", post(answer));
        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("serve");
        });
        HttpChatAssistant::new(&format!("http://{addr}"), Duration::from_secs(5))
            .expect("assistant")
    }

    fn patient() -> Patient {
        serde_json::from_value(json!({ "id": "p1", "name": "Ada" })).expect("patient")
    }

    #[tokio::test]
    async fn maps_each_response_type() {
        let assistant = assistant().await;
        let patient = patient();

        assert_eq!(
            assistant.complete("stat", &patient).await.expect("stat"),
            ChatResponse::Stat {
                stat_value: "Ada: 13.5".into()
            }
        );
        assert_eq!(
            assistant.complete("request", &patient).await.expect("request"),
            ChatResponse::Request
        );
        assert_eq!(
            assistant.complete("nope", &patient).await.expect("rejected"),
            ChatResponse::Rejected
        );
    }

    #[tokio::test]
    async fn unknown_type_is_rejected() {
        let assistant = assistant().await;
        let response = assistant.complete("odd", &patient()).await.expect("odd");
        assert_eq!(response, ChatResponse::Rejected);
    }

    #[tokio::test]
    async fn numeric_and_boolean_stats_are_rendered() {
        let assistant = assistant().await;
        let patient = patient();

        assert_eq!(
            assistant.complete("hemo", &patient).await.expect("hemo"),
            ChatResponse::Stat {
                stat_value: "13.5".into()
            }
        );
        assert_eq!(
            assistant.complete("flag", &patient).await.expect("flag"),
            ChatResponse::Stat {
                stat_value: "true".into()
            }
        );
    }

    #[tokio::test]
    async fn malformed_body_is_a_decode_error() {
        let assistant = assistant().await;
        let err = assistant
            .complete("broken", &patient())
            .await
            .expect_err("bad body");

        match err {
            TriageError::Decode { path, .. } => assert_eq!(path, "response"),
            other => panic!("expected decode error, got {other:?}"),
        }
    }
}
