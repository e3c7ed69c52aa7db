//! Chat assistant port.
//!
//! The assistant answers a free-text question about one patient with one of
//! three outcomes: a stat found in the case file, a suggestion to request
//! the data from the patient, or a refusal.

use crate::patient::Patient;
use crate::TriageResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChatResponse {
    #[serde(rename = "STAT_RESPONSE", rename_all = "camelCase")]
    Stat { stat_value: String },
    #[serde(rename = "REQUEST_RESPONSE")]
    Request,
    #[serde(rename = "NO_RESPONSE")]
    Rejected,
}

impl ChatResponse {
    /// Text shown to staff for this outcome.
    pub fn message(&self) -> String {
        match self {
            Self::Stat { stat_value } => format!(
                "I found the stat you requested in the patient's case file: {stat_value}"
            ),
            Self::Request => "We'll need to reach out to the patient to request that data. \
                Would you like to initiate the request now?"
                .to_string(),
            Self::Rejected => {
                "I'm afraid I can't help with that. Please ask something else.".to_string()
            }
        }
    }
}

#[async_trait]
pub trait ChatAssistant: Send + Sync {
    async fn complete(&self, chat: &str, patient: &Patient) -> TriageResult<ChatResponse>;
}

/// Deterministic assistant keyed on words in the question.
///
/// - mentions of haemoglobin (`"hemo"`) look the value up in the patient's
///   surgery requirements, falling back to a data request when absent
/// - mentions of diet always become a data request
/// - anything else is rejected
#[derive(Clone, Debug, Default)]
pub struct KeywordChatAssistant;

impl KeywordChatAssistant {
    pub fn new() -> Self {
        Self
    }

    fn answer(chat: &str, patient: &Patient) -> ChatResponse {
        let chat = chat.to_lowercase();

        if chat.contains("hemo") {
            return patient
                .surgery_requirements
                .iter()
                .find(|r| r.name.to_lowercase().contains("hemo"))
                .map(|r| ChatResponse::Stat {
                    stat_value: format!("{}: {}", r.name, r.current_value),
                })
                .unwrap_or(ChatResponse::Request);
        }

        if chat.contains("diet") {
            return ChatResponse::Request;
        }

        ChatResponse::Rejected
    }
}

#[async_trait]
impl ChatAssistant for KeywordChatAssistant {
    async fn complete(&self, chat: &str, patient: &Patient) -> TriageResult<ChatResponse> {
        let response = Self::answer(chat, patient);
        tracing::debug!(patient_id = %patient.id, ?response, "keyword assistant answered");
        Ok(response)
    }
}
