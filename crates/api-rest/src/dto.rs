//! Request and response bodies specific to the REST surface.
//!
//! Domain payloads (dashboard view, patient detail, receipts) are serialised
//! straight from `triage-core`; only the thin wrappers live here.

use serde::{Deserialize, Serialize};
use triage_core::filter::FilterCriteria;
use triage_core::ports::ChatResponse;
use triage_core::{Selection, TriageResult};
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthRes {
    pub ok: bool,
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorRes {
    pub message: String,
}

/// Dashboard filters. Missing values and `"all"` mean no restriction.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct DashboardQuery {
    /// `all`, `needs-review` or `reviewed`
    pub review_status: Option<String>,
    pub surgery_type: Option<String>,
    pub provider: Option<String>,
    /// Case-insensitive match on name or surgery type
    pub search: Option<String>,
}

impl DashboardQuery {
    pub fn criteria(&self) -> TriageResult<FilterCriteria> {
        Ok(FilterCriteria {
            review_status: self.review_status.as_deref().unwrap_or_default().parse()?,
            surgery_type: Selection::from_param(self.surgery_type.as_deref()),
            provider: Selection::from_param(self.provider.as_deref()),
        })
    }

    pub fn search(&self) -> &str {
        self.search.as_deref().unwrap_or_default()
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct StatusReq {
    /// `reviewed` or `needs-review`
    pub status: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct StatusRes {
    pub id: String,
    pub status: String,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct EmailDraftQuery {
    pub document_type: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SendEmailReq {
    pub to: String,
    pub subject: String,
    pub body: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HieRequestReq {
    pub source_id: String,
    pub document_type: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleReq {
    pub slot_id: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ChatReq {
    pub chat: String,
}

/// Assistant answer with the text to show staff.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChatRes {
    /// `STAT_RESPONSE`, `REQUEST_RESPONSE` or `NO_RESPONSE`
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stat_value: Option<String>,
    pub message: String,
}

impl From<ChatResponse> for ChatRes {
    fn from(response: ChatResponse) -> Self {
        let message = response.message();
        let (kind, stat_value) = match response {
            ChatResponse::Stat { stat_value } => ("STAT_RESPONSE", Some(stat_value)),
            ChatResponse::Request => ("REQUEST_RESPONSE", None),
            ChatResponse::Rejected => ("NO_RESPONSE", None),
        };

        Self {
            kind: kind.into(),
            stat_value,
            message,
        }
    }
}
