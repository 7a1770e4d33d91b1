use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{
    domain::{Role, SessionId},
    error::ServiceError,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExchangeRequest {
    pub message: String,
    pub session_id: Option<SessionId>,
    pub role: Option<Role>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExchangeResponse {
    #[serde(default)]
    pub session_id: Option<SessionId>,
    pub response: AssistantReply,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssistantReply {
    #[serde(rename = "type", default)]
    pub kind: ReplyKind,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<ReplyMetadata>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplyKind {
    InterviewerQuestion,
    FollowupQuestion,
    FinalSummary,
    #[default]
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplyMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportRequest {
    pub session_id: SessionId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportResponse {
    #[serde(default)]
    pub session_id: Option<SessionId>,
    pub report: Report,
}

/// Report bodies either carry a report or an in-band `{"error": ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ReportEnvelope {
    Ready(ReportResponse),
    Failed(ServiceError),
}

/// Server-computed evaluation of a whole session. Only `final_summary` is
/// required; everything else is passed through to the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub final_summary: FinalSummary,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub scores: BTreeMap<String, f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overall_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub per_question: Vec<QuestionEvaluation>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalSummary {
    pub overall_score: f64,
    pub averages: BTreeMap<String, f64>,
    pub top_strengths: Vec<String>,
    pub top_weaknesses: Vec<String>,
    pub top_suggestions: Vec<String>,
}

impl FinalSummary {
    /// Overall score as shown to the candidate, on a ten point scale.
    pub fn overall_display(&self) -> String {
        format!("{:.2} / 10", self.overall_score)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionEvaluation {
    pub question: String,
    #[serde(default)]
    pub answer: String,
    #[serde(default)]
    pub evaluation: serde_json::Value,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exchange_request_serializes_null_session_before_first_reply() {
        let request = ExchangeRequest {
            message: "Hello".into(),
            session_id: None,
            role: Some(Role::HrInterview),
        };
        let value = serde_json::to_value(&request).expect("serialize");
        assert_eq!(
            value,
            serde_json::json!({"message": "Hello", "session_id": null, "role": "hr_interview"})
        );
    }

    #[test]
    fn exchange_response_tolerates_unknown_reply_type() {
        let response: ExchangeResponse = serde_json::from_value(serde_json::json!({
            "session_id": "ab12cd34",
            "response": {"type": "small_talk", "message": "hi"}
        }))
        .expect("decode");
        assert_eq!(response.response.kind, ReplyKind::Other);
        assert_eq!(response.session_id, Some(SessionId("ab12cd34".into())));
    }

    #[test]
    fn report_envelope_distinguishes_in_band_errors() {
        let failed: ReportEnvelope =
            serde_json::from_value(serde_json::json!({"error": "session_id is required"}))
                .expect("decode");
        assert_eq!(
            failed,
            ReportEnvelope::Failed(ServiceError::new("session_id is required"))
        );

        let ready: ReportEnvelope = serde_json::from_value(serde_json::json!({
            "session_id": "s1",
            "report": {
                "final_summary": {
                    "overall_score": 7.5,
                    "averages": {"technical": 7.5, "communication": 7.0},
                    "top_strengths": ["clear"],
                    "top_weaknesses": [],
                    "top_suggestions": ["add examples"]
                }
            }
        }))
        .expect("decode");
        let ReportEnvelope::Ready(response) = ready else {
            panic!("expected report");
        };
        assert_eq!(
            response.report.final_summary.overall_display(),
            "7.50 / 10"
        );
    }
}
