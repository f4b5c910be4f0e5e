//! Wire/log records exchanged between the gateway and the transform.
//!
//! Every Query carries a generated correlation id (`queryId`) which the
//! transform echoes into every Answer and AgeUpdateEvent; the gateway
//! matches on that id only. Field names on the wire are camelCase.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One clinician question, appended to queries.jsonl by the gateway.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Query {
    pub query_id: Uuid,
    pub requester_id: String,
    pub patient_id: String,
    pub question_text: String,
}

impl Query {
    /// Build a Query with a fresh correlation id.
    pub fn new(requester_id: &str, patient_id: &str, question_text: &str) -> Self {
        Self {
            query_id: Uuid::new_v4(),
            requester_id: requester_id.to_string(),
            patient_id: patient_id.to_string(),
            question_text: question_text.to_string(),
        }
    }
}

/// One answer row, appended to answers.jsonl by the transform.
///
/// `error` is only present when the transform runs in typed-failure mode;
/// in absorb mode the failure description *is* the answer text.
/// `answered_at` is informational (RFC 3339); readers tolerate rows
/// without it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Answer {
    pub query_id: Uuid,
    pub requester_id: String,
    pub patient_id: String,
    pub question_text: String,
    pub answer_text: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub answered_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// One detected age update, appended to patient_updates.jsonl.
///
/// Advisory only: nothing applies `new_age` back to the patient store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AgeUpdateEvent {
    pub query_id: Uuid,
    pub requester_id: String,
    pub patient_id: String,
    pub question_text: String,
    pub new_age: u32,
}
