//! Shared types for the gateway: request/response bodies and the
//! router-wide context.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::Config;

/// Shared context for all gateway routes. The gateway holds no patient
/// data and no transform state — only the configuration locating the
/// shared logs and the polling parameters.
#[derive(Clone)]
pub struct ApiContext {
    pub config: Arc<Config>,
}

impl ApiContext {
    pub fn new(config: Arc<Config>) -> Self {
        Self { config }
    }
}

/// Body of `POST /ask` and `POST /update-age`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AskRequest {
    pub requester_id: String,
    pub patient_id: String,
    pub question_text: String,
}

/// `200` body of `POST /ask`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AskResponse {
    pub query_id: Uuid,
    pub requester_id: String,
    pub patient_id: String,
    pub question_text: String,
    pub answer_text: String,
}

/// `200` body of `POST /update-age`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgeUpdateResponse {
    pub query_id: Uuid,
    pub requester_id: String,
    pub patient_id: String,
    pub question_text: String,
    pub status: String,
    pub new_age: u32,
    pub message: String,
}

/// `200` body of `GET /health`.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}
