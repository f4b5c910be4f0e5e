//! Gateway router and handlers.
//!
//! `POST /ask` and `POST /update-age` implement submit-then-poll: append
//! the Query to the input log, then poll the relevant output log from a
//! high-water mark until the row bearing the request's correlation id
//! appears, or the configured timeout elapses (504). The handlers never
//! touch patient data or the LLM — the streaming transform owns both.

use std::sync::Arc;

use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::api::correlate;
use crate::api::error::ApiError;
use crate::api::types::{
    AgeUpdateResponse, ApiContext, AskRequest, AskResponse, HealthResponse,
};
use crate::config::Config;
use crate::logs;
use crate::models::Query;

/// Build the gateway router.
pub fn gateway_router(config: Arc<Config>) -> Router {
    let ctx = ApiContext::new(config);
    Router::new()
        .route("/ask", post(ask))
        .route("/update-age", post(update_age))
        .route("/health", get(health))
        .with_state(ctx)
}

/// Validate the request body and append a fresh Query to the input log.
///
/// The high-water mark on `output_log` is recorded *before* the append,
/// so a transform that answers faster than we return cannot slip a row
/// past the mark.
fn submit(
    ctx: &ApiContext,
    req: &AskRequest,
    output_log: &std::path::Path,
) -> Result<(Query, u64), ApiError> {
    if req.question_text.trim().is_empty() {
        return Err(ApiError::BadRequest("question cannot be empty".into()));
    }

    let query = Query::new(&req.requester_id, &req.patient_id, &req.question_text);
    let mark = logs::end_offset(output_log)?;
    logs::append_record(&ctx.config.queries_path(), &query)?;

    tracing::info!(
        query_id = %query.query_id,
        patient_id = %query.patient_id,
        "Query submitted"
    );
    Ok((query, mark))
}

/// `POST /ask` — submit a question, block until its answer row appears.
async fn ask(
    State(ctx): State<ApiContext>,
    Json(req): Json<AskRequest>,
) -> Result<Json<AskResponse>, ApiError> {
    let answers_path = ctx.config.answers_path();
    let (query, mark) = submit(&ctx, &req, &answers_path)?;

    let answer = correlate::wait_for_answer(
        &answers_path,
        mark,
        query.query_id,
        ctx.config.answer_timeout,
        ctx.config.poll_interval,
    )
    .await?
    .ok_or_else(|| {
        ApiError::GatewayTimeout(
            "Timed out waiting for answer from the streaming transform.".into(),
        )
    })?;

    if let Some(error) = answer.error {
        return Err(ApiError::Upstream(error));
    }

    Ok(Json(AskResponse {
        query_id: answer.query_id,
        requester_id: answer.requester_id,
        patient_id: answer.patient_id,
        question_text: answer.question_text,
        answer_text: answer.answer_text,
    }))
}

/// `POST /update-age` — same protocol against the patient-updates log.
///
/// Confirms detection only; nothing is applied to the patient store.
async fn update_age(
    State(ctx): State<ApiContext>,
    Json(req): Json<AskRequest>,
) -> Result<Json<AgeUpdateResponse>, ApiError> {
    let updates_path = ctx.config.updates_path();
    let (query, mark) = submit(&ctx, &req, &updates_path)?;

    let event = correlate::wait_for_update(
        &updates_path,
        mark,
        query.query_id,
        ctx.config.answer_timeout,
        ctx.config.poll_interval,
    )
    .await?
    .ok_or_else(|| {
        ApiError::GatewayTimeout(
            "Timed out waiting for age update event from the streaming transform.".into(),
        )
    })?;

    let message = format!(
        "Patient {} age updated to {}.",
        event.patient_id, event.new_age
    );
    Ok(Json(AgeUpdateResponse {
        query_id: event.query_id,
        requester_id: event.requester_id,
        patient_id: event.patient_id,
        question_text: event.question_text,
        status: "updated".into(),
        new_age: event.new_age,
        message,
    }))
}

/// `GET /health`
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: crate::config::APP_VERSION,
    })
}
