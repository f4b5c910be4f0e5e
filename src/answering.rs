//! Answering function: patient lookup + bounded prompt + LLM call.
//!
//! Failures never leave this module as errors. A lookup miss is a *data*
//! answer; an LLM failure or empty response is reported as an
//! `AnswerOutcome::LlmFailed` whose text the transform either embeds in
//! the answer (absorb mode) or promotes to the row's `error` field
//! (typed mode).

use crate::llm::LlmClient;
use crate::store::PatientStore;

/// Result of answering one question. Both variants are successes as far
/// as the correlation protocol is concerned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnswerOutcome {
    Answered(String),
    LlmFailed(String),
}

/// Fixed data answer for an unresolved patient id.
pub fn no_patient_message(patient_id: &str) -> String {
    format!("No patient found for patient_id={patient_id}")
}

/// Answer one clinician question about one patient.
///
/// The caller is responsible for rejecting empty questions before this
/// point (the gateway does, with a 400).
pub fn answer_patient_query(
    store: &PatientStore,
    llm: &dyn LlmClient,
    model: &str,
    patient_id: &str,
    question: &str,
) -> AnswerOutcome {
    let patient = match store.lookup(patient_id) {
        Some(p) => p,
        None => return AnswerOutcome::Answered(no_patient_message(patient_id)),
    };

    let patient_json = match patient.to_compact_json() {
        Ok(json) => json,
        Err(e) => return AnswerOutcome::LlmFailed(format!("Error calling LLM: {e}")),
    };

    let prompt = build_prompt(&patient_json, question);

    match llm.generate(model, &prompt) {
        Ok(text) => {
            let text = text.trim();
            if text.is_empty() {
                AnswerOutcome::LlmFailed("LLM returned an empty response.".to_string())
            } else {
                AnswerOutcome::Answered(text.to_string())
            }
        }
        Err(e) => AnswerOutcome::LlmFailed(format!("Error calling LLM: {e}")),
    }
}

/// Bounded prompt: structured patient data plus the question, with an
/// instruction to answer only from the supplied data.
fn build_prompt(patient_json: &str, question: &str) -> String {
    format!(
        "\
You are a clinical assistant. You will be given structured patient data in JSON
and a clinician's question. Use ONLY the provided data. If something is not in
the data, say you don't know.

PATIENT_DATA (JSON):
{patient_json}

QUESTION:
{question}

Respond in 3-5 sentences, clear and concise, using clinical but simple language.
"
    )
}
