//! Streaming transform: the independent worker that turns query rows into
//! answer rows (and age-update events).
//!
//! Runs on a dedicated OS thread with its own read cursor over the
//! queries log and its own write cursors over each output log; it shares
//! no in-memory state with the gateway. The cursor starts at offset zero,
//! so a restart replays the whole input log — at-least-once delivery,
//! duplicate answer rows are expected and tolerated downstream.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use crate::answering::{answer_patient_query, AnswerOutcome};
use crate::config::{Config, FailureMode};
use crate::detect::detect_age_update;
use crate::llm::LlmClient;
use crate::logs;
use crate::models::{AgeUpdateEvent, Answer, Query};
use crate::store::PatientStore;
use crate::webhook::WebhookNotifier;

pub struct Transform {
    queries_path: PathBuf,
    answers_path: PathBuf,
    updates_path: PathBuf,
    model: String,
    poll_interval: Duration,
    failure_mode: FailureMode,
    store: Arc<PatientStore>,
    llm: Arc<dyn LlmClient>,
    webhook: WebhookNotifier,
}

impl Transform {
    pub fn new(
        config: &Config,
        store: Arc<PatientStore>,
        llm: Arc<dyn LlmClient>,
        webhook: WebhookNotifier,
    ) -> Self {
        Self {
            queries_path: config.queries_path(),
            answers_path: config.answers_path(),
            updates_path: config.updates_path(),
            model: config.model.clone(),
            poll_interval: config.poll_interval,
            failure_mode: config.failure_mode,
            store,
            llm,
            webhook,
        }
    }

    /// Spawn the transform on its own thread. The returned handle stops
    /// it cooperatively: the stop flag is checked between idle cycles.
    pub fn spawn(self) -> TransformHandle {
        let stop = Arc::new(AtomicBool::new(false));
        let stop_flag = Arc::clone(&stop);
        let handle = std::thread::Builder::new()
            .name("streaming-transform".into())
            .spawn(move || self.run(stop_flag))
            .expect("Failed to spawn transform thread");
        TransformHandle {
            stop,
            handle: Some(handle),
        }
    }

    fn run(self, stop: Arc<AtomicBool>) {
        tracing::info!(
            queries = %self.queries_path.display(),
            "Streaming transform started"
        );
        let mut cursor = 0u64;

        while !stop.load(Ordering::Relaxed) {
            match self.drain_available(&mut cursor) {
                Ok(0) => std::thread::sleep(self.poll_interval),
                Ok(n) => tracing::debug!(rows = n, "Processed query rows"),
                Err(e) => {
                    tracing::error!(error = %e, "Failed to read queries log");
                    std::thread::sleep(self.poll_interval);
                }
            }
        }
        tracing::info!("Streaming transform stopped");
    }

    /// Process every complete query row currently visible past the cursor.
    /// Returns the number of rows consumed (including skipped ones).
    pub fn drain_available(&self, cursor: &mut u64) -> Result<usize, logs::LogError> {
        let (lines, next) = logs::read_new_lines(&self.queries_path, *cursor)?;
        for line in &lines {
            self.process_line(line);
        }
        *cursor = next;
        Ok(lines.len())
    }

    /// Transform one input row: always an answer, independently an
    /// age-update event when the heuristic fires. A malformed line is
    /// skipped with a warning — never fatal.
    fn process_line(&self, line: &str) {
        let query: Query = match serde_json::from_str(line) {
            Ok(q) => q,
            Err(e) => {
                tracing::warn!(error = %e, "Skipping malformed query row");
                return;
            }
        };

        let outcome = answer_patient_query(
            &self.store,
            self.llm.as_ref(),
            &self.model,
            &query.patient_id,
            &query.question_text,
        );

        let answer = self.build_answer(&query, outcome);
        if let Err(e) = logs::append_record(&self.answers_path, &answer) {
            tracing::error!(query_id = %query.query_id, error = %e, "Failed to append answer row");
            return;
        }

        // Advisory side effect, strictly after the durable write.
        self.webhook.notify(&answer);

        if let Some(new_age) = detect_age_update(&query.question_text) {
            let event = AgeUpdateEvent {
                query_id: query.query_id,
                requester_id: query.requester_id.clone(),
                patient_id: query.patient_id.clone(),
                question_text: query.question_text.clone(),
                new_age,
            };
            if let Err(e) = logs::append_record(&self.updates_path, &event) {
                tracing::error!(query_id = %query.query_id, error = %e, "Failed to append age-update row");
            }
        }
    }

    fn build_answer(&self, query: &Query, outcome: AnswerOutcome) -> Answer {
        let (answer_text, error) = match (&outcome, self.failure_mode) {
            (AnswerOutcome::Answered(text), _) => (text.clone(), None),
            (AnswerOutcome::LlmFailed(text), FailureMode::Absorb) => (text.clone(), None),
            (AnswerOutcome::LlmFailed(text), FailureMode::Typed) => {
                (String::new(), Some(text.clone()))
            }
        };

        Answer {
            query_id: query.query_id,
            requester_id: query.requester_id.clone(),
            patient_id: query.patient_id.clone(),
            question_text: query.question_text.clone(),
            answer_text,
            answered_at: chrono::Utc::now().to_rfc3339(),
            error,
        }
    }
}

/// Handle to a running transform thread.
pub struct TransformHandle {
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl TransformHandle {
    /// Signal the thread and wait for it to finish its current cycle.
    pub fn shutdown(mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for TransformHandle {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
    }
}
