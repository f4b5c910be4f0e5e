//! Fire-and-forget webhook notification for new answer rows.
//!
//! Strictly advisory: delivery is not retried, not acknowledged, and a
//! failure is only logged. It must never block or fail the log write, so
//! the transform calls this *after* the answer row is durable.

use std::time::Duration;

use crate::models::Answer;

const WEBHOOK_TIMEOUT_SECS: u64 = 5;

pub struct WebhookNotifier {
    url: Option<String>,
    client: reqwest::blocking::Client,
}

impl WebhookNotifier {
    /// `None` disables notification entirely.
    pub fn new(url: Option<String>) -> Self {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(WEBHOOK_TIMEOUT_SECS))
            .build()
            .expect("Failed to create HTTP client");
        Self { url, client }
    }

    pub fn disabled() -> Self {
        Self::new(None)
    }

    /// POST the answer row. Errors are swallowed after logging.
    pub fn notify(&self, answer: &Answer) {
        let Some(url) = &self.url else {
            return;
        };

        match self.client.post(url).json(answer).send() {
            Ok(resp) => {
                tracing::info!(url, status = %resp.status(), "Webhook notified");
            }
            Err(e) => {
                tracing::warn!(url, error = %e, "Webhook delivery failed");
            }
        }
    }
}
