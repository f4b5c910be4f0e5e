//! LLM capability boundary.
//!
//! The rest of the system only sees the `LlmClient` trait; the production
//! implementation talks to a local Ollama instance over HTTP. Calls are
//! treated as remote and fallible with no retry — failures are absorbed
//! into the answer channel by the answering function, never propagated as
//! protocol faults.

use std::sync::Mutex;

use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("Cannot reach LLM endpoint at {0}")]
    Connection(String),
    #[error("LLM request failed: {0}")]
    HttpClient(String),
    #[error("LLM endpoint returned HTTP {status}: {body}")]
    Api { status: u16, body: String },
    #[error("Failed to parse LLM response: {0}")]
    ResponseParsing(String),
}

/// Opaque text-generation capability: `generate(prompt) -> text`, may fail.
pub trait LlmClient: Send + Sync {
    fn generate(&self, model: &str, prompt: &str) -> Result<String, LlmError>;
    fn is_model_available(&self, model: &str) -> Result<bool, LlmError>;
    fn list_models(&self) -> Result<Vec<String>, LlmError>;
}

/// Startup probe: warn when the configured model is not present on the
/// endpoint. Advisory only — the pipeline starts regardless, and every
/// generate call still fails independently.
///
/// Returns whether the model was confirmed available.
pub fn warn_if_model_missing(llm: &dyn LlmClient, model: &str) -> bool {
    match llm.is_model_available(model) {
        Ok(true) => true,
        Ok(false) => {
            tracing::warn!(model, "Configured model not found on the LLM endpoint");
            false
        }
        Err(e) => {
            tracing::warn!(model, error = %e, "Could not check model availability");
            false
        }
    }
}

/// Ollama HTTP client for local LLM inference.
///
/// Blocking on purpose: the only caller is the streaming transform, which
/// runs on its own dedicated thread.
pub struct OllamaClient {
    base_url: String,
    client: reqwest::blocking::Client,
    timeout_secs: u64,
}

impl OllamaClient {
    /// Create a new OllamaClient pointing at an Ollama instance.
    pub fn new(base_url: &str, timeout_secs: u64) -> Self {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            timeout_secs,
        }
    }

    /// Default local instance with a 5-minute timeout.
    pub fn default_local() -> Self {
        Self::new(crate::config::DEFAULT_OLLAMA_URL, 300)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

/// Request body for Ollama /api/generate
#[derive(Serialize)]
struct OllamaGenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

/// Response body from Ollama /api/generate
#[derive(Deserialize)]
struct OllamaGenerateResponse {
    response: String,
}

/// Response body from Ollama /api/tags
#[derive(Deserialize)]
struct OllamaTagsResponse {
    models: Vec<OllamaModel>,
}

#[derive(Deserialize)]
struct OllamaModel {
    name: String,
}

impl LlmClient for OllamaClient {
    fn generate(&self, model: &str, prompt: &str) -> Result<String, LlmError> {
        let url = format!("{}/api/generate", self.base_url);
        let body = OllamaGenerateRequest {
            model,
            prompt,
            stream: false,
        };

        let response = self.client.post(&url).json(&body).send().map_err(|e| {
            if e.is_connect() {
                LlmError::Connection(self.base_url.clone())
            } else if e.is_timeout() {
                LlmError::HttpClient(format!(
                    "Request timed out after {}s",
                    self.timeout_secs
                ))
            } else {
                LlmError::HttpClient(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(LlmError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: OllamaGenerateResponse = response
            .json()
            .map_err(|e| LlmError::ResponseParsing(e.to_string()))?;

        Ok(parsed.response)
    }

    fn is_model_available(&self, model: &str) -> Result<bool, LlmError> {
        let models = self.list_models()?;
        Ok(models.iter().any(|m| m.starts_with(model)))
    }

    fn list_models(&self) -> Result<Vec<String>, LlmError> {
        let url = format!("{}/api/tags", self.base_url);

        let response = self.client.get(&url).send().map_err(|e| {
            if e.is_connect() {
                LlmError::Connection(self.base_url.clone())
            } else {
                LlmError::HttpClient(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(LlmError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: OllamaTagsResponse = response
            .json()
            .map_err(|e| LlmError::ResponseParsing(e.to_string()))?;

        Ok(parsed.models.into_iter().map(|m| m.name).collect())
    }
}

/// Mock LLM client for testing — configurable response or failure,
/// records every prompt it receives.
pub struct MockLlmClient {
    behavior: MockBehavior,
    prompts: Mutex<Vec<String>>,
}

enum MockBehavior {
    Respond(String),
    Fail(String),
}

impl MockLlmClient {
    pub fn new(response: &str) -> Self {
        Self {
            behavior: MockBehavior::Respond(response.to_string()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// A client whose every call fails with the given message.
    pub fn failing(message: &str) -> Self {
        Self {
            behavior: MockBehavior::Fail(message.to_string()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Prompts seen so far, in call order.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().map(|p| p.clone()).unwrap_or_default()
    }
}

impl LlmClient for MockLlmClient {
    fn generate(&self, _model: &str, prompt: &str) -> Result<String, LlmError> {
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt.to_string());
        }
        match &self.behavior {
            MockBehavior::Respond(text) => Ok(text.clone()),
            MockBehavior::Fail(message) => Err(LlmError::HttpClient(message.clone())),
        }
    }

    fn is_model_available(&self, model: &str) -> Result<bool, LlmError> {
        Ok(self.list_models()?.iter().any(|m| m.starts_with(model)))
    }

    fn list_models(&self) -> Result<Vec<String>, LlmError> {
        match &self.behavior {
            MockBehavior::Respond(_) => Ok(vec!["medgemma:4b".to_string()]),
            MockBehavior::Fail(message) => Err(LlmError::HttpClient(message.clone())),
        }
    }
}
