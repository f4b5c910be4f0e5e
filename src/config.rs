use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Application-level constants
pub const APP_NAME: &str = "PHI Drift Monitor";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default wait for a matching answer row before the gateway gives up.
pub const DEFAULT_ANSWER_TIMEOUT_SECS: u64 = 20;
/// Default sleep between poll attempts on the output logs.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 500;
/// Default bind address for the gateway.
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8000";
/// Default local Ollama endpoint.
pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";
/// Default model for answering.
pub const DEFAULT_MODEL: &str = "medgemma:4b";

/// Get the application data directory.
/// ~/PhiDriftMonitor/ on all platforms unless overridden via PHI_DATA_DIR.
pub fn app_data_dir() -> PathBuf {
    if let Ok(dir) = env::var("PHI_DATA_DIR") {
        return PathBuf::from(dir);
    }
    let home = dirs::home_dir().expect("Cannot determine home directory");
    home.join("PhiDriftMonitor")
}

/// How the transform reports LLM failures (see DESIGN.md).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailureMode {
    /// Failure text becomes the answer text (compatible default).
    #[default]
    Absorb,
    /// The answer row carries an `error` field; the gateway returns 502.
    Typed,
}

/// Runtime configuration for the gateway and the streaming transform.
///
/// Built from environment variables with sensible local defaults; both
/// halves of the system read the same log paths so they can also run in
/// separate processes against a shared data directory.
#[derive(Debug, Clone)]
pub struct Config {
    pub data_dir: PathBuf,
    pub patients_path: PathBuf,
    pub bind_addr: String,
    pub answer_timeout: Duration,
    pub poll_interval: Duration,
    pub ollama_url: String,
    pub model: String,
    pub webhook_url: Option<String>,
    pub failure_mode: FailureMode,
}

impl Config {
    /// Load configuration from the environment.
    ///
    /// Recognized variables: PHI_DATA_DIR, PHI_PATIENTS_PATH, PHI_BIND_ADDR,
    /// PHI_ANSWER_TIMEOUT_SECS, PHI_POLL_INTERVAL_MS, PHI_OLLAMA_URL,
    /// PHI_MODEL, PHI_WEBHOOK_URL, PHI_FAILURE_MODE (absorb|typed).
    pub fn from_env() -> Self {
        let data_dir = app_data_dir();
        let patients_path = env::var("PHI_PATIENTS_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| data_dir.join("patients_100.json"));

        let answer_timeout = env::var("PHI_ANSWER_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(DEFAULT_ANSWER_TIMEOUT_SECS));

        let poll_interval = env::var("PHI_POLL_INTERVAL_MS")
            .ok()
            .and_then(|v| v.parse().ok())
            .map(Duration::from_millis)
            .unwrap_or(Duration::from_millis(DEFAULT_POLL_INTERVAL_MS));

        let failure_mode = match env::var("PHI_FAILURE_MODE").as_deref() {
            Ok("typed") => FailureMode::Typed,
            _ => FailureMode::Absorb,
        };

        Self {
            data_dir: data_dir.clone(),
            patients_path,
            bind_addr: env::var("PHI_BIND_ADDR")
                .unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string()),
            answer_timeout,
            poll_interval,
            ollama_url: env::var("PHI_OLLAMA_URL")
                .unwrap_or_else(|_| DEFAULT_OLLAMA_URL.to_string()),
            model: env::var("PHI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string()),
            webhook_url: env::var("PHI_WEBHOOK_URL").ok(),
            failure_mode,
        }
    }

    /// Configuration rooted at an explicit data directory (used by tests).
    pub fn with_data_dir(data_dir: PathBuf) -> Self {
        Self {
            patients_path: data_dir.join("patients_100.json"),
            data_dir,
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            answer_timeout: Duration::from_secs(DEFAULT_ANSWER_TIMEOUT_SECS),
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
            ollama_url: DEFAULT_OLLAMA_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            webhook_url: None,
            failure_mode: FailureMode::Absorb,
        }
    }

    /// Input log: one Query row per clinician question.
    pub fn queries_path(&self) -> PathBuf {
        self.data_dir.join("queries.jsonl")
    }

    /// Output log: one Answer row per processed Query.
    pub fn answers_path(&self) -> PathBuf {
        self.data_dir.join("answers.jsonl")
    }

    /// Output log: one AgeUpdateEvent row per detected age update.
    pub fn updates_path(&self) -> PathBuf {
        self.data_dir.join("patient_updates.jsonl")
    }
}
