pub mod answering;
pub mod api;
pub mod config;
pub mod detect;
pub mod llm;
pub mod logs;
pub mod models;
pub mod store;
pub mod transform;
pub mod webhook;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use crate::llm::OllamaClient;
use crate::store::PatientStore;
use crate::transform::Transform;
use crate::webhook::WebhookNotifier;

/// Initialize tracing, load the patient store, start the streaming
/// transform and the gateway, and run until Ctrl-C.
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Arc::new(config::Config::from_env());
    tracing::info!(
        "{} starting v{}, data dir {}",
        config::APP_NAME,
        config::APP_VERSION,
        config.data_dir.display()
    );

    let store = Arc::new(PatientStore::load(&config.patients_path)?);
    let llm = Arc::new(OllamaClient::new(&config.ollama_url, 300));
    llm::warn_if_model_missing(&*llm, &config.model);
    let webhook = WebhookNotifier::new(config.webhook_url.clone());

    let transform = Transform::new(&config, store, llm, webhook).spawn();
    let mut gateway = api::server::start_gateway(Arc::clone(&config)).await?;

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutting down");
    gateway.shutdown();
    transform.shutdown();
    Ok(())
}
