//! Gateway server lifecycle: bind → spawn background task → return a
//! handle with a shutdown channel.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::sync::oneshot;

use crate::api::router::gateway_router;
use crate::config::Config;

/// Handle to a running gateway server.
pub struct GatewayServer {
    pub addr: SocketAddr,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl GatewayServer {
    /// Shut down the server gracefully. Idempotent.
    pub fn shutdown(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
            tracing::info!("Gateway shutdown signal sent");
        }
    }
}

/// Start the gateway on the configured bind address.
pub async fn start_gateway(config: Arc<Config>) -> Result<GatewayServer, String> {
    let addr: SocketAddr = config
        .bind_addr
        .parse()
        .map_err(|e| format!("Invalid bind address {}: {e}", config.bind_addr))?;
    start_gateway_on(config, addr).await
}

/// Start the gateway on a specific address.
///
/// Factored out from `start_gateway` so tests can bind an ephemeral port
/// (`127.0.0.1:0`).
pub async fn start_gateway_on(
    config: Arc<Config>,
    addr: SocketAddr,
) -> Result<GatewayServer, String> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| format!("Failed to bind gateway: {e}"))?;

    let addr = listener
        .local_addr()
        .map_err(|e| format!("Failed to get server address: {e}"))?;

    let app = gateway_router(config);
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

    tokio::spawn(async move {
        let shutdown_signal = async move {
            let _ = shutdown_rx.await;
            tracing::info!("Gateway received shutdown signal");
        };

        tracing::info!(%addr, "Gateway started");

        if let Err(e) = axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal)
            .await
        {
            tracing::error!("Gateway server error: {e}");
        }

        tracing::info!("Gateway stopped");
    });

    Ok(GatewayServer {
        addr,
        shutdown_tx: Some(shutdown_tx),
    })
}
