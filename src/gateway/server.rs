//! HTTP server entry point.

use tokio::net::TcpListener;

use crate::config::Config;
use crate::error::{GatewayError, Result};
use crate::gateway::router::gateway_router;
use crate::gateway::state::GatewayState;

/// Bind the configured address and serve until Ctrl-C
pub async fn serve(config: &Config, state: GatewayState) -> Result<()> {
    let addr = config.server.socket_addr()?;
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| GatewayError::Config(format!("failed to bind to {addr}: {e}")))?;

    log::info!("Prompt gateway listening on {}", addr);

    axum::serve(listener, gateway_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    log::info!("Prompt gateway stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    log::info!("Shutdown signal received");
}
