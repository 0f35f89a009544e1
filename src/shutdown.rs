use tracing::{error, info};

#[cfg(unix)]
use tokio::signal::unix::{signal, SignalKind};

/// Resolves once the process is asked to stop.
///
/// Handed to `axum::serve(..).with_graceful_shutdown` so in-flight requests
/// finish before the server exits.
pub async fn shutdown_signal() {
    wait_for_signal().await;
    info!("Shutting down");
}

/// Platform-specific signal handling implementation
#[cfg(unix)]
async fn wait_for_signal() {
    // Handle SIGTERM (sent by Kubernetes when pod is terminating)
    let sigterm = signal(SignalKind::terminate());
    // Handle SIGINT (Ctrl+C)
    let sigint = signal(SignalKind::interrupt());

    match (sigterm, sigint) {
        (Ok(mut sigterm), Ok(mut sigint)) => {
            tokio::select! {
                _ = sigterm.recv() => {
                    info!("Received SIGTERM signal, initiating graceful shutdown");
                }
                _ = sigint.recv() => {
                    info!("Received SIGINT signal, initiating graceful shutdown");
                }
            }
        }
        (Err(e), _) | (_, Err(e)) => {
            error!("Failed to install signal handlers: {}", e);
            wait_for_ctrl_c().await;
        }
    }
}

/// Platform-specific signal handling implementation
#[cfg(not(unix))]
async fn wait_for_signal() {
    wait_for_ctrl_c().await;
}

async fn wait_for_ctrl_c() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Received Ctrl+C signal, initiating graceful shutdown"),
        Err(e) => {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    }
}
