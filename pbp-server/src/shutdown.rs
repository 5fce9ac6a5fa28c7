//! Shutdown: waiting for a termination signal, then winding pollers down.

use pbp_core::processors::ActivationService;
use std::time::Duration;
use tokio::signal::unix::{SignalKind, signal};

/// Completes on SIGTERM or SIGINT (Ctrl+C).
pub async fn shutdown_signal() {
    let mut sigterm = signal(SignalKind::terminate()).expect("failed to install SIGTERM handler");
    let mut sigint = signal(SignalKind::interrupt()).expect("failed to install SIGINT handler");

    tokio::select! {
        _ = sigterm.recv() => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
        _ = sigint.recv() => {
            tracing::info!("Received SIGINT, initiating graceful shutdown");
        }
    }
}

/// Tell every poller to stop and wait up to `grace` for their tasks to
/// finish.
///
/// Returns the number of pollers still running when the wait ended.
pub async fn drain_pollers(activation: &ActivationService, grace: Duration) -> usize {
    activation.shutdown();

    let remaining = activation.join_pollers(grace).await;
    if remaining > 0 {
        tracing::warn!(remaining, "Pollers still running after shutdown grace period");
    } else {
        tracing::info!("All pollers stopped");
    }
    remaining
}
