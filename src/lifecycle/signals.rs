//! OS signal handling.

use crate::lifecycle::shutdown::Shutdown;

/// Wait for SIGINT (or SIGTERM on Unix).
pub async fn terminated() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let term = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let term = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = term => {}
    }
}

/// Trigger `shutdown` when the process is asked to terminate.
pub fn spawn_signal_handler(shutdown: Shutdown) {
    tokio::spawn(async move {
        terminated().await;
        tracing::info!("Termination signal received");
        shutdown.trigger();
    });
}
