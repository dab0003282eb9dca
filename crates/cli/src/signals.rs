use tracing::warn;

/// Resolves with the name of the first termination signal received.
pub async fn wait_for_termination() -> String {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut terminate) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => "SIGINT".to_string(),
                    _ = terminate.recv() => "SIGTERM".to_string(),
                }
            }
            Err(e) => {
                warn!(error = %e, "SIGTERM handler unavailable, waiting for SIGINT only");
                ctrl_c().await
            }
        }
    }

    #[cfg(not(unix))]
    {
        ctrl_c().await
    }
}

async fn ctrl_c() -> String {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Ctrl-C handler unavailable");
        std::future::pending::<()>().await;
    }
    "SIGINT".to_string()
}
