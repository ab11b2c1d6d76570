//! Signal translation.
//!
//! SIGINT and SIGTERM cancel a [`CancellationToken`]; the supervisor and worker
//! loops watch that token instead of the signals themselves.

use log::{info, warn};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Waits for the first shutdown signal and returns its name.
async fn shutdown_signal() -> std::io::Result<&'static str> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let mut terminate = signal(SignalKind::terminate())?;
        tokio::select! {
            result = tokio::signal::ctrl_c() => result.map(|_| "SIGINT"),
            _ = terminate.recv() => Ok("SIGTERM"),
        }
    }
    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c().await.map(|_| "CTRL+C")
    }
}

/// Spawns a task that cancels `cancel` on SIGINT or SIGTERM.
///
/// The task also ends, without cancelling, when `cancel` fires for another
/// reason.
pub fn cancel_on_signal(cancel: CancellationToken) -> JoinHandle<()> {
    tokio::spawn(async move {
        tokio::select! {
            signal = shutdown_signal() => match signal {
                Ok(name) => {
                    info!("Received {}, shutting down", name);
                    cancel.cancel();
                }
                Err(e) => warn!("Cannot listen for shutdown signals: {}", e),
            },
            _ = cancel.cancelled() => {}
        }
    })
}
