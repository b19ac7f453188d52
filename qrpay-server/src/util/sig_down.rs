//! Graceful shutdown on OS signals.
//!
//! [`SigDown`] listens for SIGTERM/SIGINT (Ctrl-C on Windows) in a tracked
//! background task and cancels a [`CancellationToken`] when one arrives. The
//! HTTP server stops accepting connections on cancellation; in-flight job
//! tasks are dropped with the runtime since jobs are not persisted.

#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

/// Shutdown signal listener.
#[allow(missing_debug_implementations)] // TaskTracker doesn't impl Debug
pub struct SigDown {
    task_tracker: TaskTracker,
    cancellation_token: CancellationToken,
}

impl SigDown {
    /// Installs the signal handlers.
    ///
    /// # Errors
    ///
    /// Returns an [`std::io::Error`] if signal registration fails.
    #[allow(clippy::unnecessary_wraps)] // Result needed on Unix for signal registration
    pub fn try_new() -> Result<Self, std::io::Error> {
        let token = CancellationToken::new();
        let trigger = token.clone();
        let task_tracker = TaskTracker::new();

        #[cfg(unix)]
        {
            let mut sigterm = signal(SignalKind::terminate())?;
            let mut sigint = signal(SignalKind::interrupt())?;
            task_tracker.spawn(async move {
                let name = tokio::select! {
                    _ = sigterm.recv() => "SIGTERM",
                    _ = sigint.recv() => "SIGINT",
                };
                tracing::info!(signal = name, "Shutdown signal received");
                trigger.cancel();
            });
        }

        #[cfg(windows)]
        {
            task_tracker.spawn(async move {
                let _ = tokio::signal::ctrl_c().await;
                tracing::info!(signal = "Ctrl-C", "Shutdown signal received");
                trigger.cancel();
            });
        }

        task_tracker.close();
        Ok(Self {
            task_tracker,
            cancellation_token: token,
        })
    }

    /// Returns a token that is cancelled when a shutdown signal arrives.
    #[must_use]
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancellation_token.clone()
    }

    /// Resolves once a signal has been received and its handler has finished.
    ///
    /// Suitable as the future passed to `axum::serve(..).with_graceful_shutdown`.
    pub async fn recv(self) {
        self.cancellation_token.cancelled().await;
        self.task_tracker.wait().await;
    }
}
