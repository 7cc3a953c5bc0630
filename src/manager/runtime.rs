use super::types::{ShutdownReason, ShutdownReport};
use super::ComponentManager;
use crate::error::Result;
use std::sync::Arc;
use tokio::signal;
use tokio::sync::{oneshot, Mutex};
use tracing::{error, info};

impl ComponentManager {
    /// Wait until SIGINT or SIGTERM arrives, then shut every component down.
    ///
    /// Component shutdown hooks are synchronous and may join threads, so the
    /// sweep runs through `block_in_place`. This needs the multi-threaded
    /// runtime.
    pub async fn run(&self) -> Result<ShutdownReport> {
        info!("Component manager is running");

        let reason = wait_for_shutdown_signal().await;
        info!("Shutdown initiated: {:?}", reason);

        tokio::task::block_in_place(|| self.shutdown())
    }
}

/// Wait for the first termination signal the process receives
pub async fn wait_for_shutdown_signal() -> ShutdownReason {
    let (shutdown_sender, shutdown_receiver) = oneshot::channel();
    let shutdown_sender = Arc::new(Mutex::new(Some(shutdown_sender)));

    // Handle SIGTERM (service manager stop) - Unix only
    #[cfg(unix)]
    {
        let shutdown_sender_sigterm = Arc::clone(&shutdown_sender);
        tokio::spawn(async move {
            let mut sigterm = match signal::unix::signal(signal::unix::SignalKind::terminate()) {
                Ok(sigterm) => sigterm,
                Err(e) => {
                    error!("Failed to register SIGTERM handler: {}", e);
                    return;
                }
            };
            if sigterm.recv().await.is_some() {
                info!("Received SIGTERM signal");
                if let Some(sender) = shutdown_sender_sigterm.lock().await.take() {
                    sender.send(ShutdownReason::Signal("SIGTERM".to_string())).ok();
                }
            }
        });
    }

    // Handle SIGINT (Ctrl+C) - Cross-platform
    let shutdown_sender_sigint = Arc::clone(&shutdown_sender);
    tokio::spawn(async move {
        if let Ok(()) = signal::ctrl_c().await {
            info!("Received SIGINT signal (Ctrl+C)");
            if let Some(sender) = shutdown_sender_sigint.lock().await.take() {
                sender.send(ShutdownReason::Signal("SIGINT".to_string())).ok();
            }
        }
    });

    // The local sender handle keeps the channel open until a signal fires
    shutdown_receiver.await.unwrap_or(ShutdownReason::UserRequest)
}
