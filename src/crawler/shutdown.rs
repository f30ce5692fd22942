//! Interrupt handling
//!
//! The crawl is never cancelled mid-fetch. Instead the pipeline checks the
//! shutdown flag between requests and wakes early from politeness delays,
//! then writes an interrupted checkpoint and stops.

use std::sync::Arc;
use tokio::sync::watch;

/// Cloneable shutdown flag shared by the pipeline and the signal listener
#[derive(Debug, Clone)]
pub struct Shutdown {
    sender: Arc<watch::Sender<bool>>,
    receiver: watch::Receiver<bool>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (sender, receiver) = watch::channel(false);
        Self {
            sender: Arc::new(sender),
            receiver,
        }
    }

    /// Requests shutdown; idempotent
    pub fn trigger(&self) {
        self.sender.send_replace(true);
    }

    pub fn is_triggered(&self) -> bool {
        *self.receiver.borrow()
    }

    /// Resolves once shutdown has been requested
    pub async fn triggered(&self) {
        let mut receiver = self.receiver.clone();
        while !*receiver.borrow_and_update() {
            if receiver.changed().await.is_err() {
                // Sender lives in `self`, so this only happens during teardown.
                std::future::pending::<()>().await;
            }
        }
    }

    /// Spawns a task that triggers shutdown on Ctrl-C
    pub fn listen_for_ctrl_c(&self) -> tokio::task::JoinHandle<()> {
        let shutdown = self.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("Received interrupt, stopping after the current request");
                shutdown.trigger();
            }
        })
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}
