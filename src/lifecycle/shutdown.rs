//! Shutdown coordination for the watchers.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;
use tokio::time::{sleep_until, Instant};

/// Coordinator for graceful shutdown.
///
/// Sets a shared flag (read with acquire ordering by every token) and wakes all
/// sleeping tokens through a broadcast channel.
#[derive(Debug)]
pub struct Shutdown {
    tx: broadcast::Sender<()>,
    flag: Arc<AtomicBool>,
}

impl Shutdown {
    /// Create a new shutdown coordinator.
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self {
            tx,
            flag: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Hand out a cancellation token for one watcher.
    pub fn token(&self) -> ShutdownToken {
        ShutdownToken {
            flag: self.flag.clone(),
            rx: self.tx.subscribe(),
        }
    }

    /// Trigger the shutdown signal.
    pub fn trigger(&self) {
        self.flag.store(true, Ordering::Release);
        let _ = self.tx.send(());
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

/// Cooperative cancellation handle owned by a watcher.
pub struct ShutdownToken {
    flag: Arc<AtomicBool>,
    rx: broadcast::Receiver<()>,
}

impl ShutdownToken {
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }

    /// Sleep for `duration`, waking early on shutdown.
    ///
    /// Returns `true` if the full duration elapsed and no shutdown was requested.
    pub async fn sleep(&mut self, duration: Duration) -> bool {
        if self.is_cancelled() {
            return false;
        }
        let deadline = Instant::now() + duration;

        tokio::select! {
            _ = sleep_until(deadline) => {}
            res = self.rx.recv() => {
                if matches!(res, Err(RecvError::Closed)) {
                    // Coordinator dropped: nobody can cancel any more.
                    sleep_until(deadline).await;
                }
            }
        }

        !self.is_cancelled()
    }
}

impl Clone for ShutdownToken {
    fn clone(&self) -> Self {
        Self {
            flag: self.flag.clone(),
            rx: self.rx.resubscribe(),
        }
    }
}

impl std::fmt::Debug for ShutdownToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShutdownToken")
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}
