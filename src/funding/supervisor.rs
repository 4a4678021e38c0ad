//! One independent task per watched chain.
//!
//! The supervisor owns the shutdown coordinator. Watchers share nothing but
//! read-only configuration and their cancellation tokens; no results flow back.

use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{timeout_at, Instant};

use crate::blockchain::client::ChainClient;
use crate::blockchain::wallet::TransferSigner;
use crate::funding::types::{ChainTarget, FundingPolicy, SharedPhase, WatcherPhase};
use crate::funding::watcher::ChainWatcher;
use crate::lifecycle::shutdown::Shutdown;

#[derive(Debug)]
struct RunningWatcher {
    chain: String,
    phase: SharedPhase,
    handle: JoinHandle<()>,
}

#[derive(Debug)]
pub struct WatcherSupervisor {
    shutdown: Shutdown,
    handles: Vec<RunningWatcher>,
}

impl WatcherSupervisor {
    pub fn new() -> Self {
        Self {
            shutdown: Shutdown::new(),
            handles: Vec::new(),
        }
    }

    /// Build a watcher for `target` and spawn it on the runtime.
    pub fn spawn(
        &mut self,
        target: ChainTarget,
        policy: FundingPolicy,
        clients: Vec<Arc<dyn ChainClient>>,
        signer: Arc<dyn TransferSigner>,
    ) {
        let chain = target.chain.clone();
        let watcher = ChainWatcher::new(target, policy, clients, signer, self.shutdown.token());
        let phase = watcher.phase_handle();
        let handle = tokio::spawn(watcher.run());
        self.handles.push(RunningWatcher { chain, phase, handle });
    }

    /// Number of spawned watchers.
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Chains being watched, in spawn order.
    pub fn chains(&self) -> impl Iterator<Item = &str> {
        self.handles.iter().map(|w| w.chain.as_str())
    }

    /// Cancel every watcher and wait up to `grace` for them to finish their
    /// current step. Watchers still running at the deadline are aborted,
    /// except those with a funding in flight: those are awaited to completion.
    ///
    /// Returns the number of aborted watchers.
    pub async fn shutdown(self, grace: Duration) -> usize {
        tracing::info!(watchers = self.handles.len(), grace_secs = grace.as_secs(), "Stopping watchers");
        self.shutdown.trigger();

        let deadline = Instant::now() + grace;
        let mut aborted = 0;
        for RunningWatcher { chain, phase, mut handle } in self.handles {
            match timeout_at(deadline, &mut handle).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    tracing::error!(chain = %chain, error = %e, "Watcher task failed");
                }
                // Cancellation was signalled before the deadline, so a watcher
                // seen outside Funding here can no longer enter it.
                Err(_) if phase.get() == WatcherPhase::Funding => {
                    tracing::warn!(chain = %chain, "Grace period elapsed mid-funding, waiting for it to finish");
                    if let Err(e) = handle.await {
                        tracing::error!(chain = %chain, error = %e, "Watcher task failed");
                    }
                }
                Err(_) => {
                    handle.abort();
                    aborted += 1;
                    tracing::warn!(chain = %chain, phase = %phase.get(), "Watcher did not stop within grace period, aborted");
                }
            }
        }
        aborted
    }
}

impl Default for WatcherSupervisor {
    fn default() -> Self {
        Self::new()
    }
}
