//! Per-chain watch-and-fund loop.
//!
//! # State Transitions
//! ```text
//! Idle → Polling: run() starts
//! Polling → Funding: first answering endpoint reports balance < threshold
//! Funding → Polling: executor returns (success or failure)
//! any → Stopped: cancellation observed at the top of an iteration or after a blocking call
//! ```
//!
//! # Design Decisions
//! - Endpoints are tried in configured order every iteration
//! - The endpoint that answered the balance query is the one used for funding
//! - No endpoint answering means no decision, never an assumed zero balance
//! - A failed funding is retried by the next natural poll, not immediately
//! - An in-flight funding is never aborted by cancellation

use std::sync::Arc;

use crate::blockchain::client::ChainClient;
use crate::blockchain::types::Amount;
use crate::blockchain::wallet::TransferSigner;
use crate::funding::executor::FundingExecutor;
use crate::funding::types::{
    ChainTarget, FundingError, FundingPolicy, PollOutcome, SharedPhase, WatcherPhase,
};
use crate::lifecycle::shutdown::ShutdownToken;
use crate::observability::metrics;

/// Mutable state private to one watcher.
#[derive(Debug)]
pub struct WatchState {
    /// Index of the endpoint that answered the last balance query.
    pub current_endpoint: Option<usize>,
    pub phase: WatcherPhase,
    shared: SharedPhase,
    token: ShutdownToken,
}

impl WatchState {
    fn new(token: ShutdownToken) -> Self {
        Self {
            current_endpoint: None,
            phase: WatcherPhase::Idle,
            shared: SharedPhase::new(),
            token,
        }
    }

    fn enter(&mut self, phase: WatcherPhase) {
        self.phase = phase;
        self.shared.set(phase);
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

/// Keeps one chain's vault above its funding threshold.
pub struct ChainWatcher {
    target: ChainTarget,
    policy: FundingPolicy,
    clients: Vec<Arc<dyn ChainClient>>,
    signer: Arc<dyn TransferSigner>,
    executor: FundingExecutor,
    state: WatchState,
}

impl ChainWatcher {
    /// Create a watcher. `clients` must follow the order of `target.endpoints`.
    pub fn new(
        target: ChainTarget,
        policy: FundingPolicy,
        clients: Vec<Arc<dyn ChainClient>>,
        signer: Arc<dyn TransferSigner>,
        token: ShutdownToken,
    ) -> Self {
        let executor = FundingExecutor::new(target.chain.clone(), policy.clone());
        Self {
            target,
            policy,
            clients,
            signer,
            executor,
            state: WatchState::new(token),
        }
    }

    /// Handle the supervisor reads to tell whether a funding is in flight.
    pub fn phase_handle(&self) -> SharedPhase {
        self.state.shared.clone()
    }

    pub fn state(&self) -> &WatchState {
        &self.state
    }

    /// Run the watch loop until shutdown is requested.
    pub async fn run(mut self) {
        tracing::info!(
            chain = %self.target.chain,
            family = %self.target.family,
            watch_address = %self.target.watched_address,
            faucet = %self.signer.address(),
            endpoints = self.clients.len(),
            threshold = %self.target.family.format_amount(self.policy.threshold),
            top_up = %self.target.family.format_amount(self.policy.top_up_amount),
            "Starting watcher"
        );
        self.state.enter(WatcherPhase::Polling);

        loop {
            if self.state.is_cancelled() {
                break;
            }

            self.poll_once().await;

            if self.state.is_cancelled() {
                break;
            }
            if !self.state.token.sleep(self.policy.poll_interval).await {
                break;
            }
        }

        self.state.enter(WatcherPhase::Stopped);
        tracing::info!(chain = %self.target.chain, "Watcher stopped");
    }

    /// One iteration: read the balance and fund if it is below threshold.
    pub async fn poll_once(&mut self) -> PollOutcome {
        let Some((index, balance)) = self.query_balance().await else {
            if self.state.is_cancelled() {
                return PollOutcome::Cancelled;
            }
            tracing::error!(
                chain = %self.target.chain,
                "No RPC endpoint answered the balance query, skipping iteration"
            );
            return PollOutcome::Unreachable;
        };

        metrics::record_balance(&self.target.chain, balance);
        tracing::info!(
            chain = %self.target.chain,
            balance = %self.target.family.format_amount(balance),
            raw_balance = %balance,
            endpoint = %self.clients[index].endpoint(),
            "Vault balance"
        );

        if !self.policy.needs_funding(balance) {
            return PollOutcome::Sufficient { balance };
        }
        if self.state.is_cancelled() {
            return PollOutcome::Cancelled;
        }

        self.fund(index, balance).await
    }

    async fn query_balance(&mut self) -> Option<(usize, Amount)> {
        for (index, client) in self.clients.iter().enumerate() {
            match client.get_balance(&self.target.watched_address).await {
                Ok(balance) => {
                    self.state.current_endpoint = Some(index);
                    return Some((index, balance));
                }
                Err(e) => {
                    metrics::record_rpc_error(&self.target.chain, "get_balance");
                    tracing::warn!(
                        chain = %self.target.chain,
                        endpoint = %client.endpoint(),
                        error = %e,
                        "Failed to get balance, trying next endpoint"
                    );
                }
            }
            if self.state.is_cancelled() {
                return None;
            }
        }
        None
    }

    async fn fund(&mut self, index: usize, balance: Amount) -> PollOutcome {
        self.state.enter(WatcherPhase::Funding);
        tracing::info!(
            chain = %self.target.chain,
            balance = %self.target.family.format_amount(balance),
            threshold = %self.target.family.format_amount(self.policy.threshold),
            "Balance below threshold, funding vault"
        );

        let client = self.clients[index].clone();
        let result = self
            .executor
            .fund(
                client.as_ref(),
                self.signer.as_ref(),
                &self.target.watched_address,
                self.policy.top_up_amount,
            )
            .await;
        self.state.enter(WatcherPhase::Polling);

        match result {
            Ok(tx_id) => {
                metrics::record_funding(&self.target.chain, "confirmed");
                tracing::info!(
                    chain = %self.target.chain,
                    tx_id = %tx_id,
                    amount = %self.target.family.format_amount(self.policy.top_up_amount),
                    "Vault funded"
                );
                PollOutcome::Funded { balance, tx_id }
            }
            Err(error) => {
                metrics::record_funding(&self.target.chain, error.label());
                match &error {
                    FundingError::ConfirmationTimeout { tx_id, .. } => tracing::warn!(
                        chain = %self.target.chain,
                        tx_id = %tx_id,
                        error = %error,
                        "Funding transaction unconfirmed, it may still land; not resending this cycle"
                    ),
                    _ => tracing::error!(
                        chain = %self.target.chain,
                        error = %error,
                        "Funding failed, retrying next cycle"
                    ),
                }
                PollOutcome::FundingFailed { balance, error }
            }
        }
    }
}
