//! Funding engine types.

use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::blockchain::types::{Amount, ChainError, ChainFamily, TxId};
use crate::config::schema::PolicyConfig;

/// One watched chain. Immutable after startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainTarget {
    /// Chain name from configuration, e.g. `ganache1`.
    pub chain: String,
    /// RPC endpoints in priority order.
    pub endpoints: Vec<String>,
    /// Vault address whose balance is kept topped up.
    pub watched_address: String,
    pub family: ChainFamily,
}

/// When and how much to fund. One per chain family.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FundingPolicy {
    /// Balances strictly below this trigger funding.
    pub threshold: Amount,
    /// Amount sent by each funding transaction.
    pub top_up_amount: Amount,
    /// Floor applied to the node's fee estimate.
    pub min_fee: Amount,
    pub poll_interval: Duration,
    pub confirmation_timeout: Duration,
    pub confirmation_poll_interval: Duration,
}

impl FundingPolicy {
    pub fn needs_funding(&self, balance: Amount) -> bool {
        balance < self.threshold
    }

    /// Fee to use given the node's estimate.
    pub fn effective_fee(&self, estimate: Amount) -> Amount {
        estimate.max(self.min_fee)
    }
}

impl From<&PolicyConfig> for FundingPolicy {
    fn from(config: &PolicyConfig) -> Self {
        Self {
            threshold: config.threshold,
            top_up_amount: config.top_up_amount,
            min_fee: config.min_fee,
            poll_interval: Duration::from_secs(config.poll_interval_secs),
            confirmation_timeout: Duration::from_secs(config.confirmation_timeout_secs),
            confirmation_poll_interval: Duration::from_secs(config.confirmation_poll_interval_secs),
        }
    }
}

/// Watcher lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatcherPhase {
    Idle,
    Polling,
    Funding,
    Stopped,
}

impl fmt::Display for WatcherPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WatcherPhase::Idle => "idle",
            WatcherPhase::Polling => "polling",
            WatcherPhase::Funding => "funding",
            WatcherPhase::Stopped => "stopped",
        };
        f.write_str(name)
    }
}

impl WatcherPhase {
    fn from_u8(value: u8) -> Self {
        match value {
            1 => WatcherPhase::Polling,
            2 => WatcherPhase::Funding,
            3 => WatcherPhase::Stopped,
            _ => WatcherPhase::Idle,
        }
    }
}

/// A watcher's phase, readable from outside its task.
#[derive(Debug, Clone)]
pub struct SharedPhase(Arc<AtomicU8>);

impl SharedPhase {
    pub fn new() -> Self {
        Self(Arc::new(AtomicU8::new(WatcherPhase::Idle as u8)))
    }

    pub fn set(&self, phase: WatcherPhase) {
        self.0.store(phase as u8, Ordering::Release);
    }

    pub fn get(&self) -> WatcherPhase {
        WatcherPhase::from_u8(self.0.load(Ordering::Acquire))
    }
}

impl Default for SharedPhase {
    fn default() -> Self {
        Self::new()
    }
}

/// What a single poll iteration did.
#[derive(Debug)]
pub enum PollOutcome {
    /// No endpoint answered the balance query; no decision was made.
    Unreachable,
    /// Balance at or above threshold.
    Sufficient { balance: Amount },
    /// Funding transaction confirmed.
    Funded { balance: Amount, tx_id: TxId },
    /// Funding attempted and failed; retried on the next cycle.
    FundingFailed { balance: Amount, error: FundingError },
    /// Cancellation observed before funding started.
    Cancelled,
}

/// Reasons a funding attempt fails.
#[derive(Debug, Error)]
pub enum FundingError {
    #[error("nonce unavailable: {0}")]
    NonceUnavailable(#[source] ChainError),

    #[error("fee estimate unavailable: {0}")]
    FeeUnavailable(#[source] ChainError),

    #[error("invalid fee {0}")]
    InvalidFee(Amount),

    #[error("network id unavailable: {0}")]
    NetworkUnavailable(#[source] ChainError),

    #[error("signing failed: {0}")]
    Signing(#[source] ChainError),

    #[error("submission failed: {0}")]
    Submission(#[source] ChainError),

    /// The transaction may still confirm later; inspect it out of band.
    #[error("transaction {tx_id} not confirmed within {timeout_secs} seconds")]
    ConfirmationTimeout { tx_id: TxId, timeout_secs: u64 },

    #[error("confirmation of {tx_id} failed: {source}")]
    ConfirmationFailed {
        tx_id: TxId,
        #[source]
        source: ChainError,
    },
}

impl FundingError {
    /// Id of the broadcast transaction, if the attempt got that far.
    pub fn tx_id(&self) -> Option<&TxId> {
        match self {
            FundingError::ConfirmationTimeout { tx_id, .. }
            | FundingError::ConfirmationFailed { tx_id, .. } => Some(tx_id),
            _ => None,
        }
    }

    /// Metric label for this failure class.
    pub fn label(&self) -> &'static str {
        match self {
            FundingError::NonceUnavailable(_) => "nonce_unavailable",
            FundingError::FeeUnavailable(_) => "fee_unavailable",
            FundingError::InvalidFee(_) => "invalid_fee",
            FundingError::NetworkUnavailable(_) => "network_unavailable",
            FundingError::Signing(_) => "signing_failed",
            FundingError::Submission(_) => "submission_failed",
            FundingError::ConfirmationTimeout { .. } => "confirmation_timeout",
            FundingError::ConfirmationFailed { .. } => "confirmation_failed",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> FundingPolicy {
        FundingPolicy {
            threshold: Amount::from(1000u64),
            top_up_amount: Amount::from(5000u64),
            min_fee: Amount::from(10u64),
            poll_interval: Duration::from_secs(30),
            confirmation_timeout: Duration::from_secs(120),
            confirmation_poll_interval: Duration::from_secs(3),
        }
    }

    #[test]
    fn test_threshold_is_strict() {
        let policy = policy();
        assert!(policy.needs_funding(Amount::from(999u64)));
        assert!(!policy.needs_funding(Amount::from(1000u64)));
        assert!(!policy.needs_funding(Amount::from(1001u64)));
    }

    #[test]
    fn test_effective_fee_floor() {
        let policy = policy();
        assert_eq!(policy.effective_fee(Amount::from(3u64)), Amount::from(10u64));
        assert_eq!(policy.effective_fee(Amount::from(30u64)), Amount::from(30u64));
    }

    #[test]
    fn test_shared_phase_visible_to_clones() {
        let phase = SharedPhase::new();
        let observer = phase.clone();
        assert_eq!(observer.get(), WatcherPhase::Idle);

        for next in [WatcherPhase::Polling, WatcherPhase::Funding, WatcherPhase::Stopped] {
            phase.set(next);
            assert_eq!(observer.get(), next);
        }
    }

    #[test]
    fn test_error_tx_id() {
        let err = FundingError::ConfirmationTimeout {
            tx_id: TxId("0xabc".to_string()),
            timeout_secs: 120,
        };
        assert_eq!(err.tx_id().map(|id| id.0.as_str()), Some("0xabc"));
        assert_eq!(err.label(), "confirmation_timeout");
        assert!(err.to_string().contains("120 seconds"));

        let err = FundingError::InvalidFee(Amount::ZERO);
        assert!(err.tx_id().is_none());
        assert_eq!(err.to_string(), "invalid fee 0");
    }
}
