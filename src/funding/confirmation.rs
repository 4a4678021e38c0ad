//! Waiting for a broadcast transaction to leave the pool.
//!
//! # States
//! ```text
//! NotFound / Pending → sleep poll interval (clamped to the deadline) → look up again
//! Confirmed          → success
//! still pending at the deadline lookup → ConfirmationTimeout (tx id kept for out-of-band inspection)
//! lookup error       → ConfirmationFailed immediately, no retry
//! ```
//!
//! A freshly submitted transaction may not have propagated to the polled node
//! yet, so "not found" counts as still pending.

use std::time::Duration;
use tokio::time::{sleep_until, Instant};

use crate::blockchain::client::ChainClient;
use crate::blockchain::types::{TxId, TxLookup};
use crate::funding::types::FundingError;

/// Poll `client` for `tx_id` until it is confirmed or `timeout` elapses.
///
/// Returns the block number when the node reports one.
pub async fn wait_for_confirmation(
    client: &dyn ChainClient,
    tx_id: &TxId,
    timeout: Duration,
    poll_interval: Duration,
) -> Result<Option<u64>, FundingError> {
    let deadline = Instant::now() + timeout;

    loop {
        match client.get_transaction(tx_id).await {
            Ok(TxLookup::Confirmed { block_number }) => return Ok(block_number),
            Ok(TxLookup::Pending) | Ok(TxLookup::NotFound) => {
                tracing::debug!(tx_id = %tx_id, endpoint = %client.endpoint(), "Transaction pending");
            }
            Err(source) => {
                return Err(FundingError::ConfirmationFailed {
                    tx_id: tx_id.clone(),
                    source,
                });
            }
        }

        let now = Instant::now();
        if now >= deadline {
            return Err(FundingError::ConfirmationTimeout {
                tx_id: tx_id.clone(),
                timeout_secs: timeout.as_secs(),
            });
        }
        // The last lookup lands on the deadline itself.
        sleep_until((now + poll_interval).min(deadline)).await;
    }
}
