//! Building, signing, broadcasting, and confirming a funding transfer.
//!
//! # Steps
//! 1. Pending nonce of the faucet
//! 2. Fee estimate (must be > 0), floored at the policy minimum
//! 3. Unsigned transfer with an empty payload
//! 4. Signature scoped to the network id reported by the endpoint
//! 5. Broadcast
//! 6. Confirmation wait
//!
//! Nothing is created on the chain before step 5 succeeds. Callers must not run
//! two executions for the same faucet concurrently; the watcher guarantees this by
//! awaiting each funding before its next poll.

use tokio::time::Instant;

use crate::blockchain::client::ChainClient;
use crate::blockchain::types::{Amount, TxId, UnsignedTransfer};
use crate::blockchain::wallet::TransferSigner;
use crate::funding::confirmation::wait_for_confirmation;
use crate::funding::types::{FundingError, FundingPolicy};
use crate::observability::metrics;

/// Executes funding transfers under a policy's fee floor and confirmation limits.
#[derive(Debug, Clone)]
pub struct FundingExecutor {
    policy: FundingPolicy,
    chain: String,
}

impl FundingExecutor {
    pub fn new(chain: impl Into<String>, policy: FundingPolicy) -> Self {
        Self {
            policy,
            chain: chain.into(),
        }
    }

    /// Send `amount` from the faucet to `recipient` and wait for confirmation.
    pub async fn fund(
        &self,
        client: &dyn ChainClient,
        signer: &dyn TransferSigner,
        recipient: &str,
        amount: Amount,
    ) -> Result<TxId, FundingError> {
        let nonce = client
            .get_pending_nonce(signer.address())
            .await
            .map_err(FundingError::NonceUnavailable)?;

        let estimate = client.suggest_fee().await.map_err(FundingError::FeeUnavailable)?;
        if estimate.is_zero() {
            return Err(FundingError::InvalidFee(estimate));
        }
        let fee = self.policy.effective_fee(estimate);

        let network = client
            .network_id()
            .await
            .map_err(FundingError::NetworkUnavailable)?;

        let transfer = UnsignedTransfer {
            nonce,
            recipient: recipient.to_string(),
            amount,
            fee,
            payload: Vec::new(),
        };
        let pending = signer
            .sign_transfer(transfer, &network)
            .map_err(FundingError::Signing)?;

        tracing::info!(
            chain = %self.chain,
            from = %signer.address(),
            to = %recipient,
            nonce = nonce,
            fee = %fee,
            amount = %signer.family().format_amount(amount),
            tx_id = %pending.id,
            endpoint = %client.endpoint(),
            "Broadcasting funding transaction"
        );

        let tx_id = client.submit(&pending).await.map_err(FundingError::Submission)?;
        if tx_id != pending.id {
            tracing::warn!(
                chain = %self.chain,
                local_id = %pending.id,
                node_id = %tx_id,
                "Node reported a different transaction id"
            );
        }

        let started = Instant::now();
        let block_number = wait_for_confirmation(
            client,
            &tx_id,
            self.policy.confirmation_timeout,
            self.policy.confirmation_poll_interval,
        )
        .await?;
        metrics::record_confirmation_time(&self.chain, started.elapsed());

        tracing::info!(
            chain = %self.chain,
            tx_id = %tx_id,
            block_number = ?block_number,
            "Funding transaction confirmed"
        );
        Ok(tx_id)
    }
}
