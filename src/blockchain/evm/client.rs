//! JSON-RPC client for EVM chains.

use alloy::primitives::{Address, TxHash, U256};
use alloy::providers::{Provider, ProviderBuilder};
use async_trait::async_trait;
use std::future::IntoFuture;
use std::sync::Arc;
use std::time::Duration;

use crate::blockchain::client::{rpc_call, ChainClient};
use crate::blockchain::types::{
    Amount, ChainError, ChainFamily, ChainResult, NetworkId, PendingTransaction, TxId, TxLookup,
};

/// Single-endpoint EVM client backed by an alloy HTTP provider.
#[derive(Clone)]
pub struct EvmClient {
    provider: Arc<dyn Provider + Send + Sync>,
    url: String,
    timeout_duration: Duration,
}

impl EvmClient {
    /// Create a client for `url`. No request is made until the first call.
    pub fn new(url: &str, timeout_duration: Duration) -> ChainResult<Self> {
        let parsed: url::Url = url
            .parse()
            .map_err(|e| ChainError::Rpc(format!("Invalid RPC URL '{}': {}", url, e)))?;
        let provider = Arc::new(ProviderBuilder::new().connect_http(parsed))
            as Arc<dyn Provider + Send + Sync>;

        tracing::debug!(rpc_url = %url, "EVM client created");

        Ok(Self {
            provider,
            url: url.to_string(),
            timeout_duration,
        })
    }

    fn parse_address(address: &str) -> ChainResult<Address> {
        address.parse().map_err(|e| ChainError::InvalidAddress {
            address: address.to_string(),
            reason: format!("{}", e),
        })
    }
}

#[async_trait]
impl ChainClient for EvmClient {
    fn endpoint(&self) -> &str {
        &self.url
    }

    fn family(&self) -> ChainFamily {
        ChainFamily::Evm
    }

    async fn get_balance(&self, address: &str) -> ChainResult<Amount> {
        let address = Self::parse_address(address)?;
        rpc_call(self.timeout_duration, self.provider.get_balance(address).into_future()).await
    }

    async fn get_pending_nonce(&self, address: &str) -> ChainResult<u64> {
        let address = Self::parse_address(address)?;
        rpc_call(
            self.timeout_duration,
            self.provider.get_transaction_count(address).pending().into_future(),
        )
        .await
    }

    async fn suggest_fee(&self) -> ChainResult<Amount> {
        let gas_price = rpc_call(self.timeout_duration, self.provider.get_gas_price()).await?;
        Ok(U256::from(gas_price))
    }

    async fn network_id(&self) -> ChainResult<NetworkId> {
        let chain_id = rpc_call(self.timeout_duration, self.provider.get_chain_id()).await?;
        Ok(NetworkId::ChainId(chain_id))
    }

    async fn submit(&self, tx: &PendingTransaction) -> ChainResult<TxId> {
        let pending = rpc_call(
            self.timeout_duration,
            self.provider.send_raw_transaction(&tx.raw),
        )
        .await?;
        Ok(TxId(pending.tx_hash().to_string()))
    }

    async fn get_transaction(&self, id: &TxId) -> ChainResult<TxLookup> {
        let hash: TxHash = id
            .0
            .parse()
            .map_err(|e| ChainError::Decode(format!("Invalid transaction hash '{}': {}", id, e)))?;
        let tx = rpc_call(
            self.timeout_duration,
            self.provider.get_transaction_by_hash(hash).into_future(),
        )
        .await?;

        Ok(match tx {
            None => TxLookup::NotFound,
            Some(tx) if tx.block_number.is_none() => TxLookup::Pending,
            Some(tx) => TxLookup::Confirmed {
                block_number: tx.block_number,
            },
        })
    }
}

impl std::fmt::Debug for EvmClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EvmClient")
            .field("rpc_url", &self.url)
            .field("timeout_secs", &self.timeout_duration.as_secs())
            .finish()
    }
}
