//! The RPC surface the funding engine needs from a chain.
//!
//! # Responsibilities
//! - Query chain state (balance, pending nonce, fee estimate, network id)
//! - Submit signed transactions and look them up by id
//! - Bound every request with a timeout so a stuck node never stalls a watcher
//!
//! One client talks to exactly one endpoint. Failover across endpoints is the
//! watcher's job, so that the endpoint that answered the balance query is the
//! one used for funding.

use async_trait::async_trait;
use std::future::Future;
use std::time::Duration;
use tokio::time::timeout;

use crate::blockchain::types::{
    Amount, ChainError, ChainFamily, ChainResult, NetworkId, PendingTransaction, TxId, TxLookup,
};

/// A single-endpoint RPC client for one chain.
#[async_trait]
pub trait ChainClient: Send + Sync {
    /// Endpoint URL, used for logging and metrics.
    fn endpoint(&self) -> &str;

    /// Family this client speaks.
    fn family(&self) -> ChainFamily;

    /// Native balance of `address`.
    async fn get_balance(&self, address: &str) -> ChainResult<Amount>;

    /// Next nonce for `address`, counting transactions still in the pool.
    async fn get_pending_nonce(&self, address: &str) -> ChainResult<u64>;

    /// Suggested fee in the family's fee unit.
    async fn suggest_fee(&self) -> ChainResult<Amount>;

    /// Network identifier signatures must be scoped to.
    async fn network_id(&self) -> ChainResult<NetworkId>;

    /// Broadcast a signed transaction, returning the id the node reports.
    async fn submit(&self, tx: &PendingTransaction) -> ChainResult<TxId>;

    /// Look a transaction up by id.
    async fn get_transaction(&self, id: &TxId) -> ChainResult<TxLookup>;
}

/// Run an RPC future under a deadline, mapping transport errors into [`ChainError::Rpc`].
pub async fn rpc_call<T, E, F>(limit: Duration, fut: F) -> ChainResult<T>
where
    F: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    match timeout(limit, fut).await {
        Ok(Ok(result)) => Ok(result),
        Ok(Err(e)) => Err(ChainError::Rpc(e.to_string())),
        Err(_) => Err(ChainError::Timeout(limit.as_secs())),
    }
}
