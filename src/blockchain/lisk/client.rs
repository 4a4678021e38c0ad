//! Lisk Service HTTP (v2) client.

use alloy::primitives::U256;
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;

use crate::blockchain::client::{rpc_call, ChainClient};
use crate::blockchain::types::{
    Amount, ChainError, ChainFamily, ChainResult, NetworkId, PendingTransaction, TxId, TxLookup,
};

/// Approximate encoded size of a signed transfer, used to turn per-byte fees into a total.
pub const TRANSFER_SIZE_BYTES: u64 = 160;

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: Vec<T>,
}

/// Error body Lisk Service returns alongside non-2xx statuses.
#[derive(Debug, Deserialize)]
struct ServiceError {
    #[serde(default)]
    error: bool,
    #[serde(default)]
    message: String,
}

impl ServiceError {
    /// True only for the service's own "not found" answer, never a bare 404 from a proxy.
    fn is_not_found(&self) -> bool {
        self.error && self.message.to_ascii_lowercase().contains("not found")
    }
}

#[derive(Debug, Deserialize)]
struct AccountData {
    #[serde(default)]
    summary: AccountSummary,
    #[serde(default)]
    sequence: AccountSequence,
}

#[derive(Debug, Default, Deserialize)]
struct AccountSummary {
    #[serde(default)]
    balance: String,
}

#[derive(Debug, Default, Deserialize)]
struct AccountSequence {
    #[serde(default)]
    nonce: String,
}

#[derive(Debug, Deserialize)]
struct FeeEnvelope {
    data: FeeData,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FeeData {
    fee_estimate_per_byte: FeeEstimate,
    #[serde(default)]
    min_fee_per_byte: u64,
}

#[derive(Debug, Deserialize)]
struct FeeEstimate {
    #[serde(default)]
    medium: u64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SubmitResponse {
    transaction_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TransactionData {
    #[serde(default)]
    is_pending: bool,
    #[serde(default)]
    block: Option<BlockRef>,
}

#[derive(Debug, Deserialize)]
struct BlockRef {
    height: Option<u64>,
}

/// Single-endpoint Lisk client. The network identifier comes from configuration.
#[derive(Clone)]
pub struct LiskClient {
    http: reqwest::Client,
    base_url: String,
    network_id: [u8; 32],
    timeout_duration: Duration,
}

impl LiskClient {
    pub fn new(url: &str, network_id: [u8; 32], timeout_duration: Duration) -> ChainResult<Self> {
        url::Url::parse(url)
            .map_err(|e| ChainError::Rpc(format!("Invalid RPC URL '{}': {}", url, e)))?;
        let http = reqwest::Client::builder()
            .timeout(timeout_duration)
            .build()
            .map_err(|e| ChainError::Rpc(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: url.trim_end_matches('/').to_string(),
            network_id,
            timeout_duration,
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str, query: &[(&str, &str)]) -> ChainResult<T> {
        let url = format!("{}{}", self.base_url, path);
        let response = rpc_call(self.timeout_duration, self.http.get(&url).query(query).send()).await?;
        Self::decode(response, path).await
    }

    async fn decode<T: DeserializeOwned>(response: reqwest::Response, path: &str) -> ChainResult<T> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            if status == StatusCode::NOT_FOUND {
                if let Ok(error) = serde_json::from_str::<ServiceError>(&body) {
                    if error.is_not_found() {
                        return Err(ChainError::NotFound(error.message));
                    }
                }
            }
            return Err(ChainError::Rpc(format!("{} returned {}: {}", path, status, body)));
        }
        response
            .json::<T>()
            .await
            .map_err(|e| ChainError::Decode(format!("{}: {}", path, e)))
    }

    async fn account(&self, address: &str) -> ChainResult<AccountData> {
        let envelope: Envelope<AccountData> = self
            .get_json("/api/v2/accounts", &[("address", address), ("limit", "1")])
            .await?;
        envelope
            .data
            .into_iter()
            .next()
            .ok_or_else(|| ChainError::NotFound(format!("account {}", address)))
    }
}

#[async_trait]
impl ChainClient for LiskClient {
    fn endpoint(&self) -> &str {
        &self.base_url
    }

    fn family(&self) -> ChainFamily {
        ChainFamily::Lisk
    }

    async fn get_balance(&self, address: &str) -> ChainResult<Amount> {
        match self.account(address).await {
            Ok(account) => account
                .summary
                .balance
                .parse::<U256>()
                .map_err(|e| ChainError::Decode(format!("balance '{}': {}", account.summary.balance, e))),
            // Lisk accounts come into existence with their first incoming transfer.
            Err(ChainError::NotFound(_)) => Ok(U256::ZERO),
            Err(e) => Err(e),
        }
    }

    async fn get_pending_nonce(&self, address: &str) -> ChainResult<u64> {
        let account = self.account(address).await?;
        account
            .sequence
            .nonce
            .parse::<u64>()
            .map_err(|e| ChainError::Decode(format!("nonce '{}': {}", account.sequence.nonce, e)))
    }

    async fn suggest_fee(&self) -> ChainResult<Amount> {
        let fees: FeeEnvelope = self.get_json("/api/v2/fees", &[]).await?;
        let per_byte = fees
            .data
            .min_fee_per_byte
            .saturating_add(fees.data.fee_estimate_per_byte.medium);
        Ok(U256::from(per_byte) * U256::from(TRANSFER_SIZE_BYTES))
    }

    async fn network_id(&self) -> ChainResult<NetworkId> {
        Ok(NetworkId::Identifier(self.network_id))
    }

    async fn submit(&self, tx: &PendingTransaction) -> ChainResult<TxId> {
        let url = format!("{}/api/v2/transactions", self.base_url);
        let body = serde_json::json!({ "transaction": hex::encode(&tx.raw) });
        let response = rpc_call(self.timeout_duration, self.http.post(&url).json(&body).send()).await?;
        let submitted: SubmitResponse = Self::decode(response, "/api/v2/transactions").await?;
        Ok(TxId(submitted.transaction_id))
    }

    async fn get_transaction(&self, id: &TxId) -> ChainResult<TxLookup> {
        let envelope: Envelope<TransactionData> = match self
            .get_json("/api/v2/transactions", &[("transactionId", id.0.as_str())])
            .await
        {
            Ok(envelope) => envelope,
            Err(ChainError::NotFound(_)) => return Ok(TxLookup::NotFound),
            Err(e) => return Err(e),
        };

        Ok(match envelope.data.into_iter().next() {
            None => TxLookup::NotFound,
            Some(tx) if tx.is_pending => TxLookup::Pending,
            Some(tx) => TxLookup::Confirmed {
                block_number: tx.block.and_then(|b| b.height),
            },
        })
    }
}

impl std::fmt::Debug for LiskClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LiskClient")
            .field("base_url", &self.base_url)
            .field("network_id", &hex::encode(self.network_id))
            .finish()
    }
}
