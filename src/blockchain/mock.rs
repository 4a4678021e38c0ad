//! Scripted in-memory chain used by the funding engine tests.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use tokio::time::Instant;

use crate::blockchain::client::ChainClient;
use crate::blockchain::types::{
    Amount, ChainError, ChainFamily, ChainResult, NetworkId, PendingTransaction, TxId, TxLookup,
    UnsignedTransfer,
};
use crate::blockchain::wallet::TransferSigner;

/// How the mock answers transaction lookups after a submission.
#[derive(Debug, Clone, Copy)]
pub enum Confirmation {
    /// Pending (not found) until this long after submission, then confirmed.
    After(Duration),
    /// Never leaves the pool.
    Never,
    /// Lookups fail with an RPC error.
    LookupError,
}

pub struct MockClient {
    endpoint: String,
    balances: Mutex<VecDeque<Option<Amount>>>,
    last_balance: Mutex<Option<Amount>>,
    nonce: Option<u64>,
    fee: Amount,
    network: NetworkId,
    fail_submit: bool,
    balance_delay: Duration,
    submit_delay: Duration,
    confirmation: Confirmation,
    submitted_at: Mutex<Option<Instant>>,
    outstanding: AtomicBool,
    pub overlaps: AtomicUsize,
    pub balance_calls: AtomicUsize,
    pub lookup_calls: AtomicUsize,
    pub submitted: Mutex<Vec<PendingTransaction>>,
}

impl MockClient {
    /// A healthy endpoint reporting `balance` forever and confirming instantly.
    pub fn new(endpoint: &str) -> Self {
        Self {
            endpoint: endpoint.to_string(),
            balances: Mutex::new(VecDeque::new()),
            last_balance: Mutex::new(None),
            nonce: Some(0),
            fee: Amount::from(1_000u64),
            network: NetworkId::ChainId(31337),
            fail_submit: false,
            balance_delay: Duration::ZERO,
            submit_delay: Duration::ZERO,
            confirmation: Confirmation::After(Duration::ZERO),
            submitted_at: Mutex::new(None),
            outstanding: AtomicBool::new(false),
            overlaps: AtomicUsize::new(0),
            balance_calls: AtomicUsize::new(0),
            lookup_calls: AtomicUsize::new(0),
            submitted: Mutex::new(Vec::new()),
        }
    }

    /// Balance answers in order; `None` is a failed query. The last answer repeats.
    pub fn with_balances<I: IntoIterator<Item = Option<u64>>>(self, script: I) -> Self {
        *self.balances.lock().unwrap() = script.into_iter().map(|b| b.map(Amount::from)).collect();
        self
    }

    /// Every balance query fails.
    pub fn unreachable(self) -> Self {
        self.with_balances([None])
    }

    pub fn with_nonce(mut self, nonce: Option<u64>) -> Self {
        self.nonce = nonce;
        self
    }

    pub fn with_fee(mut self, fee: u64) -> Self {
        self.fee = Amount::from(fee);
        self
    }

    pub fn with_network(mut self, network: NetworkId) -> Self {
        self.network = network;
        self
    }

    pub fn failing_submit(mut self) -> Self {
        self.fail_submit = true;
        self
    }

    pub fn with_balance_delay(mut self, delay: Duration) -> Self {
        self.balance_delay = delay;
        self
    }

    pub fn with_submit_delay(mut self, delay: Duration) -> Self {
        self.submit_delay = delay;
        self
    }

    pub fn with_confirmation(mut self, confirmation: Confirmation) -> Self {
        self.confirmation = confirmation;
        self
    }

    pub fn submissions(&self) -> Vec<PendingTransaction> {
        self.submitted.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChainClient for MockClient {
    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn family(&self) -> ChainFamily {
        ChainFamily::Evm
    }

    async fn get_balance(&self, _address: &str) -> ChainResult<Amount> {
        self.balance_calls.fetch_add(1, Ordering::SeqCst);
        if !self.balance_delay.is_zero() {
            tokio::time::sleep(self.balance_delay).await;
        }
        let next = {
            let mut script = self.balances.lock().unwrap();
            if script.len() > 1 {
                script.pop_front()
            } else {
                script.front().cloned()
            }
        };
        let answer = match next {
            Some(answer) => answer,
            None => *self.last_balance.lock().unwrap(),
        };
        *self.last_balance.lock().unwrap() = answer;
        answer.ok_or_else(|| ChainError::Rpc(format!("{} unreachable", self.endpoint)))
    }

    async fn get_pending_nonce(&self, _address: &str) -> ChainResult<u64> {
        if self.outstanding.load(Ordering::SeqCst) {
            self.overlaps.fetch_add(1, Ordering::SeqCst);
        }
        self.nonce
            .ok_or_else(|| ChainError::Rpc("nonce query failed".to_string()))
    }

    async fn suggest_fee(&self) -> ChainResult<Amount> {
        Ok(self.fee)
    }

    async fn network_id(&self) -> ChainResult<NetworkId> {
        Ok(self.network.clone())
    }

    async fn submit(&self, tx: &PendingTransaction) -> ChainResult<TxId> {
        if !self.submit_delay.is_zero() {
            tokio::time::sleep(self.submit_delay).await;
        }
        if self.fail_submit {
            return Err(ChainError::Rpc("insufficient funds for gas * price + value".to_string()));
        }
        self.submitted.lock().unwrap().push(tx.clone());
        *self.submitted_at.lock().unwrap() = Some(Instant::now());
        self.outstanding.store(true, Ordering::SeqCst);
        Ok(tx.id.clone())
    }

    async fn get_transaction(&self, _id: &TxId) -> ChainResult<TxLookup> {
        self.lookup_calls.fetch_add(1, Ordering::SeqCst);
        let submitted_at = *self.submitted_at.lock().unwrap();
        let Some(submitted_at) = submitted_at else {
            return Ok(TxLookup::NotFound);
        };
        match self.confirmation {
            Confirmation::LookupError => Err(ChainError::Rpc("node is syncing".to_string())),
            Confirmation::Never => Ok(TxLookup::Pending),
            Confirmation::After(delay) if submitted_at.elapsed() >= delay => {
                self.outstanding.store(false, Ordering::SeqCst);
                Ok(TxLookup::Confirmed { block_number: Some(1) })
            }
            Confirmation::After(_) => Ok(TxLookup::NotFound),
        }
    }
}

/// Signer producing deterministic ids, scoped to EVM chain ids.
#[derive(Debug)]
pub struct MockSigner {
    address: String,
}

impl MockSigner {
    pub fn new() -> Self {
        Self {
            address: "0xfaucet".to_string(),
        }
    }
}

impl TransferSigner for MockSigner {
    fn family(&self) -> ChainFamily {
        ChainFamily::Evm
    }

    fn address(&self) -> &str {
        &self.address
    }

    fn sign_transfer(
        &self,
        transfer: UnsignedTransfer,
        network: &NetworkId,
    ) -> ChainResult<PendingTransaction> {
        let NetworkId::ChainId(chain_id) = network else {
            return Err(ChainError::NetworkMismatch(network.to_string()));
        };
        Ok(PendingTransaction {
            id: TxId(format!("0x{:x}-{}", chain_id, transfer.nonce)),
            nonce: transfer.nonce,
            recipient: transfer.recipient,
            amount: transfer.amount,
            fee: transfer.fee,
            signature: vec![1u8; 65],
            raw: transfer.payload,
        })
    }
}
