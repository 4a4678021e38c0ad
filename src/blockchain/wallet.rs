//! Faucet signing keys.
//!
//! # Security
//! - Keys are derived from the operator's seed phrase at startup only
//! - Keys are never logged or serialized
//! - Each family has its own key, so no signer is shared across families

use std::fmt::Debug;

use crate::blockchain::types::{ChainFamily, ChainResult, NetworkId, PendingTransaction, UnsignedTransfer};

/// Signs native transfers on behalf of a faucet account.
pub trait TransferSigner: Send + Sync + Debug {
    /// Family whose signature scheme this key uses.
    fn family(&self) -> ChainFamily;

    /// Faucet address in the family's canonical text form.
    fn address(&self) -> &str;

    /// Sign `transfer` for broadcast on `network`.
    ///
    /// Fails with [`ChainError::NetworkMismatch`](crate::blockchain::ChainError::NetworkMismatch)
    /// when the network id belongs to another family, so a signature can never be
    /// replayed across chains.
    fn sign_transfer(
        &self,
        transfer: UnsignedTransfer,
        network: &NetworkId,
    ) -> ChainResult<PendingTransaction>;
}
