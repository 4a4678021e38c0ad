//! Blockchain integration subsystem.
//!
//! # Data Flow
//! ```text
//! Seed phrase (operator prompt)
//!     → wallet.rs (TransferSigner, one key per family)
//! Chain config (ordered RPC endpoint list)
//!     → client.rs (ChainClient, one per endpoint, every call under a timeout)
//! evm/  : alloy provider + legacy EIP-155 transfers
//! lisk/ : Lisk Service HTTP API + lisk32 addresses + binary codec
//! ```
//!
//! # Security Constraints
//! - Private keys exist only in memory, derived at startup
//! - Never log private keys or the seed phrase
//! - Signatures are always scoped to the network id reported for the chain

pub mod client;
pub mod evm;
pub mod lisk;
pub mod types;
pub mod wallet;

#[cfg(test)]
pub mod mock;

pub use client::ChainClient;
pub use types::{
    Amount, ChainError, ChainFamily, ChainResult, NetworkId, PendingTransaction, TxId, TxLookup,
    UnsignedTransfer,
};
pub use wallet::TransferSigner;
