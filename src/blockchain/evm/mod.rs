//! Ethereum-compatible chains.

pub mod client;
pub mod wallet;

pub use client::EvmClient;
pub use wallet::EvmWallet;
