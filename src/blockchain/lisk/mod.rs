//! Lisk chains.

pub mod address;
pub mod client;
pub mod codec;
pub mod wallet;

pub use client::LiskClient;
pub use wallet::LiskWallet;
