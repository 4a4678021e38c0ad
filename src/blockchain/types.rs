//! Chain-family types and error definitions.

use alloy::primitives::U256;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Native currency amount in the chain's smallest unit (wei, beddows).
pub type Amount = U256;

/// A class of chains sharing one signature and derivation scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChainFamily {
    /// Ethereum-compatible chains (secp256k1, EIP-155 signatures).
    Evm,
    /// Lisk chains (ed25519, network-identifier scoped signatures).
    Lisk,
}

/// Chain name tokens recognised as EVM networks when no family is configured.
/// A token matches when it starts with a hint, so `ethereum` and `ganache1` match.
const EVM_CHAIN_HINTS: &[&str] = &[
    "eth", "ganache", "ropsten", "goerli", "sepolia", "holesky", "anvil", "bsc", "binance",
    "polygon", "matic", "fantom", "avax", "avalanche", "arbitrum", "optimism", "base", "xdai",
    "gnosis",
];

impl ChainFamily {
    /// All families this build knows how to fund.
    pub const ALL: [ChainFamily; 2] = [ChainFamily::Evm, ChainFamily::Lisk];

    /// Guess the family from a chain name, e.g. `ganache1` or `lisk-testnet`.
    pub fn infer(chain: &str) -> Option<Self> {
        let name = chain.to_ascii_lowercase();
        let mut tokens = name.split(|c: char| !c.is_ascii_alphanumeric()).filter(|t| !t.is_empty());
        if tokens.clone().any(|t| t.starts_with("lisk")) {
            return Some(ChainFamily::Lisk);
        }
        tokens
            .any(|t| EVM_CHAIN_HINTS.iter().any(|hint| t.starts_with(hint)))
            .then_some(ChainFamily::Evm)
    }

    /// Ticker used when rendering whole-unit amounts in logs.
    pub fn ticker(&self) -> &'static str {
        match self {
            ChainFamily::Evm => "ETH",
            ChainFamily::Lisk => "LSK",
        }
    }

    /// Number of decimals between the smallest unit and one whole coin.
    pub fn decimals(&self) -> usize {
        match self {
            ChainFamily::Evm => 18,
            ChainFamily::Lisk => 8,
        }
    }

    /// Render an amount in whole units, e.g. `0.1 ETH`.
    pub fn format_amount(&self, amount: Amount) -> String {
        let raw = amount.to_string();
        let decimals = self.decimals();
        let (whole, frac) = if raw.len() > decimals {
            raw.split_at(raw.len() - decimals)
        } else {
            ("0", raw.as_str())
        };
        let frac = format!("{:0>width$}", frac, width = decimals);
        let frac = frac.trim_end_matches('0');
        if frac.is_empty() {
            format!("{} {}", whole, self.ticker())
        } else {
            format!("{}.{} {}", whole, frac, self.ticker())
        }
    }
}

impl fmt::Display for ChainFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChainFamily::Evm => write!(f, "evm"),
            ChainFamily::Lisk => write!(f, "lisk"),
        }
    }
}

impl FromStr for ChainFamily {
    type Err = ChainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "evm" | "eth" | "ethereum" => Ok(ChainFamily::Evm),
            "lisk" => Ok(ChainFamily::Lisk),
            other => Err(ChainError::UnsupportedFamily(other.to_string())),
        }
    }
}

/// Network scope a signature is bound to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NetworkId {
    /// EIP-155 chain id.
    ChainId(u64),
    /// Lisk 32-byte network identifier.
    Identifier([u8; 32]),
}

impl fmt::Display for NetworkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NetworkId::ChainId(id) => write!(f, "chain-id:{}", id),
            NetworkId::Identifier(id) => write!(f, "network:{}", hex::encode(id)),
        }
    }
}

/// Transaction identifier as reported by the chain (hex encoded).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TxId(pub String);

impl fmt::Display for TxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for TxId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Result of looking a transaction up by id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TxLookup {
    /// The polled node does not know the transaction (yet).
    NotFound,
    /// Known but not included in a block.
    Pending,
    /// Included in a block.
    Confirmed { block_number: Option<u64> },
}

/// A native transfer before signing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsignedTransfer {
    pub nonce: u64,
    pub recipient: String,
    pub amount: Amount,
    /// Gas price for EVM chains, absolute fee for Lisk.
    pub fee: Amount,
    pub payload: Vec<u8>,
}

/// A signed transfer ready for broadcast. Lives only until confirmation or timeout.
#[derive(Debug, Clone)]
pub struct PendingTransaction {
    pub nonce: u64,
    pub recipient: String,
    pub amount: Amount,
    pub fee: Amount,
    pub signature: Vec<u8>,
    pub id: TxId,
    /// Wire encoding submitted to the node.
    pub raw: Vec<u8>,
}

/// Errors that can occur during chain operations.
#[derive(Debug, Error)]
pub enum ChainError {
    /// RPC connection or request failed.
    #[error("RPC error: {0}")]
    Rpc(String),

    /// RPC request timed out.
    #[error("RPC timeout after {0} seconds")]
    Timeout(u64),

    /// Account or transaction unknown to the node.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Address could not be parsed for this family.
    #[error("Invalid address '{address}': {reason}")]
    InvalidAddress { address: String, reason: String },

    /// Key parsing or signing failed.
    #[error("Wallet error: {0}")]
    Wallet(String),

    /// The network id handed to a signer belongs to another family.
    #[error("Network id {0} cannot be used by this signer")]
    NetworkMismatch(String),

    /// Amount does not fit the chain's native integer width.
    #[error("Amount {0} exceeds the chain's native range")]
    AmountOverflow(Amount),

    /// Unexpected response body.
    #[error("Malformed response: {0}")]
    Decode(String),

    /// Family not supported by this build.
    #[error("Unsupported chain family: {0}")]
    UnsupportedFamily(String),
}

/// Result type for chain operations.
pub type ChainResult<T> = Result<T, ChainError>;
