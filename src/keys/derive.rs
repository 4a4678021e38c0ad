//! Faucet keys from the operator's seed phrase.

use bip39::{Language, Mnemonic};
use std::sync::Arc;
use thiserror::Error;
use zeroize::Zeroizing;

use crate::blockchain::evm::EvmWallet;
use crate::blockchain::lisk::LiskWallet;
use crate::blockchain::types::{ChainError, ChainFamily};
use crate::blockchain::wallet::TransferSigner;

#[derive(Debug, Error)]
pub enum KeyError {
    #[error("invalid seed phrase: {0}")]
    InvalidMnemonic(String),

    #[error("failed to derive {family} key: {source}")]
    Derivation {
        family: ChainFamily,
        #[source]
        source: ChainError,
    },

    #[error("failed to read seed phrase: {0}")]
    Input(#[from] std::io::Error),

    #[error("empty seed phrase")]
    Empty,
}

/// Deterministic seed phrase → signer derivation, one scheme per family.
pub struct KeyDeriver {
    phrase: Zeroizing<String>,
}

impl KeyDeriver {
    /// Validate the BIP-39 checksum of `phrase`.
    ///
    /// Whitespace is normalized to single spaces before validation.
    pub fn new(phrase: &str) -> Result<Self, KeyError> {
        let normalized = Zeroizing::new(phrase.split_whitespace().collect::<Vec<_>>().join(" "));
        if normalized.is_empty() {
            return Err(KeyError::Empty);
        }
        Mnemonic::parse_in_normalized(Language::English, &normalized)
            .map_err(|e| KeyError::InvalidMnemonic(e.to_string()))?;
        Ok(Self { phrase: normalized })
    }

    /// Derive the faucet signer for `family`.
    pub fn derive(&self, family: ChainFamily) -> Result<Arc<dyn TransferSigner>, KeyError> {
        let signer: Arc<dyn TransferSigner> = match family {
            ChainFamily::Evm => Arc::new(
                EvmWallet::from_mnemonic(&self.phrase)
                    .map_err(|source| KeyError::Derivation { family, source })?,
            ),
            ChainFamily::Lisk => Arc::new(LiskWallet::from_passphrase(&self.phrase)),
        };
        Ok(signer)
    }
}

impl std::fmt::Debug for KeyDeriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyDeriver").finish_non_exhaustive()
    }
}
