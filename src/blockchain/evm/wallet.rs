//! secp256k1 faucet wallet for EVM chains.

use alloy::consensus::{SignableTransaction, TxEnvelope, TxLegacy};
use alloy::eips::eip2718::Encodable2718;
use alloy::network::TxSignerSync;
use alloy::primitives::{Address, Bytes, TxKind};
use alloy::signers::local::{coins_bip39::English, MnemonicBuilder, PrivateKeySigner};

use crate::blockchain::types::{
    ChainError, ChainFamily, ChainResult, NetworkId, PendingTransaction, TxId, UnsignedTransfer,
};
use crate::blockchain::wallet::TransferSigner;

/// BIP-44 path of the first Ethereum account.
pub const EVM_DERIVATION_PATH: &str = "m/44'/60'/0'/0/0";

/// Gas limit for a plain value transfer, with headroom over the 21000 minimum.
pub const TRANSFER_GAS_LIMIT: u64 = 22_000;

/// Faucet wallet signing legacy EIP-155 transfers.
#[derive(Clone)]
pub struct EvmWallet {
    signer: PrivateKeySigner,
    address: String,
}

impl EvmWallet {
    /// Derive the faucet key from a BIP-39 phrase at [`EVM_DERIVATION_PATH`].
    pub fn from_mnemonic(phrase: &str) -> ChainResult<Self> {
        let signer = MnemonicBuilder::<English>::default()
            .phrase(phrase)
            .derivation_path(EVM_DERIVATION_PATH)
            .map_err(|e| ChainError::Wallet(format!("Invalid derivation path: {}", e)))?
            .build()
            .map_err(|e| ChainError::Wallet(format!("Key derivation failed: {}", e)))?;
        Ok(Self::from_signer(signer))
    }

    fn from_signer(signer: PrivateKeySigner) -> Self {
        let address = signer.address().to_checksum(None);
        Self { signer, address }
    }
}

impl TransferSigner for EvmWallet {
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
        let to: Address = transfer.recipient.parse().map_err(|e| ChainError::InvalidAddress {
            address: transfer.recipient.clone(),
            reason: format!("{}", e),
        })?;
        let gas_price: u128 = transfer
            .fee
            .try_into()
            .map_err(|_| ChainError::AmountOverflow(transfer.fee))?;

        let mut tx = TxLegacy {
            chain_id: Some(*chain_id),
            nonce: transfer.nonce,
            gas_price,
            gas_limit: TRANSFER_GAS_LIMIT,
            to: TxKind::Call(to),
            value: transfer.amount,
            input: Bytes::from(transfer.payload.clone()),
        };

        let signature = self
            .signer
            .sign_transaction_sync(&mut tx)
            .map_err(|e| ChainError::Wallet(format!("Signing failed: {}", e)))?;
        let signed = tx.into_signed(signature);
        let id = TxId(signed.hash().to_string());
        let raw = TxEnvelope::from(signed).encoded_2718();

        Ok(PendingTransaction {
            nonce: transfer.nonce,
            recipient: transfer.recipient,
            amount: transfer.amount,
            fee: transfer.fee,
            signature: signature.as_bytes().to_vec(),
            id,
            raw,
        })
    }
}

impl std::fmt::Debug for EvmWallet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EvmWallet")
            .field("address", &self.address)
            .finish()
    }
}
