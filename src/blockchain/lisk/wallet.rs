//! ed25519 faucet wallet for Lisk chains.

use ed25519_dalek::{Signer, SigningKey};
use sha2::{Digest, Sha256};
use zeroize::Zeroize;

use crate::blockchain::lisk::address::{decode_lisk32, lisk32_from_public_key};
use crate::blockchain::lisk::codec::{TransferAsset, TransferTransaction};
use crate::blockchain::types::{
    ChainError, ChainFamily, ChainResult, NetworkId, PendingTransaction, TxId, UnsignedTransfer,
};
use crate::blockchain::wallet::TransferSigner;

/// Faucet wallet using the Lisk passphrase scheme (secret = SHA-256 of the passphrase).
pub struct LiskWallet {
    key: SigningKey,
    address: String,
}

impl LiskWallet {
    pub fn from_passphrase(passphrase: &str) -> Self {
        let mut secret: [u8; 32] = Sha256::digest(passphrase.as_bytes()).into();
        let key = SigningKey::from_bytes(&secret);
        secret.zeroize();

        let address = lisk32_from_public_key(&key.verifying_key().to_bytes());
        Self { key, address }
    }

    pub fn public_key(&self) -> [u8; 32] {
        self.key.verifying_key().to_bytes()
    }
}

impl TransferSigner for LiskWallet {
    fn family(&self) -> ChainFamily {
        ChainFamily::Lisk
    }

    fn address(&self) -> &str {
        &self.address
    }

    fn sign_transfer(
        &self,
        transfer: UnsignedTransfer,
        network: &NetworkId,
    ) -> ChainResult<PendingTransaction> {
        let NetworkId::Identifier(network_id) = network else {
            return Err(ChainError::NetworkMismatch(network.to_string()));
        };
        let amount: u64 = transfer
            .amount
            .try_into()
            .map_err(|_| ChainError::AmountOverflow(transfer.amount))?;
        let fee: u64 = transfer
            .fee
            .try_into()
            .map_err(|_| ChainError::AmountOverflow(transfer.fee))?;
        let data = String::from_utf8(transfer.payload.clone())
            .map_err(|e| ChainError::Wallet(format!("Transfer data must be UTF-8: {}", e)))?;

        let mut tx = TransferTransaction {
            nonce: transfer.nonce,
            fee,
            sender_public_key: self.public_key(),
            asset: TransferAsset {
                amount,
                recipient: decode_lisk32(&transfer.recipient)?,
                data,
            },
            signatures: Vec::new(),
        };

        let signature = self.key.sign(&tx.signing_bytes(network_id)).to_bytes().to_vec();
        tx.signatures.push(signature.clone());
        let raw = tx.encode();
        let id = TxId(hex::encode(Sha256::digest(&raw)));

        Ok(PendingTransaction {
            nonce: transfer.nonce,
            recipient: transfer.recipient,
            amount: transfer.amount,
            fee: transfer.fee,
            signature,
            id,
            raw,
        })
    }
}

impl std::fmt::Debug for LiskWallet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LiskWallet")
            .field("address", &self.address)
            .finish()
    }
}
