//! Custody key registry.
//!
//! The registry reports the public keys of the signing infrastructure by key
//! type. Each chain family watches the address derived from its key type.
//!
//! Response shape: `{"pubkeys": {"ecdsa": "<hex>", "eddsa": "<hex>"}}`

use alloy::primitives::Address;
use async_trait::async_trait;
use k256::elliptic_curve::sec1::ToEncodedPoint;
use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

use crate::blockchain::lisk::address::lisk32_from_public_key;
use crate::blockchain::types::ChainFamily;

/// Public key algorithm of a custody key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyType {
    Ecdsa,
    Eddsa,
}

impl KeyType {
    pub fn for_family(family: ChainFamily) -> Self {
        match family {
            ChainFamily::Evm => KeyType::Ecdsa,
            ChainFamily::Lisk => KeyType::Eddsa,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            KeyType::Ecdsa => "ecdsa",
            KeyType::Eddsa => "eddsa",
        }
    }
}

impl fmt::Display for KeyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("key registry request failed: {0}")]
    Request(String),

    #[error("key registry returned status {0}")]
    Status(u16),

    #[error("invalid key registry response: {0}")]
    Decode(String),

    #[error("key registry has no {0} key")]
    MissingKey(KeyType),

    #[error("invalid {key_type} key: {reason}")]
    InvalidKey { key_type: KeyType, reason: String },
}

/// Custody public keys keyed by type.
#[derive(Debug, Clone, Default)]
pub struct CustodyKeys {
    keys: HashMap<KeyType, Vec<u8>>,
}

impl CustodyKeys {
    pub fn insert(&mut self, key_type: KeyType, key: Vec<u8>) {
        self.keys.insert(key_type, key);
    }

    pub fn get(&self, key_type: KeyType) -> Option<&[u8]> {
        self.keys.get(&key_type).map(Vec::as_slice)
    }

    /// Vault address watched on chains of `family`.
    pub fn watched_address(&self, family: ChainFamily) -> Result<String, RegistryError> {
        let key_type = KeyType::for_family(family);
        let key = self.get(key_type).ok_or(RegistryError::MissingKey(key_type))?;
        match family {
            ChainFamily::Evm => evm_address(key),
            ChainFamily::Lisk => lisk_address(key),
        }
    }
}

/// Checksummed address of a SEC1 (compressed or uncompressed) secp256k1 key.
fn evm_address(key: &[u8]) -> Result<String, RegistryError> {
    let public_key = k256::PublicKey::from_sec1_bytes(key).map_err(|e| RegistryError::InvalidKey {
        key_type: KeyType::Ecdsa,
        reason: e.to_string(),
    })?;
    let point = public_key.to_encoded_point(false);
    Ok(Address::from_raw_public_key(&point.as_bytes()[1..]).to_checksum(None))
}

fn lisk_address(key: &[u8]) -> Result<String, RegistryError> {
    let key: [u8; 32] = key.try_into().map_err(|_| RegistryError::InvalidKey {
        key_type: KeyType::Eddsa,
        reason: format!("expected 32 bytes, got {}", key.len()),
    })?;
    Ok(lisk32_from_public_key(&key))
}

#[async_trait]
pub trait KeyRegistry: Send + Sync {
    /// Fetch all custody public keys.
    async fn public_keys(&self) -> Result<CustodyKeys, RegistryError>;
}

#[derive(Debug, Deserialize)]
struct PubKeysResponse {
    pubkeys: HashMap<String, String>,
}

impl PubKeysResponse {
    fn into_keys(self) -> Result<CustodyKeys, RegistryError> {
        let mut keys = CustodyKeys::default();
        for key_type in [KeyType::Ecdsa, KeyType::Eddsa] {
            if let Some(encoded) = self.pubkeys.get(key_type.as_str()) {
                let bytes = hex::decode(encoded.trim_start_matches("0x")).map_err(|e| {
                    RegistryError::InvalidKey {
                        key_type,
                        reason: e.to_string(),
                    }
                })?;
                keys.insert(key_type, bytes);
            }
        }
        Ok(keys)
    }
}

/// Registry reached over HTTP.
pub struct HttpKeyRegistry {
    http: reqwest::Client,
    url: String,
}

impl HttpKeyRegistry {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, RegistryError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RegistryError::Request(e.to_string()))?;
        Ok(Self {
            http,
            url: format!("{}/tss/pubkeys", base_url.trim_end_matches('/')),
        })
    }
}

#[async_trait]
impl KeyRegistry for HttpKeyRegistry {
    async fn public_keys(&self) -> Result<CustodyKeys, RegistryError> {
        tracing::debug!(url = %self.url, "Querying key registry");
        let response = self
            .http
            .get(&self.url)
            .send()
            .await
            .map_err(|e| RegistryError::Request(e.to_string()))?;
        if !response.status().is_success() {
            return Err(RegistryError::Status(response.status().as_u16()));
        }
        let body: PubKeysResponse = response
            .json()
            .await
            .map_err(|e| RegistryError::Decode(e.to_string()))?;
        body.into_keys()
    }
}
