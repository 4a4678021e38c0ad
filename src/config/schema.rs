//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the funder.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::blockchain::types::{Amount, ChainFamily};
use crate::config::amount;

/// Root configuration for the vault funder.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct FunderConfig {
    /// Watched chains keyed by chain name (e.g. `ganache1`).
    pub chains: BTreeMap<String, ChainConfig>,

    /// Optional path of the JSON vault list.
    pub vaults_path: Option<String>,

    /// Per-family funding policies.
    pub policies: PoliciesConfig,

    /// Chain RPC settings shared by all endpoints.
    pub rpc: RpcConfig,

    /// Custody key registry.
    pub key_registry: KeyRegistryConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Shutdown settings.
    pub shutdown: ShutdownConfig,
}

impl FunderConfig {
    /// Family of `chain`: the configured one, else inferred from the name.
    pub fn chain_family(&self, chain: &str) -> Option<ChainFamily> {
        self.chains
            .get(chain)
            .and_then(|c| c.family)
            .or_else(|| ChainFamily::infer(chain))
    }
}

/// One `[chains.<name>]` table.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct ChainConfig {
    /// Chain family. Inferred from the chain name when absent.
    #[serde(default)]
    pub family: Option<ChainFamily>,

    /// RPC endpoints in priority order.
    pub rpcs: Vec<String>,

    /// WebSocket endpoints. Accepted for compatibility; polling never uses them.
    #[serde(default)]
    pub wss: Vec<String>,

    /// Lisk network identifier (64 hex characters).
    #[serde(default)]
    pub network_id: Option<String>,
}

impl ChainConfig {
    /// Decode `network_id` as a 32-byte Lisk network identifier.
    pub fn lisk_network_id(&self) -> Result<[u8; 32], String> {
        let text = self.network_id.as_deref().ok_or("missing network_id")?;
        let bytes = hex::decode(text.trim_start_matches("0x")).map_err(|e| e.to_string())?;
        <[u8; 32]>::try_from(bytes.as_slice())
            .map_err(|_| format!("expected 32 bytes, got {}", bytes.len()))
    }
}

/// Vault list entry (`vaults.json`).
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct Vault {
    pub id: String,
    pub chain: String,
    pub address: String,
    #[serde(default)]
    pub token: String,
}

/// Funding policy after family defaults are applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyConfig {
    pub threshold: Amount,
    pub top_up_amount: Amount,
    pub min_fee: Amount,
    pub poll_interval_secs: u64,
    pub confirmation_timeout_secs: u64,
    pub confirmation_poll_interval_secs: u64,
}

impl PolicyConfig {
    /// Production defaults for `family`.
    pub fn defaults_for(family: ChainFamily) -> Self {
        match family {
            ChainFamily::Evm => Self {
                // 0.1 ETH
                threshold: Amount::from(100_000_000_000_000_000u64),
                // 1 ETH
                top_up_amount: Amount::from(1_000_000_000_000_000_000u64),
                min_fee: Amount::from(1u64),
                poll_interval_secs: 30,
                confirmation_timeout_secs: 120,
                confirmation_poll_interval_secs: 3,
            },
            ChainFamily::Lisk => Self {
                // 10 LSK
                threshold: Amount::from(1_000_000_000u64),
                // 20 LSK
                top_up_amount: Amount::from(2_000_000_000u64),
                // 0.005 LSK
                min_fee: Amount::from(500_000u64),
                poll_interval_secs: 30 * 60,
                confirmation_timeout_secs: 120,
                confirmation_poll_interval_secs: 10,
            },
        }
    }
}

/// `[policies.<family>]` table; unset fields keep the family default.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
pub struct PolicyOverrides {
    #[serde(deserialize_with = "amount::deserialize_opt")]
    pub threshold: Option<Amount>,
    #[serde(deserialize_with = "amount::deserialize_opt")]
    pub top_up_amount: Option<Amount>,
    #[serde(deserialize_with = "amount::deserialize_opt")]
    pub min_fee: Option<Amount>,
    pub poll_interval_secs: Option<u64>,
    pub confirmation_timeout_secs: Option<u64>,
    pub confirmation_poll_interval_secs: Option<u64>,
}

impl PolicyOverrides {
    pub fn resolve(&self, family: ChainFamily) -> PolicyConfig {
        let base = PolicyConfig::defaults_for(family);
        PolicyConfig {
            threshold: self.threshold.unwrap_or(base.threshold),
            top_up_amount: self.top_up_amount.unwrap_or(base.top_up_amount),
            min_fee: self.min_fee.unwrap_or(base.min_fee),
            poll_interval_secs: self.poll_interval_secs.unwrap_or(base.poll_interval_secs),
            confirmation_timeout_secs: self
                .confirmation_timeout_secs
                .unwrap_or(base.confirmation_timeout_secs),
            confirmation_poll_interval_secs: self
                .confirmation_poll_interval_secs
                .unwrap_or(base.confirmation_poll_interval_secs),
        }
    }
}

/// Policies per chain family.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
pub struct PoliciesConfig {
    pub evm: PolicyOverrides,
    pub lisk: PolicyOverrides,
}

impl PoliciesConfig {
    pub fn for_family(&self, family: ChainFamily) -> PolicyConfig {
        match family {
            ChainFamily::Evm => self.evm.resolve(family),
            ChainFamily::Lisk => self.lisk.resolve(family),
        }
    }
}

/// Chain RPC settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RpcConfig {
    /// Timeout for each RPC call in seconds.
    pub timeout_secs: u64,
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self { timeout_secs: 10 }
    }
}

/// Custody key registry settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct KeyRegistryConfig {
    /// Base URL of the registry service.
    pub url: String,

    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for KeyRegistryConfig {
    fn default() -> Self {
        Self {
            url: "http://127.0.0.1:1317".to_string(),
            timeout_secs: 10,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Pretty for terminals, JSON for log shippers.
    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9100".to_string(),
        }
    }
}

/// Shutdown configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ShutdownConfig {
    /// Seconds to wait for watchers to finish their current step.
    pub grace_period_secs: u64,
}

impl Default for ShutdownConfig {
    fn default() -> Self {
        Self {
            grace_period_secs: 150,
        }
    }
}
