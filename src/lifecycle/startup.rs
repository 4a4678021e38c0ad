//! Startup orchestration.
//!
//! # Responsibilities
//! - Resolve each configured chain to a family, or skip it with a warning
//! - Query the key registry for the watched vault addresses
//! - Derive one faucet key per family in use
//! - Build one client per RPC endpoint and spawn the watchers
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Nothing is spawned until every chain has been planned successfully

use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::blockchain::client::ChainClient;
use crate::blockchain::evm::EvmClient;
use crate::blockchain::lisk::LiskClient;
use crate::blockchain::types::{ChainError, ChainFamily};
use crate::blockchain::wallet::TransferSigner;
use crate::config::loader::{load_vaults, ConfigError};
use crate::config::schema::{ChainConfig, FunderConfig};
use crate::funding::supervisor::WatcherSupervisor;
use crate::funding::types::{ChainTarget, FundingPolicy};
use crate::keys::derive::{KeyDeriver, KeyError};
use crate::keys::registry::{CustodyKeys, KeyRegistry, RegistryError};

#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Keys(#[from] KeyError),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error("chain {chain}: {source}")]
    Client {
        chain: String,
        #[source]
        source: ChainError,
    },

    #[error("chain {chain}: {reason}")]
    Chain { chain: String, reason: String },

    #[error("no chain with a supported family is configured")]
    NoWatchers,

    #[error("failed to start metrics exporter: {0}")]
    Metrics(String),
}

/// A chain ready to be watched.
#[derive(Debug, Clone)]
pub struct PlannedChain {
    pub target: ChainTarget,
    pub policy: FundingPolicy,
    network_id: Option<[u8; 32]>,
}

/// Resolve configured chains into targets. Chains of unknown family are skipped.
pub fn plan_chains(config: &FunderConfig, keys: &CustodyKeys) -> Result<Vec<PlannedChain>, StartupError> {
    let mut planned = Vec::new();
    let mut watched: HashMap<ChainFamily, String> = HashMap::new();

    for (chain, chain_config) in &config.chains {
        let Some(family) = config.chain_family(chain) else {
            tracing::warn!(chain = %chain, "Unsupported chain family, not watching");
            continue;
        };

        let watched_address = match watched.get(&family) {
            Some(address) => address.clone(),
            None => {
                let address = keys.watched_address(family)?;
                watched.insert(family, address.clone());
                address
            }
        };

        let network_id = match family {
            ChainFamily::Lisk => Some(chain_config.lisk_network_id().map_err(|reason| {
                StartupError::Chain {
                    chain: chain.clone(),
                    reason,
                }
            })?),
            ChainFamily::Evm => None,
        };

        planned.push(PlannedChain {
            target: ChainTarget {
                chain: chain.clone(),
                endpoints: chain_config.rpcs.clone(),
                watched_address,
                family,
            },
            policy: FundingPolicy::from(&config.policies.for_family(family)),
            network_id,
        });
    }

    if planned.is_empty() {
        return Err(StartupError::NoWatchers);
    }
    Ok(planned)
}

fn build_clients(
    planned: &PlannedChain,
    chain_config: &ChainConfig,
    timeout: Duration,
) -> Result<Vec<Arc<dyn ChainClient>>, StartupError> {
    let chain = &planned.target.chain;
    chain_config
        .rpcs
        .iter()
        .map(|url| {
            let client: Arc<dyn ChainClient> = match (planned.target.family, planned.network_id) {
                (ChainFamily::Lisk, Some(network_id)) => Arc::new(
                    LiskClient::new(url, network_id, timeout).map_err(|source| StartupError::Client {
                        chain: chain.clone(),
                        source,
                    })?,
                ),
                (ChainFamily::Lisk, None) => {
                    return Err(StartupError::Chain {
                        chain: chain.clone(),
                        reason: "missing network_id".to_string(),
                    })
                }
                (ChainFamily::Evm, _) => Arc::new(EvmClient::new(url, timeout).map_err(|source| {
                    StartupError::Client {
                        chain: chain.clone(),
                        source,
                    }
                })?),
            };
            if client.family() != planned.target.family {
                return Err(StartupError::Chain {
                    chain: chain.clone(),
                    reason: format!("{} client built for a {} chain", client.family(), planned.target.family),
                });
            }
            Ok(client)
        })
        .collect()
}

/// Derive the faucet signer of every family in `families`, once each.
pub fn derive_signers(
    deriver: &KeyDeriver,
    families: impl IntoIterator<Item = ChainFamily>,
) -> Result<BTreeMap<ChainFamily, Arc<dyn TransferSigner>>, KeyError> {
    let mut signers = BTreeMap::new();
    for family in families {
        if !signers.contains_key(&family) {
            signers.insert(family, deriver.derive(family)?);
        }
    }
    Ok(signers)
}

/// Load the optional vault list and log it per chain.
pub fn log_vaults(path: &Path) -> Result<usize, ConfigError> {
    let vaults = load_vaults(path)?;
    let mut per_chain: BTreeMap<&str, usize> = BTreeMap::new();
    for vault in &vaults {
        *per_chain.entry(vault.chain.as_str()).or_default() += 1;
    }
    for (chain, count) in &per_chain {
        tracing::info!(chain = %chain, vaults = count, "Vaults loaded");
    }
    tracing::info!(path = %path.display(), total = vaults.len(), "Vault list loaded");
    Ok(vaults.len())
}

/// Plan every chain, derive keys, and spawn one watcher per chain.
pub async fn start(
    config: &FunderConfig,
    deriver: &KeyDeriver,
    registry: &dyn KeyRegistry,
) -> Result<WatcherSupervisor, StartupError> {
    let keys = registry.public_keys().await?;
    let planned = plan_chains(config, &keys)?;
    let signers = derive_signers(deriver, planned.iter().map(|p| p.target.family))?;
    let timeout = Duration::from_secs(config.rpc.timeout_secs);

    let mut watchers = Vec::with_capacity(planned.len());
    for chain in planned {
        let chain_config = config.chains.get(&chain.target.chain).ok_or_else(|| StartupError::Chain {
            chain: chain.target.chain.clone(),
            reason: "not configured".to_string(),
        })?;
        let clients = build_clients(&chain, chain_config, timeout)?;
        let signer = signers
            .get(&chain.target.family)
            .cloned()
            .ok_or_else(|| StartupError::Chain {
                chain: chain.target.chain.clone(),
                reason: format!("no {} signer", chain.target.family),
            })?;
        watchers.push((chain, clients, signer));
    }

    let mut supervisor = WatcherSupervisor::new();
    for (chain, clients, signer) in watchers {
        supervisor.spawn(chain.target, chain.policy, clients, signer);
    }
    tracing::info!(watchers = supervisor.len(), "All watchers started");
    Ok(supervisor)
}
