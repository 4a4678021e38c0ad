//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - RPC endpoints present and parseable per chain
//! - Family-specific parameters (Lisk network id)
//! - Policy invariants: threshold below top-up, non-zero intervals
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: FunderConfig → Result<(), Vec<ValidationError>>
//! - Chains whose family cannot be determined are not errors; startup skips them

use std::net::SocketAddr;
use thiserror::Error;
use url::Url;

use crate::blockchain::types::{Amount, ChainFamily};
use crate::config::schema::FunderConfig;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("no chains configured")]
    NoChains,

    #[error("chain {chain}: no RPC endpoints")]
    NoEndpoints { chain: String },

    #[error("chain {chain}: invalid RPC url {url:?}: {reason}")]
    InvalidEndpoint {
        chain: String,
        url: String,
        reason: String,
    },

    #[error("chain {chain}: invalid network_id: {reason}")]
    InvalidNetworkId { chain: String, reason: String },

    #[error("policies.{family}: threshold {threshold} must be below top_up_amount {top_up}")]
    ThresholdNotBelowTopUp {
        family: ChainFamily,
        threshold: Amount,
        top_up: Amount,
    },

    #[error("{field} must be greater than zero")]
    ZeroDuration { field: String },

    #[error("observability.metrics_address: invalid socket address {0:?}")]
    InvalidMetricsAddress(String),

    #[error("key_registry.url: {0}")]
    InvalidRegistryUrl(String),
}

/// Check `config` and report every problem found.
pub fn validate_config(config: &FunderConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.chains.is_empty() {
        errors.push(ValidationError::NoChains);
    }

    for (chain, chain_config) in &config.chains {
        if chain_config.rpcs.is_empty() {
            errors.push(ValidationError::NoEndpoints { chain: chain.clone() });
        }
        for rpc in &chain_config.rpcs {
            if let Err(reason) = check_http_url(rpc) {
                errors.push(ValidationError::InvalidEndpoint {
                    chain: chain.clone(),
                    url: rpc.clone(),
                    reason,
                });
            }
        }

        if config.chain_family(chain) == Some(ChainFamily::Lisk) {
            if let Err(reason) = chain_config.lisk_network_id() {
                errors.push(ValidationError::InvalidNetworkId {
                    chain: chain.clone(),
                    reason,
                });
            }
        }
    }

    for family in ChainFamily::ALL {
        let policy = config.policies.for_family(family);
        if policy.threshold >= policy.top_up_amount {
            errors.push(ValidationError::ThresholdNotBelowTopUp {
                family,
                threshold: policy.threshold,
                top_up: policy.top_up_amount,
            });
        }
        for (name, secs) in [
            ("poll_interval_secs", policy.poll_interval_secs),
            ("confirmation_timeout_secs", policy.confirmation_timeout_secs),
            ("confirmation_poll_interval_secs", policy.confirmation_poll_interval_secs),
        ] {
            if secs == 0 {
                errors.push(ValidationError::ZeroDuration {
                    field: format!("policies.{}.{}", family, name),
                });
            }
        }
    }

    if config.rpc.timeout_secs == 0 {
        errors.push(ValidationError::ZeroDuration {
            field: "rpc.timeout_secs".to_string(),
        });
    }
    if config.key_registry.timeout_secs == 0 {
        errors.push(ValidationError::ZeroDuration {
            field: "key_registry.timeout_secs".to_string(),
        });
    }
    if config.shutdown.grace_period_secs == 0 {
        errors.push(ValidationError::ZeroDuration {
            field: "shutdown.grace_period_secs".to_string(),
        });
    }
    if let Err(reason) = check_http_url(&config.key_registry.url) {
        errors.push(ValidationError::InvalidRegistryUrl(reason));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidMetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_http_url(raw: &str) -> Result<(), String> {
    let url = Url::parse(raw).map_err(|e| e.to_string())?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        other => Err(format!("unsupported scheme {}", other)),
    }
}
