//! Configuration and vault list loading from disk.

use std::io::Write;
use std::time::Duration;

use tempfile::NamedTempFile;
use vault_funder::blockchain::{Amount, ChainFamily};
use vault_funder::config::{load_config, load_vaults, ConfigError, ValidationError};
use vault_funder::funding::FundingPolicy;

fn write_file(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
fn test_load_full_config() {
    let file = write_file(
        r#"
        vaults_path = "vaults.json"

        [observability]
        log_level = "debug"
        log_format = "json"

        [key_registry]
        url = "http://10.0.0.5:1317"

        [policies.evm]
        threshold = "500000000000000000"
        top_up_amount = "2000000000000000000"
        poll_interval_secs = 15

        [chains.ganache1]
        rpcs = ["http://localhost:7545", "http://localhost:7546"]
        wss = ["ws://localhost:7545"]

        [chains.lisk-testnet]
        rpcs = ["https://testnet-service.lisk.com"]
        network_id = "15f0dacc1060e91818224a94286b13aa04279c640bd5d6f193182031d133df7c"
        "#,
    );

    let config = load_config(file.path()).unwrap();
    assert_eq!(config.chains.len(), 2);
    assert_eq!(config.chains["ganache1"].rpcs[1], "http://localhost:7546");
    assert_eq!(config.chain_family("lisk-testnet"), Some(ChainFamily::Lisk));
    assert_eq!(config.vaults_path.as_deref(), Some("vaults.json"));

    let evm = FundingPolicy::from(&config.policies.for_family(ChainFamily::Evm));
    assert_eq!(evm.threshold, Amount::from(500_000_000_000_000_000u64));
    assert_eq!(evm.poll_interval, Duration::from_secs(15));
    assert_eq!(evm.confirmation_timeout, Duration::from_secs(120));

    let lisk = FundingPolicy::from(&config.policies.for_family(ChainFamily::Lisk));
    assert_eq!(lisk.poll_interval, Duration::from_secs(1800));
}

#[test]
fn test_missing_file() {
    let err = load_config(std::path::Path::new("/nonexistent/chains.toml")).unwrap_err();
    assert!(matches!(err, ConfigError::Io { .. }));
    assert!(err.to_string().contains("/nonexistent/chains.toml"));
}

#[test]
fn test_syntax_error() {
    let file = write_file("[chains.ganache1\nrpcs = 3");
    assert!(matches!(load_config(file.path()), Err(ConfigError::Parse { .. })));
}

#[test]
fn test_validation_errors_are_collected() {
    let file = write_file(
        r#"
        [policies.lisk]
        threshold = 100
        top_up_amount = 100

        [chains.ganache1]
        rpcs = []

        [chains.lisk-mainnet]
        rpcs = ["https://service.lisk.com"]
        "#,
    );

    let Err(ConfigError::Validation(errors)) = load_config(file.path()) else {
        panic!("expected validation failure");
    };
    assert_eq!(errors.len(), 3);
    assert!(errors.contains(&ValidationError::NoEndpoints {
        chain: "ganache1".to_string()
    }));
    assert!(errors
        .iter()
        .any(|e| matches!(e, ValidationError::InvalidNetworkId { chain, .. } if chain == "lisk-mainnet")));
    assert!(errors
        .iter()
        .any(|e| matches!(e, ValidationError::ThresholdNotBelowTopUp { family: ChainFamily::Lisk, .. })));
}

#[test]
fn test_load_vaults() {
    let file = write_file(
        r#"[
            {"id": "v1", "chain": "ganache1", "address": "0xabc", "token": "NATIVE"},
            {"id": "v2", "chain": "lisk-testnet", "address": "lskxyz"}
        ]"#,
    );

    let vaults = load_vaults(file.path()).unwrap();
    assert_eq!(vaults.len(), 2);
    assert_eq!(vaults[0].chain, "ganache1");
    assert_eq!(vaults[1].token, "");
}

#[test]
fn test_malformed_vaults() {
    let file = write_file(r#"{"id": "not-a-list"}"#);
    assert!(matches!(load_vaults(file.path()), Err(ConfigError::Vaults { .. })));
}
