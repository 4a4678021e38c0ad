//! Key registry and Lisk Service clients against stub HTTP services.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use vault_funder::blockchain::lisk::address::lisk32_from_public_key;
use vault_funder::blockchain::lisk::{LiskClient, LiskWallet};
use vault_funder::blockchain::{Amount, ChainClient, ChainFamily, TransferSigner, TxId, TxLookup};
use vault_funder::funding::{ChainTarget, ChainWatcher, FundingPolicy, PollOutcome};
use vault_funder::keys::{HttpKeyRegistry, KeyRegistry, RegistryError};
use vault_funder::lifecycle::Shutdown;

mod common;

const PHRASE: &str = "test test test test test test test test test test test junk";
const NETWORK_ID: [u8; 32] = [0x15; 32];
const TIMEOUT: Duration = Duration::from_secs(5);

#[tokio::test]
async fn test_registry_resolves_watched_addresses() {
    let url = common::start_stub_service(|req| match req.path.as_str() {
        "/tss/pubkeys" => (
            200,
            format!(
                r#"{{"pubkeys":{{"ecdsa":"0279be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798","eddsa":"{}"}}}}"#,
                "44".repeat(32)
            ),
        ),
        _ => (404, String::new()),
    })
    .await;

    let registry = HttpKeyRegistry::new(&url, TIMEOUT).unwrap();
    let keys = registry.public_keys().await.unwrap();

    assert_eq!(
        keys.watched_address(ChainFamily::Evm).unwrap(),
        "0x7E5F4552091A69125d5DfCb7b8C2659029395Bdf"
    );
    assert_eq!(
        keys.watched_address(ChainFamily::Lisk).unwrap(),
        lisk32_from_public_key(&[0x44; 32])
    );
}

#[tokio::test]
async fn test_registry_error_status() {
    let url = common::start_stub_service(|_| (503, "unavailable".to_string())).await;
    let registry = HttpKeyRegistry::new(&url, TIMEOUT).unwrap();
    assert!(matches!(registry.public_keys().await, Err(RegistryError::Status(503))));
}

#[tokio::test]
async fn test_unknown_lisk_account_has_zero_balance() {
    let url = common::start_stub_service(|req| match req.path.as_str() {
        "/api/v2/accounts" => (200, r#"{"data":[],"meta":{"count":0}}"#.to_string()),
        "/api/v2/transactions" => (200, r#"{"data":[],"meta":{"count":0}}"#.to_string()),
        _ => (404, String::new()),
    })
    .await;

    let client = LiskClient::new(&url, NETWORK_ID, TIMEOUT).unwrap();
    assert_eq!(client.get_balance("lskanything").await.unwrap(), Amount::ZERO);
    assert!(client.get_pending_nonce("lskanything").await.is_err());
    assert_eq!(
        client.get_transaction(&TxId("ff".to_string())).await.unwrap(),
        TxLookup::NotFound
    );
}

#[tokio::test]
async fn test_lisk_service_not_found_answer_is_zero_balance() {
    let url = common::start_stub_service(|_| {
        (404, r#"{"error":true,"message":"Account lskanything not found."}"#.to_string())
    })
    .await;

    let client = LiskClient::new(&url, NETWORK_ID, TIMEOUT).unwrap();
    assert_eq!(client.get_balance("lskanything").await.unwrap(), Amount::ZERO);
}

#[tokio::test]
async fn test_lisk_bare_404_and_non_json_are_errors() {
    let misrouted = common::start_stub_service(|_| (404, "404 page not found".to_string())).await;
    let client = LiskClient::new(&misrouted, NETWORK_ID, TIMEOUT).unwrap();
    assert!(client.get_balance("lskanything").await.is_err());
    assert!(client.get_transaction(&TxId("ff".to_string())).await.is_err());

    let html = common::start_stub_service(|_| (200, "<html>maintenance</html>".to_string())).await;
    let client = LiskClient::new(&html, NETWORK_ID, TIMEOUT).unwrap();
    assert!(client.get_balance("lskanything").await.is_err());
}

#[tokio::test]
async fn test_lisk_watcher_skips_misrouted_endpoint() {
    let misrouted = common::start_stub_service(|_| (404, String::new())).await;
    let healthy = common::start_stub_service(|req| match req.path.as_str() {
        "/api/v2/accounts" => (
            200,
            r#"{"data":[{"summary":{"balance":"999999"},"sequence":{"nonce":"0"}}]}"#.to_string(),
        ),
        _ => (404, String::new()),
    })
    .await;

    let policy = FundingPolicy {
        threshold: Amount::from(1000u64),
        top_up_amount: Amount::from(5000u64),
        min_fee: Amount::from(500_000u64),
        poll_interval: Duration::from_secs(30),
        confirmation_timeout: Duration::from_secs(10),
        confirmation_poll_interval: Duration::from_millis(100),
    };
    let target = ChainTarget {
        chain: "lisk-testnet".to_string(),
        endpoints: vec![misrouted.clone(), healthy.clone()],
        watched_address: lisk32_from_public_key(&[0x33; 32]),
        family: ChainFamily::Lisk,
    };
    let clients: Vec<Arc<dyn ChainClient>> = vec![
        Arc::new(LiskClient::new(&misrouted, NETWORK_ID, TIMEOUT).unwrap()),
        Arc::new(LiskClient::new(&healthy, NETWORK_ID, TIMEOUT).unwrap()),
    ];
    let shutdown = Shutdown::new();
    let faucet = LiskWallet::from_passphrase(PHRASE);
    let mut watcher = ChainWatcher::new(target, policy, clients, Arc::new(faucet), shutdown.token());

    match watcher.poll_once().await {
        PollOutcome::Sufficient { balance } => assert_eq!(balance, Amount::from(999_999u64)),
        other => panic!("unexpected outcome {:?}", other),
    }
    assert_eq!(watcher.state().current_endpoint, Some(1));
}

#[tokio::test]
async fn test_lisk_vault_funded_end_to_end() {
    let faucet = LiskWallet::from_passphrase(PHRASE);
    let faucet_address = faucet.address().to_string();
    let vault_address = lisk32_from_public_key(&[0x33; 32]);
    let submitted: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));

    let url = {
        let faucet_address = faucet_address.clone();
        let submitted = submitted.clone();
        common::start_stub_service(move |req| {
            match (req.method.as_str(), req.path.as_str()) {
                ("GET", "/api/v2/accounts") => {
                    let address = req.query.get("address").cloned().unwrap_or_default();
                    let (balance, nonce) = if address == faucet_address {
                        ("100000000000", "3")
                    } else {
                        ("800", "0")
                    };
                    (
                        200,
                        format!(
                            r#"{{"data":[{{"summary":{{"address":"{}","balance":"{}"}},"sequence":{{"nonce":"{}"}}}}]}}"#,
                            address, balance, nonce
                        ),
                    )
                }
                ("GET", "/api/v2/fees") => (
                    200,
                    r#"{"data":{"feeEstimatePerByte":{"low":0,"medium":0,"high":0},"minFeePerByte":1000}}"#
                        .to_string(),
                ),
                ("POST", "/api/v2/transactions") => {
                    submitted.lock().unwrap().push(req.body.clone());
                    (
                        200,
                        r#"{"message":"Transaction payload was successfully passed to the network node","transactionId":"abc123"}"#
                            .to_string(),
                    )
                }
                ("GET", "/api/v2/transactions") => (
                    200,
                    r#"{"data":[{"id":"abc123","isPending":false,"block":{"height":77}}]}"#.to_string(),
                ),
                _ => (404, String::new()),
            }
        })
        .await
    };

    let policy = FundingPolicy {
        threshold: Amount::from(1000u64),
        top_up_amount: Amount::from(5000u64),
        min_fee: Amount::from(500_000u64),
        poll_interval: Duration::from_secs(30),
        confirmation_timeout: Duration::from_secs(10),
        confirmation_poll_interval: Duration::from_millis(100),
    };
    let target = ChainTarget {
        chain: "lisk-testnet".to_string(),
        endpoints: vec![url.clone()],
        watched_address: vault_address,
        family: ChainFamily::Lisk,
    };
    let client: Arc<dyn ChainClient> = Arc::new(LiskClient::new(&url, NETWORK_ID, TIMEOUT).unwrap());
    let shutdown = Shutdown::new();
    let mut watcher = ChainWatcher::new(target, policy, vec![client], Arc::new(faucet), shutdown.token());

    match watcher.poll_once().await {
        PollOutcome::Funded { balance, tx_id } => {
            assert_eq!(balance, Amount::from(800u64));
            assert_eq!(tx_id, TxId("abc123".to_string()));
        }
        other => panic!("unexpected outcome {:?}", other),
    }

    let bodies = submitted.lock().unwrap();
    assert_eq!(bodies.len(), 1);
    let body: serde_json::Value = serde_json::from_str(&bodies[0]).unwrap();
    let raw = hex::decode(body["transaction"].as_str().unwrap()).unwrap();
    assert!(!raw.is_empty());
}
