//! Metrics collection and exposition.
//!
//! # Metrics
//! - `funder_vault_balance` (gauge): last observed vault balance in base units, by chain
//! - `funder_funding_total` (counter): funding attempts by chain, outcome
//! - `funder_rpc_errors_total` (counter): failed RPC calls by chain, operation
//! - `funder_confirmation_seconds` (histogram): broadcast-to-confirmation latency by chain

use std::net::SocketAddr;
use std::time::Duration;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

use crate::blockchain::types::Amount;

/// Install the Prometheus recorder and its scrape listener on `addr`.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

pub fn record_balance(chain: &str, balance: Amount) {
    // Saturates for balances beyond u128; the gauge is informational.
    let value = u128::try_from(balance).unwrap_or(u128::MAX) as f64;
    gauge!("funder_vault_balance", "chain" => chain.to_string()).set(value);
}

/// Count one funding attempt. `outcome` is `confirmed` or a failure label.
pub fn record_funding(chain: &str, outcome: &'static str) {
    counter!("funder_funding_total", "chain" => chain.to_string(), "outcome" => outcome).increment(1);
}

pub fn record_rpc_error(chain: &str, operation: &'static str) {
    counter!("funder_rpc_errors_total", "chain" => chain.to_string(), "operation" => operation)
        .increment(1);
}

pub fn record_confirmation_time(chain: &str, elapsed: Duration) {
    histogram!("funder_confirmation_seconds", "chain" => chain.to_string())
        .record(elapsed.as_secs_f64());
}
