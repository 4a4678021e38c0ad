//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Watchers, executor, key registry produce:
//!     → logging.rs (structured log events via tracing)
//!     → metrics.rs (gauges, counters, histograms)
//!
//! Consumers:
//!     → stdout (pretty or JSON)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Structured fields (`chain`, `endpoint`, `tx_id`) on every event
//! - Seed phrases and private keys are never logged
//! - Metric updates are no-ops until a recorder is installed

pub mod logging;
pub mod metrics;
