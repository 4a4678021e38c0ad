//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Registry keys → Chain targets → Faucet keys → Clients → Spawn watchers
//!
//! Shutdown (shutdown.rs):
//!     Signal received → Cancel tokens → Wait grace period → Abort stragglers
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger graceful shutdown
//! ```
//!
//! # Design Decisions
//! - Ordered startup; any startup error is fatal
//! - Faucet keys derived once per family, shared by all chains of that family
//! - Shutdown has timeout: forced abort after the grace period

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::{Shutdown, ShutdownToken};
pub use startup::{start, StartupError};
