//! Watch-and-fund engine.
//!
//! # Data Flow
//! ```text
//! ChainTarget + FundingPolicy + clients + signer
//!     → supervisor.rs (one task per chain)
//!     → watcher.rs (poll balance, apply threshold, sleep)
//!     → executor.rs (nonce → fee → sign → submit)
//!     → confirmation.rs (poll lookup until confirmed or timed out)
//! ```
//!
//! Results flow back into the watcher loop only; nothing is persisted.

pub mod confirmation;
pub mod executor;
pub mod supervisor;
pub mod types;
pub mod watcher;

pub use executor::FundingExecutor;
pub use supervisor::WatcherSupervisor;
pub use types::{ChainTarget, FundingError, FundingPolicy, PollOutcome, SharedPhase, WatcherPhase};
pub use watcher::ChainWatcher;
