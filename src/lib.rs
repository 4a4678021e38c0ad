//! Multi-chain vault gas top-up service library.

pub mod blockchain;
pub mod config;
pub mod funding;
pub mod keys;
pub mod lifecycle;
pub mod observability;

pub use config::schema::FunderConfig;
pub use funding::WatcherSupervisor;
pub use lifecycle::Shutdown;
