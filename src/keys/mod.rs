//! Key material.
//!
//! # Data Flow
//! ```text
//! prompt.rs   (seed phrase, zeroized on drop)
//!     → derive.rs (BIP-39 checksum, one faucet signer per chain family)
//! registry.rs (custody public keys → watched vault address per family)
//! ```
//!
//! # Security Constraints
//! - The seed phrase is read once and never logged
//! - Registry failures are fatal at startup

pub mod derive;
pub mod prompt;
pub mod registry;

pub use derive::{KeyDeriver, KeyError};
pub use prompt::read_seed_phrase;
pub use registry::{CustodyKeys, HttpKeyRegistry, KeyRegistry, KeyType, RegistryError};
