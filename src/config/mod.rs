//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! chains.toml
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → FunderConfig (validated, immutable)
//!     → read once by startup to build chain targets and policies
//!
//! vaults.json (optional)
//!     → loader.rs → Vec<Vault> (logged only)
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require a restart
//! - All fields except chain endpoints have defaults to allow minimal configs
//! - Policy defaults depend on the chain family
//! - Validation separates syntactic (serde) from semantic checks

pub mod amount;
pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, load_vaults, ConfigError};
pub use schema::{ChainConfig, FunderConfig, PolicyConfig, Vault};
pub use validation::ValidationError;
