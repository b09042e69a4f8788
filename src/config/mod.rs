//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize)
//!     → CLI flag overrides (rpc url, chain id)
//!     → validation.rs (semantic checks)
//!     → FacadeConfig (validated, immutable)
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks
//! - Secrets never live in the config file; the signing key comes from the
//!   environment

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{FacadeConfig, NodeConfig, ObservabilityConfig, WalletConfig};
pub use validation::{validate_config, ValidationError};
