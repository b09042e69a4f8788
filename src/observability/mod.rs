//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → tracing events with structured fields (address, tx_hash, gas)
//!     → logging.rs subscriber (env filter + fmt layer on stderr)
//! ```
//!
//! # Design Decisions
//! - Structured fields instead of formatted messages
//! - Addresses and hashes are logged; keys and mnemonics never are

pub mod logging;

pub use logging::init_logging;
