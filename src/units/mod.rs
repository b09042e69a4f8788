//! Fixed-point amount conversion.
//!
//! # Data Flow
//! ```text
//! "1.5" (display, human units)
//!     → convert::from_display (parse, scale by 10^decimals, truncate)
//!     → U256 raw amount (smallest on-chain unit)
//!     → convert::to_display (divide, truncate, strip trailing zeros)
//!     → "1.5"
//! ```
//!
//! # Design Decisions
//! - Exact integer arithmetic only; no binary floating point anywhere
//! - `10^decimals` is an exact `U256` power, never `powf`
//! - Fractions below the precision are dropped, never rounded
//! - The legacy 9-decimal pair narrows to `i64` and reports `Overflow`
//!   instead of wrapping; the ether pair is bounded only by 256 bits

pub mod convert;
pub mod error;

pub use convert::{
    from_display, from_ether, from_wei, to_display, to_ether, to_wei, ETHER_DECIMALS,
    LEGACY_WEI_DECIMALS,
};
pub use error::UnitsError;
