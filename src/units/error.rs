//! Amount conversion errors.

use thiserror::Error;

/// Errors raised while converting between display and raw amounts.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UnitsError {
    /// The input is not a syntactically valid decimal numeral.
    #[error("Invalid decimal amount '{0}'")]
    InvalidFormat(String),

    /// The scaled value does not fit the target integer type.
    #[error("Amount '{input}' overflows {target}")]
    Overflow { input: String, target: &'static str },
}
