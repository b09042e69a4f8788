//! Address validation.
//!
//! Syntactic checks run before any request reaches the node, so a malformed
//! address never costs a round trip.

use alloy::primitives::Address;

use crate::blockchain::types::{FacadeError, FacadeResult};

/// Length of the hex body of an address, excluding the `0x` prefix.
pub const ADDRESS_HEX_LENGTH: usize = 40;

/// Returns true for `0x` followed by exactly 40 hex digits (any case).
pub fn is_valid_address(input: &str) -> bool {
    let Some(body) = input.strip_prefix("0x") else {
        return false;
    };
    body.len() == ADDRESS_HEX_LENGTH && body.bytes().all(|b| b.is_ascii_hexdigit())
}

/// Validate and parse an address string.
pub fn parse_address(input: &str) -> FacadeResult<Address> {
    if !is_valid_address(input) {
        return Err(FacadeError::InvalidAddress(input.to_string()));
    }
    input
        .parse()
        .map_err(|_| FacadeError::InvalidAddress(input.to_string()))
}

/// Render an address in EIP-55 mixed-case form.
pub fn checksum_address(input: &str) -> FacadeResult<String> {
    Ok(parse_address(input)?.to_checksum(None))
}
