//! ERC20 call encoding and return decoding.

use alloy::primitives::{Address, Bytes, U256};
use alloy::sol;
use alloy::sol_types::SolCall;

use crate::blockchain::types::{FacadeError, FacadeResult};

sol! {
    /// The subset of ERC20 this crate talks to.
    interface IERC20 {
        function balanceOf(address account) external view returns (uint256);
        function decimals() external view returns (uint8);
        function symbol() external view returns (string);
        function name() external view returns (string);
        function transfer(address to, uint256 amount) external returns (bool);
    }
}

/// Calldata for `transfer(to, amount)`.
pub fn transfer_call(to: Address, amount: U256) -> Bytes {
    IERC20::transferCall { to, amount }.abi_encode().into()
}

/// Decode the return data of a contract call.
pub fn decode_returns<C: SolCall>(data: &[u8]) -> FacadeResult<C::Return> {
    C::abi_decode_returns(data)
        .map_err(|e| FacadeError::Decode(format!("{} returned malformed data: {}", C::SIGNATURE, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn word(value: u64) -> Vec<u8> {
        U256::from(value).to_be_bytes::<32>().to_vec()
    }

    #[test]
    fn test_selectors() {
        let call = IERC20::balanceOfCall {
            account: Address::ZERO,
        }
        .abi_encode();
        assert_eq!(&call[..4], &[0x70, 0xa0, 0x82, 0x31]);
        assert_eq!(call.len(), 4 + 32);

        let call = transfer_call(Address::repeat_byte(0x22), U256::from(10u8));
        assert_eq!(&call[..4], &[0xa9, 0x05, 0x9c, 0xbb]);
        assert_eq!(call.len(), 4 + 64);
        assert_eq!(call[4 + 63], 10);

        assert_eq!(IERC20::decimalsCall::SELECTOR, [0x31, 0x3c, 0xe5, 0x67]);
    }

    #[test]
    fn test_decode_uint_returns() {
        let balance = decode_returns::<IERC20::balanceOfCall>(&word(1_234_500)).unwrap();
        assert_eq!(balance, U256::from(1_234_500u64));

        let decimals = decode_returns::<IERC20::decimalsCall>(&word(6)).unwrap();
        assert_eq!(decimals, 6);
    }

    #[test]
    fn test_decode_rejects_short_data() {
        let err = decode_returns::<IERC20::balanceOfCall>(&[0u8; 3]).unwrap_err();
        assert!(matches!(err, FacadeError::Decode(ref msg) if msg.contains("balanceOf")));
    }
}
