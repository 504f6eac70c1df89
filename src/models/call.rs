use ethers::{
    abi::{self, Token},
    types::{Address, Bytes, U256},
    utils::id,
};
use serde::{Deserialize, Serialize};

use super::u256_decimal;

pub const APPROVE_SIGNATURE: &str = "approve(address,uint256)";

/// A single contract call inside a batched wallet request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Call {
    pub to: Address,
    pub data: Bytes,
    #[serde(with = "u256_decimal")]
    pub value: U256,
}

impl Call {
    /// ERC-20 `approve(spender, amount)` on `token`.
    pub fn approve(token: Address, spender: Address, amount: U256) -> Self {
        let mut data = id(APPROVE_SIGNATURE).to_vec();
        data.extend(abi::encode(&[Token::Address(spender), Token::Uint(amount)]));

        Self {
            to: token,
            data: data.into(),
            value: U256::zero(),
        }
    }

    /// Router call with aggregator-built calldata.
    pub fn swap(router: Address, data: Bytes) -> Self {
        Self {
            to: router,
            data,
            value: U256::zero(),
        }
    }
}
