use ethers::types::Address;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::errors::CustomError;

/// Amount chosen for one token, in human units.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SelectedToken {
    pub amount: String,
    pub decimals: u8,
}

pub type Selection = BTreeMap<Address, SelectedToken>;

#[derive(Debug, Deserialize)]
pub struct TokensQuery {
    pub address: Option<String>,
}

/// Body of `POST /api/calldata`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CalldataRequest {
    pub address: String,
    #[serde(default)]
    pub selected_tokens: BTreeMap<String, SelectedToken>,
}

impl CalldataRequest {
    pub fn new(account: Address, selection: &Selection) -> Self {
        Self {
            address: format!("{:?}", account),
            selected_tokens: selection
                .iter()
                .map(|(token, selected)| (format!("{:?}", token), selected.clone()))
                .collect(),
        }
    }

    /// Parses the loosely typed body into an account and a selection.
    pub fn validate(self) -> Result<(Address, Selection), CustomError> {
        let account = parse_address(&self.address)?;
        let selection = self
            .selected_tokens
            .into_iter()
            .map(|(token, selected)| Ok((parse_address(&token)?, selected)))
            .collect::<Result<Selection, CustomError>>()?;

        Ok((account, selection))
    }
}

pub fn parse_address(address: &str) -> Result<Address, CustomError> {
    address
        .trim()
        .parse::<Address>()
        .map_err(|_| CustomError::InvalidAddressError(address.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validates_calldata_request() {
        let request: CalldataRequest = serde_json::from_str(
            r#"{
                "address": "0x00000000219ab540356cBB839Cbe05303d7705Fa",
                "selectedTokens": {
                    "0x833589fCD6eDb6E08f4c7C32D4f71b54bdA02913": { "amount": "50", "decimals": 6 }
                }
            }"#,
        )
        .unwrap();

        let (account, selection) = request.validate().unwrap();
        assert_eq!(
            format!("{:?}", account),
            "0x00000000219ab540356cbb839cbe05303d7705fa"
        );
        let usdc = parse_address("0x833589fcd6edb6e08f4c7c32d4f71b54bda02913").unwrap();
        assert_eq!(selection[&usdc].amount, "50");
        assert_eq!(selection[&usdc].decimals, 6);
    }

    #[test]
    fn rejects_bad_token_key() {
        let mut selected_tokens = BTreeMap::new();
        selected_tokens.insert(
            "not-a-token".to_string(),
            SelectedToken {
                amount: "1".to_string(),
                decimals: 18,
            },
        );
        let request = CalldataRequest {
            address: format!("{:?}", Address::repeat_byte(1)),
            selected_tokens,
        };

        assert_eq!(
            request.validate(),
            Err(CustomError::InvalidAddressError("not-a-token".to_string()))
        );
    }
}
