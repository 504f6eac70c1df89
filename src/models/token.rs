use ethers::types::{Address, U256};
use serde::{Deserialize, Serialize};

use super::u256_decimal;

/// One page of the account indexer's token listing.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct IndexerPage {
    #[serde(default)]
    pub cursor: Option<String>,
    #[serde(default)]
    pub result: Vec<IndexedToken>,
}

impl IndexerPage {
    /// The cursor for the following page, if any.
    pub fn next_cursor(&self) -> Option<String> {
        self.cursor.clone().filter(|cursor| !cursor.is_empty())
    }
}

/// A token holding as reported by the account indexer.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct IndexedToken {
    pub token_address: Address,
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub logo: Option<String>,
    #[serde(default)]
    pub thumbnail: Option<String>,
    #[serde(with = "u256_decimal")]
    pub balance: U256,
    #[serde(default)]
    pub decimals: Option<u8>,
    #[serde(default)]
    pub balance_formatted: Option<String>,
    #[serde(default)]
    pub possible_spam: bool,
}

/// A token holding annotated with its USD unit price.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TokenHolding {
    pub token_address: Address,
    pub symbol: String,
    pub name: Option<String>,
    pub logo: Option<String>,
    pub thumbnail: Option<String>,
    #[serde(with = "u256_decimal")]
    pub balance: U256,
    pub decimals: u8,
    pub balance_formatted: String,
    pub possible_spam: bool,
    #[serde(rename = "usdPrice")]
    pub usd_price: f64,
}

impl TokenHolding {
    pub fn from_indexed(token: IndexedToken, usd_price: f64) -> Self {
        let decimals = token.decimals.unwrap_or_default();
        let balance_formatted = token
            .balance_formatted
            .unwrap_or_else(|| u256_decimal::format_units(token.balance, decimals));

        Self {
            token_address: token.token_address,
            symbol: token.symbol.unwrap_or_default(),
            name: token.name,
            logo: token.logo,
            thumbnail: token.thumbnail,
            balance: token.balance,
            decimals,
            balance_formatted,
            possible_spam: token.possible_spam,
            usd_price,
        }
    }

    /// Balance in human units, trimmed.
    pub fn display_balance(&self) -> String {
        u256_decimal::format_units(self.balance, self.decimals)
    }

    /// USD worth of the whole holding.
    pub fn usd_value(&self) -> f64 {
        self.balance_formatted.parse::<f64>().unwrap_or_default() * self.usd_price
    }

    /// Unpriced tokens cannot be swept.
    pub fn is_priced(&self) -> bool {
        self.usd_price > 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"{
        "cursor": "",
        "page": 1,
        "page_size": 100,
        "result": [
            {
                "token_address": "0x833589fcd6edb6e08f4c7c32d4f71b54bda02913",
                "symbol": "USDC",
                "name": "USD Coin",
                "logo": null,
                "thumbnail": null,
                "decimals": 6,
                "balance": "12500000",
                "possible_spam": false,
                "verified_contract": true,
                "balance_formatted": "12.5",
                "usd_price": null
            }
        ]
    }"#;

    #[test]
    fn parses_indexer_page() {
        let page: IndexerPage = serde_json::from_str(PAGE).unwrap();
        assert_eq!(page.next_cursor(), None);
        assert_eq!(page.result.len(), 1);

        let token = &page.result[0];
        assert_eq!(token.symbol.as_deref(), Some("USDC"));
        assert_eq!(token.balance, U256::from(12_500_000));
        assert_eq!(token.decimals, Some(6));
    }

    #[test]
    fn holding_serializes_with_usd_price_key() {
        let page: IndexerPage = serde_json::from_str(PAGE).unwrap();
        let holding = TokenHolding::from_indexed(page.result[0].clone(), 0.9998);
        let json = serde_json::to_value(&holding).unwrap();

        assert_eq!(json["usdPrice"], 0.9998);
        assert_eq!(json["balance"], "12500000");
        assert_eq!(
            json["token_address"],
            "0x833589fcd6edb6e08f4c7c32d4f71b54bda02913"
        );
        assert!((holding.usd_value() - 12.49750).abs() < 1e-9);
    }

    #[test]
    fn missing_formatted_balance_is_derived() {
        let token = IndexedToken {
            token_address: Address::repeat_byte(0x11),
            symbol: None,
            name: None,
            logo: None,
            thumbnail: None,
            balance: U256::from(1_500),
            decimals: Some(3),
            balance_formatted: None,
            possible_spam: false,
        };
        let holding = TokenHolding::from_indexed(token, 0.0);

        assert_eq!(holding.balance_formatted, "1.5");
        assert_eq!(holding.symbol, "");
        assert!(!holding.is_priced());
    }
}
