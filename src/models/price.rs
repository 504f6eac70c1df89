use ethers::types::Address;
use serde::{Deserialize, Deserializer};
use std::collections::HashMap;

/// USD unit prices keyed by token address.
pub type PriceMap = HashMap<Address, f64>;

/// Response of the multi-token price lookup.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct MultiTokenResponse {
    #[serde(default)]
    pub data: Vec<PricedToken>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct PricedToken {
    pub attributes: PricedTokenAttributes,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct PricedTokenAttributes {
    pub address: Address,
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_decimal_f64")]
    pub price_usd: Option<f64>,
}

impl MultiTokenResponse {
    pub fn into_prices(self) -> PriceMap {
        self.data
            .into_iter()
            .map(|token| {
                let attributes = token.attributes;
                (attributes.address, attributes.price_usd.unwrap_or_default())
            })
            .collect()
    }
}

fn deserialize_optional_decimal_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Price {
        Text(String),
        Number(f64),
    }

    Ok(match Option::<Price>::deserialize(deserializer)? {
        Some(Price::Text(text)) => text.parse::<f64>().ok(),
        Some(Price::Number(number)) => Some(number),
        None => None,
    })
}
