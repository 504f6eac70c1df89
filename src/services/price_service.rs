//! Market-data client for batched USD price lookups.

use async_trait::async_trait;
use ethers::types::Address;
use reqwest::{Client, IntoUrl};
use url::Url;

use super::http::{addr2str, logged_json};
use crate::errors::CustomError;
use crate::models::price::{MultiTokenResponse, PriceMap};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PriceSource: Send + Sync {
    /// Looks up USD prices for one batch of tokens. Tokens the service does
    /// not know are simply absent from the result.
    async fn token_prices(&self, tokens: Vec<Address>) -> Result<PriceMap, CustomError>;
}

#[derive(Debug)]
pub struct GeckoTerminalPrices {
    client: Client,
    base_url: Url,
    network: String,
}

impl GeckoTerminalPrices {
    pub fn new(base_url: impl IntoUrl, client: Client, network: String) -> Result<Self, CustomError> {
        Ok(Self {
            client,
            base_url: base_url
                .into_url()
                .map_err(|e| CustomError::ConfigError(e.to_string()))?,
            network,
        })
    }

    fn multi_url(&self, tokens: &[Address]) -> Result<Url, CustomError> {
        let joined = tokens
            .iter()
            .copied()
            .map(addr2str)
            .collect::<Vec<_>>()
            .join(",");
        self.base_url
            .join(&format!("networks/{}/tokens/multi/{}", self.network, joined))
            .map_err(|e| CustomError::ConfigError(e.to_string()))
    }
}

#[async_trait]
impl PriceSource for GeckoTerminalPrices {
    async fn token_prices(&self, tokens: Vec<Address>) -> Result<PriceMap, CustomError> {
        if tokens.is_empty() {
            return Ok(PriceMap::new());
        }

        let url = self.multi_url(&tokens)?;
        log::debug!("query price service for {} tokens", tokens.len());
        let request = self.client.get(url).header("accept", "application/json");
        let response: MultiTokenResponse = logged_json("price service", request).await?;

        Ok(response.into_prices())
    }
}
