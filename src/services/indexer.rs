//! Account indexer client. Lists the ERC-20 holdings of a wallet one
//! cursor-delimited page at a time.

use async_trait::async_trait;
use ethers::types::Address;
use reqwest::{Client, IntoUrl};
use url::Url;

use super::http::{addr2str, logged_json};
use crate::errors::CustomError;
use crate::models::token::IndexerPage;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccountIndexer: Send + Sync {
    /// Fetches one page of the account's token holdings, spam and the native
    /// asset excluded. `None` requests the first page.
    async fn wallet_tokens(
        &self,
        account: Address,
        cursor: Option<String>,
    ) -> Result<IndexerPage, CustomError>;
}

#[derive(Debug)]
pub struct MoralisIndexer {
    client: Client,
    base_url: Url,
    api_key: String,
    chain: String,
}

impl MoralisIndexer {
    pub fn new(
        base_url: impl IntoUrl,
        client: Client,
        api_key: String,
        chain: String,
    ) -> Result<Self, CustomError> {
        Ok(Self {
            client,
            base_url: base_url
                .into_url()
                .map_err(|e| CustomError::ConfigError(e.to_string()))?,
            api_key,
            chain,
        })
    }

    fn wallet_tokens_url(&self, account: Address, cursor: Option<&str>) -> Result<Url, CustomError> {
        let mut url = self
            .base_url
            .join(&format!("wallets/{}/tokens", addr2str(account)))
            .map_err(|e| CustomError::ConfigError(e.to_string()))?;

        url.query_pairs_mut()
            .append_pair("chain", &self.chain)
            .append_pair("exclude_spam", "true")
            .append_pair("exclude_native", "true");
        if let Some(cursor) = cursor {
            url.query_pairs_mut().append_pair("cursor", cursor);
        }

        Ok(url)
    }
}

#[async_trait]
impl AccountIndexer for MoralisIndexer {
    async fn wallet_tokens(
        &self,
        account: Address,
        cursor: Option<String>,
    ) -> Result<IndexerPage, CustomError> {
        let url = self.wallet_tokens_url(account, cursor.as_deref())?;
        log::debug!("query indexer for url {}", url);

        let request = self
            .client
            .get(url)
            .header("X-API-Key", &self.api_key)
            .header("accept", "application/json");
        logged_json("indexer", request).await
    }
}
