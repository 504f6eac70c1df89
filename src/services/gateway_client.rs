//! HTTP client for this service's own endpoints, so a UI host can drive the
//! orchestrator against a remote deployment.

use async_trait::async_trait;
use ethers::types::Address;
use reqwest::{Client, IntoUrl, StatusCode};
use url::Url;
use serde::de::DeserializeOwned;

use super::balance_service::BalanceSource;
use super::calldata_service::CallPlanner;
use super::http::{addr2str, decode, logged_query};
use crate::errors::{ApiError, CustomError};
use crate::models::call::Call;
use crate::models::selection::{CalldataRequest, Selection};
use crate::models::token::TokenHolding;

#[derive(Debug, Clone)]
pub struct GatewayClient {
    client: Client,
    base_url: Url,
}

impl GatewayClient {
    pub fn new(base_url: impl IntoUrl, client: Client) -> Result<Self, CustomError> {
        Ok(Self {
            client,
            base_url: base_url
                .into_url()
                .map_err(|e| CustomError::ConfigError(e.to_string()))?,
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, CustomError> {
        self.base_url
            .join(path)
            .map_err(|e| CustomError::ConfigError(e.to_string()))
    }

    fn tokens_url(&self, account: Address) -> Result<Url, CustomError> {
        let mut url = self.endpoint("api/tokens")?;
        url.query_pairs_mut()
            .append_pair("address", &addr2str(account));
        Ok(url)
    }
}

/// Decodes a gateway reply, turning error bodies back into typed errors.
fn gateway_result<D>(status: StatusCode, body: &str) -> Result<D, CustomError>
where
    D: DeserializeOwned,
{
    if status.is_success() {
        return decode("gateway", body);
    }
    let message = decode::<ApiError>("gateway", body)
        .map(|err| err.error)
        .unwrap_or_else(|_| body.to_string());
    Err(if status.is_client_error() {
        CustomError::ValidationError(message)
    } else {
        CustomError::UpstreamError(format!("gateway returned {}: {}", status, message))
    })
}

#[async_trait]
impl BalanceSource for GatewayClient {
    async fn balances(&self, account: Address) -> Result<Vec<TokenHolding>, CustomError> {
        let url = self.tokens_url(account)?;
        let (status, body) = logged_query("gateway", self.client.get(url)).await?;
        gateway_result(status, &body)
    }
}

#[async_trait]
impl CallPlanner for GatewayClient {
    async fn plan(&self, account: Address, selection: Selection) -> Result<Vec<Call>, CustomError> {
        let url = self.endpoint("api/calldata")?;
        let request = CalldataRequest::new(account, &selection);
        let (status, body) = logged_query("gateway", self.client.post(url).json(&request)).await?;
        gateway_result(status, &body)
    }
}
