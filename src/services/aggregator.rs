//! Swap aggregator client: per-token route quotes and calldata builds.

use async_trait::async_trait;
use reqwest::{Client, IntoUrl};
use url::Url;
use serde::de::DeserializeOwned;

use super::http::{addr2str, decode, logged_query};
use crate::errors::CustomError;
use crate::models::route::{
    AggregatorOutcome, AggregatorResponse, BuildRequest, BuiltRoute, Route, RouteData, RouteQuery,
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SwapAggregator: Send + Sync {
    /// Quotes a route for swapping `amount_in` of `token_in` into `token_out`.
    async fn route(&self, query: RouteQuery) -> Result<AggregatorOutcome<Route>, CustomError>;

    /// Builds executable calldata for a previously quoted route.
    async fn build(&self, request: BuildRequest)
        -> Result<AggregatorOutcome<BuiltRoute>, CustomError>;
}

#[derive(Debug)]
pub struct KyberSwapClient {
    client: Client,
    base_url: Url,
    chain: String,
}

impl KyberSwapClient {
    pub fn new(base_url: impl IntoUrl, client: Client, chain: String) -> Result<Self, CustomError> {
        Ok(Self {
            client,
            base_url: base_url
                .into_url()
                .map_err(|e| CustomError::ConfigError(e.to_string()))?,
            chain,
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, CustomError> {
        self.base_url
            .join(&format!("{}/api/v1/{}", self.chain, path))
            .map_err(|e| CustomError::ConfigError(e.to_string()))
    }

    fn routes_url(&self, query: &RouteQuery) -> Result<Url, CustomError> {
        let mut url = self.endpoint("routes")?;
        url.query_pairs_mut()
            .append_pair("tokenIn", &addr2str(query.token_in))
            .append_pair("tokenOut", &addr2str(query.token_out))
            .append_pair("amountIn", &query.amount_in.to_string());
        Ok(url)
    }
}

/// The aggregator answers refusals with 4xx and a regular envelope, so the
/// body is decoded whatever the status.
fn decode_envelope<T>(
    status: reqwest::StatusCode,
    body: &str,
) -> Result<AggregatorResponse<T>, CustomError>
where
    T: DeserializeOwned,
{
    decode::<AggregatorResponse<T>>("aggregator", body).map_err(|err| {
        if status.is_success() {
            err
        } else {
            CustomError::UpstreamError(format!("aggregator returned {}: {}", status, body))
        }
    })
}

#[async_trait]
impl SwapAggregator for KyberSwapClient {
    async fn route(&self, query: RouteQuery) -> Result<AggregatorOutcome<Route>, CustomError> {
        let url = self.routes_url(&query)?;
        log::debug!("query aggregator routes for url {}", url);

        let (status, body) = logged_query("aggregator", self.client.get(url)).await?;
        let outcome = decode_envelope::<RouteData>(status, &body)?.into_outcome()?;
        Ok(match outcome {
            AggregatorOutcome::Success(data) => AggregatorOutcome::Success(Route::try_from(data)?),
            AggregatorOutcome::Failure {
                code,
                message,
                request_id,
            } => AggregatorOutcome::Failure {
                code,
                message,
                request_id,
            },
        })
    }

    async fn build(
        &self,
        request: BuildRequest,
    ) -> Result<AggregatorOutcome<BuiltRoute>, CustomError> {
        let url = self.endpoint("route/build")?;
        log::debug!("build route for sender {}", addr2str(request.sender));

        let (status, body) =
            logged_query("aggregator", self.client.post(url).json(&request)).await?;
        decode_envelope::<BuiltRoute>(status, &body)?.into_outcome()
    }
}
