use ethers::types::{Address, Bytes, U256};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::u256_decimal;
use crate::errors::CustomError;

/// Status code the aggregator uses for a successful response.
pub const AGGREGATOR_SUCCESS: i64 = 0;

/// Envelope shared by every aggregator endpoint.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AggregatorResponse<T> {
    pub code: i64,
    #[serde(default)]
    pub message: String,
    pub data: Option<T>,
    #[serde(default)]
    pub request_id: Option<String>,
}

/// A validated aggregator answer: either the payload or the reason it was
/// refused.
#[derive(Debug, Clone, PartialEq)]
pub enum AggregatorOutcome<T> {
    Success(T),
    Failure {
        code: i64,
        message: String,
        request_id: Option<String>,
    },
}

impl<T> AggregatorOutcome<T> {
    pub fn success(self) -> Option<T> {
        match self {
            AggregatorOutcome::Success(value) => Some(value),
            AggregatorOutcome::Failure { .. } => None,
        }
    }
}

impl<T> AggregatorResponse<T> {
    /// Checks the status code and makes sure a successful response carries
    /// a payload.
    pub fn into_outcome(self) -> Result<AggregatorOutcome<T>, CustomError> {
        if self.code != AGGREGATOR_SUCCESS {
            return Ok(AggregatorOutcome::Failure {
                code: self.code,
                message: self.message,
                request_id: self.request_id,
            });
        }
        self.data.map(AggregatorOutcome::Success).ok_or_else(|| {
            CustomError::DecodeError("aggregator reported success without data".to_string())
        })
    }
}

/// Route query parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteQuery {
    pub token_in: Address,
    pub token_out: Address,
    pub amount_in: U256,
}

/// Raw `data` object of a route response.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RouteData {
    pub route_summary: Value,
    pub router_address: Address,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RouteSummaryFields {
    token_in: Address,
    #[serde(with = "u256_decimal")]
    amount_in: U256,
    token_out: Address,
    #[serde(with = "u256_decimal")]
    amount_out: U256,
}

/// A quoted swap path. The summary is kept verbatim because the build
/// endpoint expects it back unchanged.
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    pub token_in: Address,
    pub token_out: Address,
    pub amount_in: U256,
    pub amount_out: U256,
    pub router_address: Address,
    pub summary: Value,
}

impl TryFrom<RouteData> for Route {
    type Error = CustomError;

    fn try_from(data: RouteData) -> Result<Self, Self::Error> {
        let fields: RouteSummaryFields = serde_json::from_value(data.route_summary.clone())
            .map_err(|e| CustomError::DecodeError(format!("invalid route summary: {}", e)))?;

        Ok(Route {
            token_in: fields.token_in,
            token_out: fields.token_out,
            amount_in: fields.amount_in,
            amount_out: fields.amount_out,
            router_address: data.router_address,
            summary: data.route_summary,
        })
    }
}

/// Body of a build request.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BuildRequest {
    pub route_summary: Value,
    pub sender: Address,
    pub recipient: Address,
    /// In basis points, 10 = 0.1%.
    pub slippage_tolerance: u32,
}

/// Executable calldata for a route.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BuiltRoute {
    pub router_address: Address,
    pub data: Bytes,
    #[serde(default, with = "u256_decimal")]
    pub amount_in: U256,
}
