use async_trait::async_trait;
use ethers::types::Address;
use futures::future::join_all;
use std::sync::Arc;

use super::aggregator::SwapAggregator;
use crate::errors::CustomError;
use crate::models::call::Call;
use crate::models::route::{AggregatorOutcome, BuildRequest, BuiltRoute, Route, RouteQuery};
use crate::models::selection::Selection;
use crate::models::u256_decimal::parse_amount;

/// 0.1%, in basis points.
pub const SLIPPAGE_TOLERANCE_BPS: u32 = 10;

/// Placeholder the aggregator uses for the chain's native asset.
pub fn native_token() -> Address {
    Address::repeat_byte(0xee)
}

/// Anything that can turn a selection into an ordered call list.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CallPlanner: Send + Sync {
    async fn plan(&self, account: Address, selection: Selection) -> Result<Vec<Call>, CustomError>;
}

pub struct CalldataService {
    aggregator: Arc<dyn SwapAggregator>,
}

impl CalldataService {
    pub fn new(aggregator: Arc<dyn SwapAggregator>) -> Self {
        Self { aggregator }
    }

    /// Builds the sweep call list: every approval first, then every swap,
    /// both in route order. Tokens without a route are dropped.
    pub async fn build_calls(
        &self,
        account: Address,
        selection: &Selection,
    ) -> Result<Vec<Call>, CustomError> {
        let queries = selection
            .iter()
            .map(|(token, selected)| {
                Ok(RouteQuery {
                    token_in: *token,
                    token_out: native_token(),
                    amount_in: parse_amount(&selected.amount, selected.decimals)?,
                })
            })
            .collect::<Result<Vec<_>, CustomError>>()?;

        let routes = self.fetch_routes(queries).await;
        let built = self.build_routes(account, routes).await;

        let (approvals, swaps): (Vec<_>, Vec<_>) = built
            .into_iter()
            .map(|(route, build)| {
                (
                    Call::approve(route.token_in, route.router_address, route.amount_in),
                    Call::swap(build.router_address, build.data),
                )
            })
            .unzip();

        log::info!(
            "built {} calls for {} selected tokens of {:?}",
            approvals.len() + swaps.len(),
            selection.len(),
            account
        );
        Ok(approvals.into_iter().chain(swaps).collect())
    }

    async fn fetch_routes(&self, queries: Vec<RouteQuery>) -> Vec<Route> {
        let responses = join_all(queries.into_iter().map(|query| {
            let token = query.token_in;
            async move { (token, self.aggregator.route(query).await) }
        }))
        .await;

        responses
            .into_iter()
            .filter_map(|(token, response)| match response {
                Ok(AggregatorOutcome::Success(route)) => Some(route),
                Ok(AggregatorOutcome::Failure {
                    code,
                    message,
                    request_id,
                }) => {
                    log::info!(
                        "no route for {:?} (code {}, request {:?}): {}",
                        token,
                        code,
                        request_id,
                        message
                    );
                    None
                }
                Err(err) => {
                    log::warn!("route request for {:?} failed: {}", token, err);
                    None
                }
            })
            .collect()
    }

    /// Keeps only routes whose calldata could be built, so each surviving
    /// route yields exactly one approval and one swap.
    async fn build_routes(&self, account: Address, routes: Vec<Route>) -> Vec<(Route, BuiltRoute)> {
        let responses = join_all(routes.iter().map(|route| {
            self.aggregator.build(BuildRequest {
                route_summary: route.summary.clone(),
                sender: account,
                recipient: account,
                slippage_tolerance: SLIPPAGE_TOLERANCE_BPS,
            })
        }))
        .await;

        routes
            .into_iter()
            .zip(responses)
            .filter_map(|(route, response)| match response {
                Ok(AggregatorOutcome::Success(built)) => Some((route, built)),
                Ok(AggregatorOutcome::Failure {
                    code,
                    message,
                    request_id,
                }) => {
                    log::warn!(
                        "build failed for {:?} (code {}, request {:?}): {}",
                        route.token_in,
                        code,
                        request_id,
                        message
                    );
                    None
                }
                Err(err) => {
                    log::warn!("build request for {:?} failed: {}", route.token_in, err);
                    None
                }
            })
            .collect()
    }
}

#[async_trait]
impl CallPlanner for CalldataService {
    async fn plan(&self, account: Address, selection: Selection) -> Result<Vec<Call>, CustomError> {
        self.build_calls(account, &selection).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::call::APPROVE_SIGNATURE;
    use crate::models::selection::SelectedToken;
    use crate::services::aggregator::MockSwapAggregator;
    use ethers::types::{Bytes, U256};
    use ethers::utils::id;
    use serde_json::json;

    fn account() -> Address {
        Address::repeat_byte(0xaa)
    }

    fn router() -> Address {
        Address::repeat_byte(0x77)
    }

    fn selection(tokens: &[(u8, &str, u8)]) -> Selection {
        tokens
            .iter()
            .map(|(byte, amount, decimals)| {
                (
                    Address::repeat_byte(*byte),
                    SelectedToken {
                        amount: amount.to_string(),
                        decimals: *decimals,
                    },
                )
            })
            .collect()
    }

    fn route_for(query: &RouteQuery) -> Route {
        Route {
            token_in: query.token_in,
            token_out: query.token_out,
            amount_in: query.amount_in,
            amount_out: U256::from(1),
            router_address: router(),
            summary: json!({ "tokenIn": format!("{:?}", query.token_in) }),
        }
    }

    /// Swap calldata tagged with the input token so pairing can be checked.
    fn built_for(request: &BuildRequest) -> BuiltRoute {
        let token: Address = request.route_summary["tokenIn"]
            .as_str()
            .unwrap()
            .parse()
            .unwrap();
        BuiltRoute {
            router_address: router(),
            data: Bytes::from(token.as_bytes().to_vec()),
            amount_in: U256::zero(),
        }
    }

    fn aggregator_with_failing(codes: Vec<(u8, i64)>) -> MockSwapAggregator {
        let mut aggregator = MockSwapAggregator::new();
        aggregator.expect_route().returning(move |query| {
            let code = codes
                .iter()
                .find(|(byte, _)| query.token_in == Address::repeat_byte(*byte))
                .map(|(_, code)| *code)
                .unwrap_or(0);
            Ok(if code == 0 {
                AggregatorOutcome::Success(route_for(&query))
            } else {
                AggregatorOutcome::Failure {
                    code,
                    message: "route not found".to_string(),
                    request_id: None,
                }
            })
        });
        aggregator
    }

    #[tokio::test]
    async fn end_to_end_single_token() {
        let mut aggregator = MockSwapAggregator::new();
        aggregator
            .expect_route()
            .times(1)
            .returning(|query| {
                assert_eq!(query.token_out, native_token());
                assert_eq!(query.amount_in, U256::from(50_000_000));
                Ok(AggregatorOutcome::Success(route_for(&query)))
            });
        aggregator.expect_build().times(1).returning(|request| {
            assert_eq!(request.sender, account());
            assert_eq!(request.recipient, account());
            assert_eq!(request.slippage_tolerance, SLIPPAGE_TOLERANCE_BPS);
            Ok(AggregatorOutcome::Success(built_for(&request)))
        });

        let service = CalldataService::new(Arc::new(aggregator));
        let calls = service
            .build_calls(account(), &selection(&[(0x01, "50", 6)]))
            .await
            .unwrap();

        assert_eq!(calls.len(), 2);
        let token = Address::repeat_byte(0x01);
        assert_eq!(calls[0], Call::approve(token, router(), U256::from(50_000_000)));
        assert_eq!(&calls[0].data[..4], &id(APPROVE_SIGNATURE));
        assert_eq!(calls[1].to, router());
        assert_eq!(calls[1].data.to_vec(), token.as_bytes().to_vec());
        assert_eq!(calls[1].value, U256::zero());
    }

    #[tokio::test]
    async fn no_route_yields_empty_list() {
        let mut aggregator = aggregator_with_failing(vec![(0x01, 4008)]);
        aggregator.expect_build().never();

        let service = CalldataService::new(Arc::new(aggregator));
        let calls = service
            .build_calls(account(), &selection(&[(0x01, "50", 6)]))
            .await
            .unwrap();

        assert!(calls.is_empty());
    }

    #[tokio::test]
    async fn only_successful_routes_are_built_and_paired() {
        let mut aggregator = aggregator_with_failing(vec![(0x02, 4008), (0x04, 4011)]);
        aggregator
            .expect_build()
            .times(3)
            .returning(|request| Ok(AggregatorOutcome::Success(built_for(&request))));

        let service = CalldataService::new(Arc::new(aggregator));
        let calls = service
            .build_calls(
                account(),
                &selection(&[
                    (0x01, "1", 18),
                    (0x02, "2", 18),
                    (0x03, "3", 18),
                    (0x04, "4", 18),
                    (0x05, "5", 18),
                ]),
            )
            .await
            .unwrap();

        assert_eq!(calls.len(), 6);
        let (approvals, swaps) = calls.split_at(3);
        let approve_selector = id(APPROVE_SIGNATURE);
        assert!(approvals.iter().all(|call| call.data[..4] == approve_selector));
        assert!(swaps.iter().all(|call| call.to == router()));
        for (approval, swap) in approvals.iter().zip(swaps) {
            assert_eq!(swap.data.to_vec(), approval.to.as_bytes().to_vec());
        }
        let swept = approvals.iter().map(|call| call.to).collect::<Vec<_>>();
        assert_eq!(
            swept,
            [0x01, 0x03, 0x05].map(Address::repeat_byte).to_vec()
        );
    }

    #[tokio::test]
    async fn failed_build_drops_the_whole_pair() {
        let mut aggregator = aggregator_with_failing(vec![]);
        aggregator.expect_build().returning(|request| {
            let built = built_for(&request);
            if built.data.to_vec() == Address::repeat_byte(0x02).as_bytes().to_vec() {
                Err(CustomError::NetworkError("reset".to_string()))
            } else {
                Ok(AggregatorOutcome::Success(built))
            }
        });

        let service = CalldataService::new(Arc::new(aggregator));
        let calls = service
            .build_calls(account(), &selection(&[(0x01, "1", 18), (0x02, "1", 18)]))
            .await
            .unwrap();

        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].to, Address::repeat_byte(0x01));
    }

    #[tokio::test]
    async fn transport_error_on_route_drops_token() {
        let mut aggregator = MockSwapAggregator::new();
        aggregator.expect_route().returning(|query| {
            if query.token_in == Address::repeat_byte(0x01) {
                Err(CustomError::UpstreamError("502".to_string()))
            } else {
                Ok(AggregatorOutcome::Success(route_for(&query)))
            }
        });
        aggregator
            .expect_build()
            .times(1)
            .returning(|request| Ok(AggregatorOutcome::Success(built_for(&request))));

        let service = CalldataService::new(Arc::new(aggregator));
        let calls = service
            .build_calls(account(), &selection(&[(0x01, "1", 18), (0x02, "1", 18)]))
            .await
            .unwrap();

        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].to, Address::repeat_byte(0x02));
    }

    #[tokio::test]
    async fn invalid_amount_is_rejected_before_any_request() {
        let mut aggregator = MockSwapAggregator::new();
        aggregator.expect_route().never();

        let service = CalldataService::new(Arc::new(aggregator));
        let result = service
            .build_calls(account(), &selection(&[(0x01, "ten", 18)]))
            .await;

        assert_eq!(
            result,
            Err(CustomError::InvalidAmountError("ten".to_string()))
        );
    }

    #[tokio::test]
    async fn empty_selection_makes_no_requests() {
        let mut aggregator = MockSwapAggregator::new();
        aggregator.expect_route().never();
        aggregator.expect_build().never();

        let service = CalldataService::new(Arc::new(aggregator));
        let calls = service.build_calls(account(), &Selection::new()).await.unwrap();
        assert!(calls.is_empty());
    }
}
