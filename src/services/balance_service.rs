use async_trait::async_trait;
use ethers::types::Address;
use std::collections::HashSet;
use std::sync::Arc;

use super::indexer::AccountIndexer;
use super::price_service::PriceSource;
use crate::errors::CustomError;
use crate::models::price::PriceMap;
use crate::models::token::{IndexedToken, TokenHolding};

/// Maximum number of tokens per price lookup.
pub const PRICE_BATCH_SIZE: usize = 30;

/// Anything that can list an account's priced holdings.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BalanceSource: Send + Sync {
    async fn balances(&self, account: Address) -> Result<Vec<TokenHolding>, CustomError>;
}

/// Merges indexer holdings with market prices. Both stages fail soft: the
/// caller always gets a list, possibly empty or unpriced.
pub struct BalanceService {
    indexer: Arc<dyn AccountIndexer>,
    prices: Arc<dyn PriceSource>,
}

impl BalanceService {
    pub fn new(indexer: Arc<dyn AccountIndexer>, prices: Arc<dyn PriceSource>) -> Self {
        Self { indexer, prices }
    }

    pub async fn token_balances(&self, account: Address) -> Vec<TokenHolding> {
        let tokens = self.fetch_holdings(account).await;
        let addresses = tokens
            .iter()
            .map(|token| token.token_address)
            .collect::<Vec<_>>();
        let prices = self.fetch_prices(&addresses).await;

        tokens
            .into_iter()
            .map(|token| {
                let price = prices.get(&token.token_address).copied().unwrap_or_default();
                TokenHolding::from_indexed(token, price)
            })
            .collect()
    }

    /// Walks the indexer cursor until it is exhausted. Any failure discards
    /// the pages gathered so far.
    async fn fetch_holdings(&self, account: Address) -> Vec<IndexedToken> {
        let mut holdings = Vec::new();
        let mut cursor = None;

        loop {
            let page = match self.indexer.wallet_tokens(account, cursor.take()).await {
                Ok(page) => page,
                Err(err) => {
                    log::error!("failed to fetch token balances for {:?}: {}", account, err);
                    return Vec::new();
                }
            };

            cursor = page.next_cursor();
            holdings.extend(page.result);
            if cursor.is_none() {
                break;
            }
        }

        log::debug!("indexer returned {} tokens for {:?}", holdings.len(), account);
        holdings
    }

    /// Looks prices up in sequential batches. Any failure yields an empty map.
    async fn fetch_prices(&self, addresses: &[Address]) -> PriceMap {
        let mut seen = HashSet::new();
        let unique = addresses
            .iter()
            .copied()
            .filter(|address| seen.insert(*address))
            .collect::<Vec<_>>();

        let mut prices = PriceMap::new();
        for batch in unique.chunks(PRICE_BATCH_SIZE) {
            match self.prices.token_prices(batch.to_vec()).await {
                Ok(batch_prices) => prices.extend(batch_prices),
                Err(err) => {
                    log::error!("failed to fetch token prices: {}", err);
                    return PriceMap::new();
                }
            }
        }

        prices
    }
}

#[async_trait]
impl BalanceSource for BalanceService {
    async fn balances(&self, account: Address) -> Result<Vec<TokenHolding>, CustomError> {
        Ok(self.token_balances(account).await)
    }
}
