/// Per-chain identifiers used by the external services.
#[derive(Clone, Debug, PartialEq)]
pub struct NetworkConfig {
    pub chain_id: u64,
    pub name: String,
    /// Native asset symbol.
    pub symbol: String,
    pub block_explorer: String,
    /// Chain name understood by the account indexer.
    pub indexer_chain: String,
    /// Network slug understood by the price service.
    pub price_network: String,
    /// Chain slug understood by the swap aggregator.
    pub aggregator_chain: String,
}
