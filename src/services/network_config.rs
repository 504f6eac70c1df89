use crate::{errors::CustomError, models::network_config::NetworkConfig};

fn network(
    chain_id: u64,
    name: &str,
    symbol: &str,
    block_explorer: &str,
    indexer_chain: &str,
    price_network: &str,
    aggregator_chain: &str,
) -> NetworkConfig {
    NetworkConfig {
        chain_id,
        name: name.to_string(),
        symbol: symbol.to_string(),
        block_explorer: block_explorer.to_string(),
        indexer_chain: indexer_chain.to_string(),
        price_network: price_network.to_string(),
        aggregator_chain: aggregator_chain.to_string(),
    }
}

/// Get network configuration based on chain ID
pub fn get_network_config(chain_id: u64) -> Result<NetworkConfig, CustomError> {
    match chain_id {
        1 => Ok(network(
            1,
            "Ethereum Mainnet",
            "ETH",
            "https://etherscan.io",
            "eth",
            "eth",
            "ethereum",
        )),
        10 => Ok(network(
            10,
            "OP Mainnet",
            "ETH",
            "https://optimistic.etherscan.io",
            "optimism",
            "optimism",
            "optimism",
        )),
        56 => Ok(network(
            56,
            "BNB Smart Chain",
            "BNB",
            "https://bscscan.com",
            "bsc",
            "bsc",
            "bsc",
        )),
        137 => Ok(network(
            137,
            "Polygon Mainnet",
            "POL",
            "https://polygonscan.com",
            "polygon",
            "polygon_pos",
            "polygon",
        )),
        8453 => Ok(network(
            8453,
            "Base",
            "ETH",
            "https://basescan.org",
            "base",
            "base",
            "base",
        )),
        42161 => Ok(network(
            42161,
            "Arbitrum One",
            "ETH",
            "https://arbiscan.io",
            "arbitrum",
            "arbitrum",
            "arbitrum",
        )),
        _ => Err(CustomError::UnsupportedChainError(chain_id)),
    }
}
