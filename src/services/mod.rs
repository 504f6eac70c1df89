pub mod aggregator;
pub mod balance_service;
pub mod calldata_service;
pub mod gateway_client;
mod http;
pub mod indexer;
pub mod network_config;
pub mod price_service;
pub mod sweep;
