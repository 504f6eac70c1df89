use actix_cors::Cors;
use actix_web::http::header;
use actix_web::{web, App, HttpServer};
use dotenv::dotenv;
use std::io;
use std::sync::Arc;

use sweep_backend::api::{self, AppState};
use sweep_backend::config::Config;
use sweep_backend::errors::CustomError;
use sweep_backend::services::{
    aggregator::KyberSwapClient, balance_service::BalanceService,
    calldata_service::CalldataService, indexer::MoralisIndexer,
    network_config::get_network_config, price_service::GeckoTerminalPrices,
};

fn app_state(config: &Config) -> Result<AppState, CustomError> {
    let network = get_network_config(config.chain_id)?;
    let client = reqwest::Client::builder()
        .timeout(config.http_timeout)
        .build()
        .map_err(|e| CustomError::ConfigError(e.to_string()))?;

    let indexer = MoralisIndexer::new(
        config.moralis_api_url.as_str(),
        client.clone(),
        config.moralis_api_key.clone(),
        network.indexer_chain.clone(),
    )?;
    let prices = GeckoTerminalPrices::new(
        config.gecko_terminal_api_url.as_str(),
        client.clone(),
        network.price_network.clone(),
    )?;
    let aggregator = KyberSwapClient::new(
        config.kyber_api_url.as_str(),
        client,
        network.aggregator_chain.clone(),
    )?;

    Ok(AppState {
        balances: BalanceService::new(Arc::new(indexer), Arc::new(prices)),
        calldata: CalldataService::new(Arc::new(aggregator)),
        network,
    })
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv().ok();
    env_logger::init();

    let config = Config::from_env().map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
    let state = web::Data::new(
        app_state(&config).map_err(|e| io::Error::new(io::ErrorKind::Other, e))?,
    );
    log::info!(
        "serving {} (chain {}) on {}:{}",
        state.network.name,
        state.network.chain_id,
        config.host,
        config.port
    );

    let allowed_origins = config.allowed_origins.clone();
    HttpServer::new(move || {
        let cors = allowed_origins
            .iter()
            .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
            .allowed_methods(vec!["GET", "POST"])
            .allowed_headers(vec![
                header::CONTENT_TYPE,
                header::AUTHORIZATION,
                header::ACCEPT,
            ])
            .supports_credentials();
        App::new()
            .app_data(state.clone())
            .configure(api::config)
            .wrap(cors)
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}
