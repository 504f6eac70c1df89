use actix_web::web;

use crate::errors::CustomError;
use crate::models::network_config::NetworkConfig;
use crate::services::{balance_service::BalanceService, calldata_service::CalldataService};

mod handlers;

/// Services shared by every worker.
pub struct AppState {
    pub balances: BalanceService,
    pub calldata: CalldataService,
    pub network: NetworkConfig,
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(|err, _req| {
        CustomError::ValidationError(err.to_string()).into()
    }))
    .app_data(web::QueryConfig::default().error_handler(|err, _req| {
        CustomError::InvalidAddressError(err.to_string()).into()
    }))
    .service(
        web::scope("/api")
            .service(handlers::get_tokens)
            .service(handlers::build_calldata)
            .service(handlers::health),
    );
}
