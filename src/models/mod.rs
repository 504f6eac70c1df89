pub mod call;
pub mod network_config;
pub mod price;
pub mod route;
pub mod selection;
pub mod token;
pub mod u256_decimal;
