use actix_web::{get, post, web, HttpResponse};
use serde_json::json;

use super::AppState;
use crate::errors::CustomError;
use crate::models::selection::{parse_address, CalldataRequest, TokensQuery};

#[get("/tokens")]
async fn get_tokens(
    state: web::Data<AppState>,
    query: web::Query<TokensQuery>,
) -> Result<HttpResponse, CustomError> {
    let address = query
        .into_inner()
        .address
        .filter(|address| !address.trim().is_empty())
        .ok_or_else(|| CustomError::InvalidAddressError(String::new()))?;
    let account = parse_address(&address)?;

    let tokens = state.balances.token_balances(account).await;
    Ok(HttpResponse::Ok().json(tokens))
}

#[post("/calldata")]
async fn build_calldata(
    state: web::Data<AppState>,
    request: web::Json<CalldataRequest>,
) -> Result<HttpResponse, CustomError> {
    let (account, selection) = request.into_inner().validate()?;

    let calls = state.calldata.build_calls(account, &selection).await?;
    Ok(HttpResponse::Ok().json(calls))
}

#[get("/health")]
async fn health(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "status": "ok",
        "chain_id": state.network.chain_id,
        "network": state.network.name,
        "native_symbol": state.network.symbol,
        "block_explorer": state.network.block_explorer,
    }))
}
