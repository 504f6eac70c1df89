use reqwest::{RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;

use crate::errors::CustomError;

/// Sends a request and returns the status together with the raw body.
pub(crate) async fn logged_query(
    service: &str,
    request: RequestBuilder,
) -> Result<(StatusCode, String), CustomError> {
    let response = request.send().await.map_err(CustomError::network)?;
    let status = response.status();
    let body = response.text().await.map_err(CustomError::network)?;
    log::debug!("response from {} ({}): {}", service, status, body);
    Ok((status, body))
}

/// Like [`logged_query`] but fails on any non-2xx status.
pub(crate) async fn logged_json<D>(service: &str, request: RequestBuilder) -> Result<D, CustomError>
where
    D: DeserializeOwned,
{
    let (status, body) = logged_query(service, request).await?;
    if !status.is_success() {
        return Err(CustomError::UpstreamError(format!(
            "{} returned {}: {}",
            service, status, body
        )));
    }
    decode(service, &body)
}

pub(crate) fn decode<D>(service: &str, body: &str) -> Result<D, CustomError>
where
    D: DeserializeOwned,
{
    serde_json::from_str(body)
        .map_err(|e| CustomError::DecodeError(format!("{} result parsing failed: {}", service, e)))
}

/// Full lowercase hex; `Display` for addresses elides the middle.
pub(crate) fn addr2str(address: ethers::types::Address) -> String {
    format!("{:?}", address)
}
