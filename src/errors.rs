use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use ethers::types::Address;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CustomError {
    #[error("Invalid address")]
    InvalidAddressError(String),

    #[error("Invalid amount: {0}")]
    InvalidAmountError(String),

    #[error("Invalid input: {0}")]
    ValidationError(String),

    #[error("Unsupported chain: {0}")]
    UnsupportedChainError(u64),

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Upstream error: {0}")]
    UpstreamError(String),

    #[error("Failed to decode response: {0}")]
    DecodeError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl CustomError {
    pub fn network(err: reqwest::Error) -> Self {
        CustomError::NetworkError(err.to_string())
    }
}

/// Why a batched wallet request did not go through.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum WalletError {
    #[error("Request rejected by user")]
    Rejected,

    #[error("Wallet error: {0}")]
    Failed(String),
}

/// A sweep state transition that is not allowed in the current state.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TransitionError {
    #[error("No wallet connected")]
    NotConnected,

    #[error("Unknown token: {0:?}")]
    UnknownToken(Address),

    #[error("Token has no price: {0:?}")]
    Unpriced(Address),

    #[error("Token is not selected: {0:?}")]
    NotSelected(Address),

    #[error("No tokens selected")]
    NothingSelected,

    #[error("A sweep is already pending")]
    SubmissionPending,
}

/// JSON body for every failed request.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct ApiError {
    pub error: String,
}

const GENERIC_ERROR: &str = "An error occurred";

impl ResponseError for CustomError {
    fn status_code(&self) -> StatusCode {
        match self {
            CustomError::InvalidAddressError(_) => StatusCode::BAD_REQUEST,
            CustomError::InvalidAmountError(_) => StatusCode::BAD_REQUEST,
            CustomError::ValidationError(_) => StatusCode::BAD_REQUEST,
            CustomError::UnsupportedChainError(_) => StatusCode::BAD_REQUEST,
            CustomError::NetworkError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            CustomError::UpstreamError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            CustomError::DecodeError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            CustomError::ConfigError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        // Server-side details stay in the log.
        let message = if status.is_server_error() {
            log::error!("request failed: {}", self);
            GENERIC_ERROR.to_string()
        } else {
            self.to_string()
        };

        HttpResponse::build(status).json(ApiError { error: message })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;

    async fn body_of(err: CustomError) -> (StatusCode, ApiError) {
        let response = err.error_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body()).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[actix_web::test]
    async fn client_errors_keep_their_message() {
        let (status, body) = body_of(CustomError::InvalidAddressError("0x12".into())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.error, "Invalid address");

        let (status, body) = body_of(CustomError::InvalidAmountError("1.2.3".into())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.error, "Invalid amount: 1.2.3");
    }

    #[actix_web::test]
    async fn server_errors_are_generic() {
        let (status, body) = body_of(CustomError::UpstreamError("kyber 502".into())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.error, "An error occurred");
    }
}
