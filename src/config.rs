use std::time::Duration;

use crate::errors::CustomError;

pub const DEFAULT_MORALIS_API_URL: &str = "https://deep-index.moralis.io/api/v2.2/";
pub const DEFAULT_GECKO_TERMINAL_API_URL: &str = "https://api.geckoterminal.com/api/v2/";
pub const DEFAULT_KYBER_API_URL: &str = "https://aggregator-api.kyberswap.com/";

/// Base mainnet.
pub const DEFAULT_CHAIN_ID: u64 = 8453;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub chain_id: u64,
    pub moralis_api_key: String,
    pub moralis_api_url: String,
    pub gecko_terminal_api_url: String,
    pub kyber_api_url: String,
    pub allowed_origins: Vec<String>,
    pub http_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, CustomError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary variable source, defaulting every
    /// unset key.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, CustomError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let port = var("PORT", "8080")
            .parse()
            .map_err(|e| CustomError::ConfigError(format!("Failed to parse PORT: {}", e)))?;
        let chain_id = var("CHAIN_ID", &DEFAULT_CHAIN_ID.to_string())
            .parse()
            .map_err(|e| CustomError::ConfigError(format!("Failed to parse CHAIN_ID: {}", e)))?;
        let timeout_secs: u64 = var("HTTP_TIMEOUT_SECS", "30").parse().map_err(|e| {
            CustomError::ConfigError(format!("Failed to parse HTTP_TIMEOUT_SECS: {}", e))
        })?;

        let moralis_api_key = var("MORALIS_API_KEY", "");
        if moralis_api_key.is_empty() {
            log::warn!("MORALIS_API_KEY is not set, balance lookups will fail");
        }

        Ok(Self {
            host: var("HOST", "127.0.0.1"),
            port,
            chain_id,
            moralis_api_key,
            moralis_api_url: var("MORALIS_API_URL", DEFAULT_MORALIS_API_URL),
            gecko_terminal_api_url: var("GECKO_TERMINAL_API_URL", DEFAULT_GECKO_TERMINAL_API_URL),
            kyber_api_url: var("KYBER_API_URL", DEFAULT_KYBER_API_URL),
            allowed_origins: var("ALLOWED_ORIGINS", "http://localhost:3000")
                .split(',')
                .map(str::trim)
                .filter(|origin| !origin.is_empty())
                .map(str::to_string)
                .collect(),
            http_timeout: Duration::from_secs(timeout_secs),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn defaults_when_nothing_is_set() {
        let config = Config::from_lookup(|_| None).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.chain_id, DEFAULT_CHAIN_ID);
        assert_eq!(config.kyber_api_url, DEFAULT_KYBER_API_URL);
        assert_eq!(config.allowed_origins, vec!["http://localhost:3000"]);
        assert_eq!(config.http_timeout, Duration::from_secs(30));
    }

    #[test]
    fn reads_overrides() {
        let vars: HashMap<&str, &str> = [
            ("PORT", "9000"),
            ("CHAIN_ID", "1"),
            ("MORALIS_API_KEY", "secret"),
            ("ALLOWED_ORIGINS", "https://a.xyz, https://b.xyz,"),
        ]
        .into_iter()
        .collect();
        let config = Config::from_lookup(|key| vars.get(key).map(|v| v.to_string())).unwrap();

        assert_eq!(config.port, 9000);
        assert_eq!(config.chain_id, 1);
        assert_eq!(config.moralis_api_key, "secret");
        assert_eq!(config.allowed_origins, vec!["https://a.xyz", "https://b.xyz"]);
    }

    #[test]
    fn rejects_bad_port() {
        let err = Config::from_lookup(|key| (key == "PORT").then(|| "eighty".to_string()));
        assert!(matches!(err, Err(CustomError::ConfigError(_))));
    }
}
