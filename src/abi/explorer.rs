use super::Abi;
use crate::error::{Result, WizardError};
use crate::network::{NetworkInfo, SUPPORTED_NETWORKS};
use serde::Deserialize;
use serde_json::Value;
use std::env;
use std::time::Duration;
use tracing::{debug, info};

pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Deserialize)]
struct ExplorerResponse {
    #[serde(default)]
    status: Value,
    #[serde(default)]
    message: String,
    #[serde(default)]
    result: Value,
}

/// Fetches verified contract ABIs from Etherscan-compatible explorers.
///
/// Every error message is sanitized: neither the request URL nor the API key
/// ever ends up in a [`WizardError::AbiFetch`].
#[derive(Debug, Clone)]
pub struct ExplorerClient {
    base_url: Option<String>,
    api_key: Option<String>,
    timeout: Duration,
}

impl Default for ExplorerClient {
    fn default() -> Self {
        Self::new()
    }
}

impl ExplorerClient {
    pub fn new() -> Self {
        Self {
            base_url: None,
            api_key: None,
            timeout: REQUEST_TIMEOUT,
        }
    }

    /// Send requests to `base_url` instead of the network's explorer host
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into().trim_end_matches('/').to_string());
        self
    }

    /// Use this key instead of reading the network's environment variable
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn api_key_for(&self, network: &NetworkInfo) -> Option<String> {
        if let Some(key) = &self.api_key {
            return Some(key.clone());
        }
        match env::var(&network.api_key_env) {
            Ok(key) if !key.is_empty() => Some(key),
            _ => {
                debug!("API key environment variable {} is not set", network.api_key_env);
                None
            }
        }
    }

    /// Single blocking GET, no retry. Must not be called from inside an
    /// async runtime.
    pub fn fetch_abi(&self, network: &str, address: &str) -> Result<Abi> {
        let info = SUPPORTED_NETWORKS.get(network).ok_or_else(|| {
            WizardError::abi_fetch(format!(
                "Unsupported network: '{}'. Supported networks: {}",
                network,
                SUPPORTED_NETWORKS.keys().copied().collect::<Vec<_>>().join(", ")
            ))
        })?;

        let base_url = self
            .base_url
            .clone()
            .unwrap_or_else(|| format!("https://{}", info.explorer));

        let mut query = vec![
            ("module", "contract".to_string()),
            ("action", "getabi".to_string()),
            ("address", address.to_string()),
        ];
        if let Some(key) = self.api_key_for(info) {
            query.push(("apikey", key));
        }

        debug!("Fetching ABI for address {} on network {}", address, network);

        let client = reqwest::blocking::Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|e| {
                debug!("Failed to build HTTP client: {}", e.without_url());
                WizardError::abi_fetch(format!(
                    "Failed to fetch ABI from {} explorer. An unexpected network error occurred.",
                    network
                ))
            })?;

        let response = client
            .get(format!("{}/api", base_url))
            .query(&query)
            .send()
            .map_err(|e| request_error(network, e))?;

        let status = response.status();
        if !status.is_success() {
            debug!("HTTP error fetching ABI: status code {}", status.as_u16());
            return Err(WizardError::abi_fetch(format!(
                "Failed to fetch ABI from {} explorer (HTTP error). \
                 The explorer service may be temporarily unavailable. \
                 Please try again later or use a local ABI file.",
                network
            )));
        }

        let body: ExplorerResponse = response.json().map_err(|e| {
            debug!("Failed to parse explorer response: {}", e.without_url());
            WizardError::abi_fetch(format!(
                "Invalid response from {} explorer. \
                 The service may be experiencing issues. \
                 Please try again later or use a local ABI file.",
                network
            ))
        })?;

        let result = match &body.result {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };

        if body.status.as_str() != Some("1") {
            debug!("Explorer API error: message={}", body.message);
            return Err(classify_explorer_error(network, address, &result));
        }

        let invalid_format = |detail: &str| {
            WizardError::abi_fetch(format!(
                "Invalid ABI format received from {} explorer. {} \
                 Please try using a local ABI file instead.",
                network, detail
            ))
        };

        let value: Value = serde_json::from_str(&result)
            .map_err(|_| invalid_format("The returned data could not be parsed as a valid ABI."))?;
        if !value.is_array() {
            return Err(invalid_format("Expected a list of ABI entries."));
        }
        let abi = Abi::from_value(value).map_err(|e| invalid_format(&format!("{}.", e)))?;

        info!(
            "Fetched ABI for {} on {} ({} entries)",
            address,
            network,
            abi.len()
        );
        Ok(abi)
    }
}

fn request_error(network: &str, error: reqwest::Error) -> WizardError {
    let message = if error.is_timeout() {
        format!(
            "Request timed out while fetching ABI from {} explorer. \
             Please check your network connection and try again.",
            network
        )
    } else if error.is_connect() {
        format!(
            "Failed to connect to {} explorer. \
             Please check your network connection and try again.",
            network
        )
    } else {
        format!(
            "Failed to fetch ABI from {} explorer. \
             An unexpected network error occurred. \
             Please try again or use a local ABI file.",
            network
        )
    };
    debug!("Request to explorer failed: {}", error.without_url());
    WizardError::abi_fetch(message)
}

fn classify_explorer_error(network: &str, address: &str, result: &str) -> WizardError {
    let lower = result.to_lowercase();

    let message = if lower.contains("contract source code not verified") {
        format!(
            "Contract at {} is not verified on {} explorer. \
             Please verify the contract first, or provide the ABI manually via local file or paste.",
            address, network
        )
    } else if lower.contains("invalid api key") || lower.contains("invalid apikey") {
        format!(
            "Invalid API key for {} explorer. Please check your API key configuration.",
            network
        )
    } else if lower.contains("rate limit") {
        format!(
            "API rate limit exceeded for {} explorer. \
             Please wait a moment and try again, or consider using an API key for higher limits.",
            network
        )
    } else if lower.contains("invalid address") {
        format!(
            "Invalid contract address: {}. Please check the address format and try again.",
            address
        )
    } else {
        format!(
            "Failed to fetch ABI from {} explorer. \
             Contract may not be verified, or API rate limit exceeded. \
             Please check your API key or try using a local ABI file.",
            network
        )
    };
    WizardError::abi_fetch(message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{generate_random_address, ERC20_ABI};
    use serde_json::json;
    use wiremock::matchers as m;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const SECRET: &str = "super-secret-key";

    async fn mock_response(server: &MockServer, response: ResponseTemplate) {
        Mock::given(m::method("GET"))
            .and(m::path("/api"))
            .respond_with(response)
            .mount(server)
            .await;
    }

    async fn fetch(server: &MockServer, network: &str, address: &str) -> Result<Abi> {
        let client = ExplorerClient::new()
            .with_base_url(server.uri())
            .with_api_key(SECRET)
            .with_timeout(Duration::from_millis(500));
        let network = network.to_string();
        let address = address.to_string();

        tokio::task::spawn_blocking(move || client.fetch_abi(&network, &address))
            .await
            .unwrap()
    }

    fn assert_sanitized(err: &WizardError, server: &MockServer) {
        let message = err.to_string();
        assert!(matches!(err, WizardError::AbiFetch(_)));
        assert!(!message.contains(SECRET), "leaked key: {}", message);
        assert!(!message.contains(&server.uri()), "leaked url: {}", message);
        assert!(!message.contains("apikey"), "leaked query: {}", message);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_fetch_success_sends_expected_query() {
        let server = MockServer::start().await;
        let address = generate_random_address();

        Mock::given(m::method("GET"))
            .and(m::path("/api"))
            .and(m::query_param("module", "contract"))
            .and(m::query_param("action", "getabi"))
            .and(m::query_param("address", address.as_str()))
            .and(m::query_param("apikey", SECRET))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "1",
                "message": "OK",
                "result": ERC20_ABI,
            })))
            .expect(1)
            .mount(&server)
            .await;

        let abi = fetch(&server, "ethereum", &address).await.unwrap();
        assert_eq!(abi.events().len(), 2);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_explorer_error_messages() {
        let cases = vec![
            ("Contract source code not verified", "is not verified"),
            ("Invalid API Key", "Invalid API key"),
            ("Max rate limit reached", "rate limit exceeded"),
            ("Invalid Address format", "Invalid contract address"),
            ("Something odd", "Contract may not be verified"),
        ];

        for (result, expected) in cases {
            let server = MockServer::start().await;
            mock_response(
                &server,
                ResponseTemplate::new(200).set_body_json(json!({
                    "status": "0",
                    "message": "NOTOK",
                    "result": result,
                })),
            )
            .await;

            let err = fetch(&server, "optimism", &generate_random_address())
                .await
                .unwrap_err();
            assert_sanitized(&err, &server);
            assert!(err.to_string().contains(expected), "{}", err);
        }
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_http_error_status() {
        let server = MockServer::start().await;
        mock_response(&server, ResponseTemplate::new(503)).await;

        let err = fetch(&server, "arbitrum", &generate_random_address())
            .await
            .unwrap_err();
        assert_sanitized(&err, &server);
        assert!(err.to_string().contains("HTTP error"));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_non_json_body() {
        let server = MockServer::start().await;
        mock_response(&server, ResponseTemplate::new(200).set_body_string("<html>")).await;

        let err = fetch(&server, "ethereum", &generate_random_address())
            .await
            .unwrap_err();
        assert_sanitized(&err, &server);
        assert!(err.to_string().contains("Invalid response"));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_invalid_abi_result() {
        for result in ["not-an-abi", "{\"type\":\"event\"}"] {
            let server = MockServer::start().await;
            mock_response(
                &server,
                ResponseTemplate::new(200).set_body_json(json!({
                    "status": "1",
                    "message": "OK",
                    "result": result,
                })),
            )
            .await;

            let err = fetch(&server, "ethereum", &generate_random_address())
                .await
                .unwrap_err();
            assert_sanitized(&err, &server);
            assert!(err.to_string().contains("Invalid ABI format"));
        }
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_timeout() {
        let server = MockServer::start().await;
        mock_response(
            &server,
            ResponseTemplate::new(200)
                .set_body_json(json!({"status": "1", "message": "OK", "result": ERC20_ABI}))
                .set_delay(Duration::from_secs(3)),
        )
        .await;

        let err = fetch(&server, "ethereum", &generate_random_address())
            .await
            .unwrap_err();
        assert_sanitized(&err, &server);
        assert!(err.to_string().contains("timed out"));
    }

    #[test]
    fn test_connection_failure() {
        let client = ExplorerClient::new()
            .with_base_url("http://127.0.0.1:1")
            .with_api_key(SECRET);

        let err = client
            .fetch_abi("ethereum", &generate_random_address())
            .unwrap_err();
        let message = err.to_string();
        assert!(matches!(err, WizardError::AbiFetch(_)));
        assert!(message.contains("Failed to connect to ethereum explorer"));
        assert!(!message.contains(SECRET));
        assert!(!message.contains("127.0.0.1"));
    }

    #[test]
    fn test_unsupported_network() {
        let err = ExplorerClient::new()
            .fetch_abi("solana", &generate_random_address())
            .unwrap_err();
        assert!(matches!(err, WizardError::AbiFetch(_)));
        assert!(err.to_string().contains("Unsupported network"));
    }
}
