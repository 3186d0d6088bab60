//! HTTP client configuration.

use std::time::Duration;

/// Backend endpoints and timeouts for the client core.
///
/// The mobile app historically pointed auth traffic and service traffic at
/// different hosts, so the auth base URL is configurable separately; it
/// defaults to the service base URL.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Base URL for ticket and profile services
    pub base_url: String,
    /// Base URL for the user/auth service
    pub auth_base_url: String,
    /// Connect timeout
    pub connect_timeout: Duration,
    /// Request timeout
    pub request_timeout: Duration,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            auth_base_url: "http://localhost:8080".to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl ApiConfig {
    /// Config with both bases pointed at one URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            auth_base_url: base_url.clone(),
            base_url,
            ..Default::default()
        }
    }

    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let base_url = std::env::var("HELPDESK_API_URL").unwrap_or(defaults.base_url);
        let auth_base_url =
            std::env::var("HELPDESK_AUTH_URL").unwrap_or_else(|_| base_url.clone());

        let connect_timeout = std::env::var("HELPDESK_CONNECT_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(defaults.connect_timeout);

        let request_timeout = std::env::var("HELPDESK_REQUEST_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(defaults.request_timeout);

        Self {
            base_url,
            auth_base_url,
            connect_timeout,
            request_timeout,
        }
    }
}

/// Shared HTTP client with the configured timeouts applied.
pub fn build_http_client(config: &ApiConfig) -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder()
        .connect_timeout(config.connect_timeout)
        .timeout(config.request_timeout)
        .build()
}
