//! HTTP client wrapper for wallet API requests.

use reqwest::Client;
use std::time::Duration;

use crate::constants::{DEFAULT_TIMEOUT_SECS, POOL_IDLE_TIMEOUT};
use crate::domain::WalletError;

// ============================================================================
// Configuration
// ============================================================================

/// HTTP client configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpConfig {
    /// Request timeout
    pub timeout: Duration,
    /// Bearer token sent with every request, if any
    pub bearer_token: Option<String>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            bearer_token: None,
        }
    }
}

impl HttpConfig {
    /// Create config with custom timeout
    #[must_use]
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            timeout,
            ..Self::default()
        }
    }

    /// Attach a bearer token
    #[must_use]
    pub fn bearer(mut self, token: impl Into<String>) -> Self {
        self.bearer_token = Some(token.into());
        self
    }
}

// ============================================================================
// HTTP Client
// ============================================================================

/// Base HTTP client wrapper
#[derive(Debug, Clone)]
pub struct HttpClient {
    inner: Client,
    config: HttpConfig,
}

impl HttpClient {
    /// Create a new HTTP client with custom configuration
    ///
    /// # Errors
    ///
    /// Returns `WalletError::Network` if the underlying client cannot be
    /// built (e.g. TLS backend unavailable).
    pub fn with_config(config: HttpConfig) -> Result<Self, WalletError> {
        let inner = Client::builder()
            .pool_max_idle_per_host(4)
            .pool_idle_timeout(POOL_IDLE_TIMEOUT)
            .timeout(config.timeout)
            .build()?;

        Ok(Self { inner, config })
    }

    /// Build a GET request with standard headers
    pub fn get(&self, url: &str) -> reqwest::RequestBuilder {
        let request = self
            .inner
            .get(url)
            .header("accept", "application/json")
            .timeout(self.config.timeout);

        match &self.config.bearer_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }
}
