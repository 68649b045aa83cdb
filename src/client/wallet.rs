//! HTTP transaction source backed by the wallet REST API.

use super::TransactionSource;
use super::http::{HttpClient, HttpConfig};
use crate::constants::{DEFAULT_PAGE_SIZE, TRANSACTIONS_PATH};
use crate::domain::{TransactionPage, WalletError};
use crate::state::AppConfig;

// ============================================================================
// Wallet Client
// ============================================================================

/// Wallet API client
#[derive(Debug, Clone)]
pub struct WalletClient {
    http: HttpClient,
    base_url: String,
    page_size: u32,
}

impl WalletClient {
    /// Create a client for the API rooted at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns `WalletError::ClientNotRegistered` for an empty base URL, or
    /// `WalletError::Network` if the HTTP client cannot be built.
    pub fn new(base_url: &str, http_config: HttpConfig) -> Result<Self, WalletError> {
        let base_url = base_url.trim().trim_end_matches('/');
        if base_url.is_empty() {
            return Err(WalletError::ClientNotRegistered);
        }

        Ok(Self {
            http: HttpClient::with_config(http_config)?,
            base_url: base_url.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
        })
    }

    /// Build a client from the application configuration.
    ///
    /// # Errors
    ///
    /// Returns `WalletError::ClientNotRegistered` when no API base URL is
    /// configured.
    pub fn from_config(config: &AppConfig) -> Result<Self, WalletError> {
        let base_url = config
            .api_base_url
            .as_deref()
            .ok_or(WalletError::ClientNotRegistered)?;

        let mut http_config = HttpConfig::with_timeout(config.timeout());
        if let Some(token) = &config.api_token {
            http_config = http_config.bearer(token.clone());
        }

        Ok(Self::new(base_url, http_config)?.with_page_size(config.page_size))
    }

    /// Override the number of transactions requested per page.
    #[must_use]
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    #[must_use]
    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    fn transactions_request(
        &self,
        wallet_id: &str,
        page_number: Option<u32>,
    ) -> reqwest::RequestBuilder {
        let url = format!("{}{}", self.base_url, TRANSACTIONS_PATH);
        let mut params = vec![
            ("walletIds", wallet_id.to_string()),
            ("pageSize", self.page_size.to_string()),
        ];
        if let Some(page) = page_number {
            params.push(("pageNumber", page.to_string()));
        }

        self.http.get(&url).query(&params)
    }
}

impl TransactionSource for WalletClient {
    async fn fetch_page(
        &self,
        wallet_id: &str,
        page_number: Option<u32>,
    ) -> Result<TransactionPage, WalletError> {
        if wallet_id.trim().is_empty() {
            return Err(WalletError::invalid_input("Wallet ID cannot be empty"));
        }

        let response = self
            .transactions_request(wallet_id, page_number)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(WalletError::status(status.as_u16(), response.url().as_str()));
        }

        let page = response
            .json::<TransactionPage>()
            .await
            .map_err(|e| WalletError::parse(format!("Failed to parse transactions page: {e}")))?;

        tracing::debug!(
            "Fetched {} transactions for wallet {wallet_id} (page {})",
            page.data.len(),
            page.paging.page_number
        );
        Ok(page)
    }
}

// ============================================================================
// Tests
// ============================================================================
